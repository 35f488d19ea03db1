mod config;
mod optimiser;
pub mod passes;
mod pipeline;
mod product;
pub mod reorder;
mod substitution;

pub use config::OptimiserConfig;
pub use optimiser::{AlgebraOptimiser, OptimisationTarget};
pub use pipeline::{default_optimisers, OptimiserPipeline};
pub use substitution::{Substitute, VariableSubstitutionTransformer};
