mod algebra;
pub mod expr;
pub mod patterns;
mod query;
mod update;

pub use algebra::{are_disjoint, Algebra};
pub use query::{Bindings, Query, QueryType};
pub use update::{UpdateCommand, UpdateCommandSet, UpdateCommandType};
