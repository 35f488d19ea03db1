pub mod error;
mod virtual_provider;

pub use virtual_provider::VirtualRdfProvider;

pub type DFResult<T> = datafusion::error::Result<T>;
