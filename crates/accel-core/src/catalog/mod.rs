//! Catálogo de datasets y regla de nombres físicos.

#[allow(clippy::module_inception)]
mod catalog;
mod naming;

pub use catalog::DataCatalog;
pub use naming::NamingRule;
