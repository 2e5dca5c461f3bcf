//! Runner secuencial y su builder.

mod builder;
mod sequential;

pub use builder::RunnerBuilder;
pub use sequential::{RunSummary, SequentialRunner};
