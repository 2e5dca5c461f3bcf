//! Caché transparente en memoria para datasets intermedios.

mod dataset;
mod hook;

pub use dataset::{CacheStats, CachedDataset};
pub use hook::CacheHook;
