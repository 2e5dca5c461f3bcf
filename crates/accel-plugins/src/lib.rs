//! accel-plugins
//!
//! Hooks que aceleran pipelines sin cambiar su resultado observable:
//! los intermedios se sirven desde memoria y se persisten en segundo plano.
//!
//! Módulos:
//! - `shadow`: copia congelada del catálogo con los handles duraderos.
//! - `substitution`: cálculo y aplicación del conjunto sustituible.
//! - `deferred`: pool de guardados, coordinador por corrida y `TeeHook`.
//! - `cache`: `CachedDataset` y `CacheHook`.
//! - `config`: `AcceleratorConfig` desde variables de entorno / .env.

pub mod cache;
pub mod config;
pub mod deferred;
pub mod error;
pub mod shadow;
pub mod substitution;

use accel_core::PipelineHook;

pub use cache::{CacheHook, CacheStats, CachedDataset};
pub use config::{init_dotenv, AcceleratorConfig};
pub use deferred::{DeferredSaves, DrainReport, RunPhase, SavePool, TeeHook};
pub use error::AcceleratorError;
pub use shadow::CatalogShadow;
pub use substitution::{substitute_volatile, substitution_set};

/// Hooks a registrar según la configuración: siempre el tee y, si está
/// habilitada, la caché (después del tee, para envolver los volátiles).
pub fn plugins_from_config(config: &AcceleratorConfig) -> Vec<Box<dyn PipelineHook>> {
    let mut hooks: Vec<Box<dyn PipelineHook>> = vec![Box::new(TeeHook::new(config.clone()))];
    if config.cache_enabled {
        hooks.push(Box::new(CacheHook::from_config(config)));
    }
    hooks
}

/// `plugins_from_config` con la configuración del entorno.
pub fn plugins_from_env() -> Vec<Box<dyn PipelineHook>> {
    plugins_from_config(&AcceleratorConfig::from_env())
}
