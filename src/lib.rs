//! Accelerator Library
//!
//! Fachada del workspace:
//! - `host` (`accel-core`): catálogo, datasets, pipeline, runner y hooks.
//! - `plugins` (`accel-plugins`): sustitución volátil, guardados diferidos y caché.
//!
//! `accelerated_runner` arma un `SequentialRunner` con los hooks que indique la
//! configuración; `catalog_for` crea un catálogo con la misma regla de nombres.

pub use accel_core as host;
pub use accel_plugins as plugins;

use accel_core::{DataCatalog, MemoryFactory, SequentialRunner};
use accel_plugins::{init_dotenv, plugins_from_config, AcceleratorConfig};

pub mod prelude {
    pub use accel_core::pipeline::NodeFnError;
    pub use accel_core::{CopyMode, CoreError, Data, DataCatalog, Dataset, DatasetError, DatasetFactory,
                         DatasetHandle, MemoryDataset, NamingRule, Node, Pipeline, PipelineHook, RunSummary,
                         SequentialRunner};
    pub use accel_plugins::{AcceleratorConfig, AcceleratorError, CacheHook, CachedDataset, RunPhase, TeeHook};

    pub use crate::{accelerated_runner, accelerated_runner_from_env, catalog_for};
}

/// Runner con el tee (y la caché si está habilitada). Los volátiles usan el
/// `copy_mode` de la configuración.
pub fn accelerated_runner(config: &AcceleratorConfig) -> SequentialRunner {
    log::debug!("accelerator:runner workers={} naming={} cache={}",
                config.max_workers,
                config.naming,
                config.cache_enabled);
    SequentialRunner::builder().hooks(plugins_from_config(config))
                               .default_factory(MemoryFactory::with_copy_mode(config.copy_mode))
                               .build()
}

/// `accelerated_runner` con la configuración de entorno / .env.
pub fn accelerated_runner_from_env() -> SequentialRunner {
    init_dotenv();
    accelerated_runner(&AcceleratorConfig::from_env())
}

/// Catálogo vacío cuya normalización coincide con la del tee.
pub fn catalog_for(config: &AcceleratorConfig) -> DataCatalog {
    DataCatalog::with_naming(config.naming)
}
