use accel_core::{CopyMode, CoreError, DataCatalog, DatasetHandle, HookError, Pipeline, PipelineHook, RunContext};
use log::debug;

use super::CachedDataset;
use crate::config::AcceleratorConfig;
use crate::error::AcceleratorError;
use crate::substitution::substitution_set;

/// Envuelve cada intermedio con un `CachedDataset` al iniciar la corrida,
/// sobre el handle que esté registrado en ese momento. Al cerrar la corrida
/// devuelve el handle envuelto a cada nombre que siga apuntando a su
/// envoltorio, así una corrida posterior no anida cachés.
#[derive(Debug, Clone, Default)]
pub struct CacheHook {
    copy_mode: Option<CopyMode>,
    // nombre, handle envuelto, envoltorio
    wrapped: Vec<(String, DatasetHandle, DatasetHandle)>,
}

impl CacheHook {
    pub fn new(copy_mode: Option<CopyMode>) -> Self {
        Self { copy_mode, wrapped: Vec::new() }
    }

    pub fn from_config(config: &AcceleratorConfig) -> Self {
        Self::new(config.copy_mode)
    }

    /// Handles que este hook envolvió en la corrida en curso.
    pub fn wrapped_names(&self) -> Vec<&str> {
        self.wrapped.iter().map(|(name, _, _)| name.as_str()).collect()
    }

    fn unwrap_all(&mut self, catalog: &mut DataCatalog) -> Result<usize, AcceleratorError> {
        let restore: Vec<(String, DatasetHandle)> =
            self.wrapped
                .drain(..)
                .filter(|(name, _, wrapper)| catalog.get(name).is_some_and(|live| live.same_handle(wrapper)))
                .map(|(name, inner, _)| (name, inner))
                .collect();
        let count = restore.len();
        catalog.add_all(restore, true)?;
        debug!("cache:unwrapped count={}", count);
        Ok(count)
    }
}

impl PipelineHook for CacheHook {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn before_pipeline_run(&mut self,
                           _ctx: &RunContext<'_>,
                           pipeline: &Pipeline,
                           catalog: &mut DataCatalog)
                           -> Result<(), HookError> {
        let mut wrapped = Vec::new();
        for name in substitution_set(catalog, pipeline) {
            if let Some(current) = catalog.get(&name) {
                let handle = DatasetHandle::new(CachedDataset::new(current.clone(), self.copy_mode));
                debug!("cache:wrap name={} inner={} handle={}", name, current.id(), handle.id());
                wrapped.push((name, current.clone(), handle));
            }
        }
        catalog.add_all(wrapped.iter().map(|(name, _, handle)| (name.clone(), handle.clone())), true)
               .map_err(AcceleratorError::from)?;
        self.wrapped = wrapped;
        Ok(())
    }

    fn after_pipeline_run(&mut self, _ctx: &RunContext<'_>, catalog: &mut DataCatalog) -> Result<(), HookError> {
        self.unwrap_all(catalog)?;
        Ok(())
    }

    fn on_pipeline_error(&mut self,
                         _ctx: &RunContext<'_>,
                         _error: &CoreError,
                         catalog: &mut DataCatalog)
                         -> Result<(), HookError> {
        self.unwrap_all(catalog)?;
        Ok(())
    }
}
