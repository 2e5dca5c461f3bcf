use accel_core::{CoreError, Data, DataCatalog, HookError, Node, Pipeline, PipelineHook, RunContext};
use indexmap::IndexMap;
use log::warn;
use uuid::Uuid;

use super::coordinator::{DeferredSaves, RunPhase};
use super::pool::DrainReport;
use crate::config::AcceleratorConfig;
use crate::error::AcceleratorError;

/// Hook "tee": los nodos leen y escriben intermedios en memoria mientras los
/// valores se persisten en segundo plano en los datasets duraderos.
///
/// Un fallo de guardado se reporta al cerrar la corrida, de modo que una
/// corrida cuyos nodos terminaron bien puede fallar en el teardown.
pub struct TeeHook {
    config: AcceleratorConfig,
    run: Option<(Uuid, DeferredSaves)>,
}

impl TeeHook {
    pub fn new(config: AcceleratorConfig) -> Self {
        Self { config, run: None }
    }

    pub fn from_env() -> Self {
        Self::new(AcceleratorConfig::from_env())
    }

    pub fn config(&self) -> &AcceleratorConfig {
        &self.config
    }

    /// Fase de la última corrida iniciada (`Init` si ninguna).
    pub fn phase(&self) -> RunPhase {
        self.saves().map_or(RunPhase::Init, DeferredSaves::phase)
    }

    pub fn pending(&self) -> usize {
        self.saves().map_or(0, DeferredSaves::pending)
    }

    pub fn saves(&self) -> Option<&DeferredSaves> {
        self.run.as_ref().map(|(_, saves)| saves)
    }

    fn current(&mut self, run_id: Uuid) -> Result<&mut DeferredSaves, AcceleratorError> {
        match self.run.as_mut() {
            Some((id, saves)) if *id == run_id => Ok(saves),
            _ => Err(AcceleratorError::NotStarted),
        }
    }

    /// Drena los guardados y devuelve los handles duraderos al catálogo,
    /// aunque el drenaje haya fallado.
    fn finish(&mut self, run_id: Uuid, catalog: &mut DataCatalog) -> Result<DrainReport, AcceleratorError> {
        let saves = self.current(run_id)?;
        let drained = saves.drain();
        saves.restore(catalog)?;
        drained
    }
}

impl PipelineHook for TeeHook {
    fn name(&self) -> &'static str {
        "tee"
    }

    fn before_pipeline_run(&mut self,
                           ctx: &RunContext<'_>,
                           pipeline: &Pipeline,
                           catalog: &mut DataCatalog)
                           -> Result<(), HookError> {
        if let Some((id, mut previous)) = self.run.take() {
            if let Err(e) = previous.drain() {
                warn!("tee:previous_run_error run_id={} error={}", id, e);
            }
        }
        let saves = DeferredSaves::start(catalog, pipeline, ctx.default_factory, &self.config)?;
        self.run = Some((ctx.run_id, saves));
        Ok(())
    }

    fn after_node_run(&mut self,
                      ctx: &RunContext<'_>,
                      _node: &Node,
                      catalog: &DataCatalog,
                      outputs: &IndexMap<String, Data>)
                      -> Result<(), HookError> {
        self.current(ctx.run_id)?.after_node(catalog, outputs)?;
        Ok(())
    }

    fn after_pipeline_run(&mut self, ctx: &RunContext<'_>, catalog: &mut DataCatalog) -> Result<(), HookError> {
        self.finish(ctx.run_id, catalog)?;
        Ok(())
    }

    fn on_pipeline_error(&mut self,
                         ctx: &RunContext<'_>,
                         _error: &CoreError,
                         catalog: &mut DataCatalog)
                         -> Result<(), HookError> {
        match self.finish(ctx.run_id, catalog) {
            // la corrida falló antes de que este hook arrancara
            Err(AcceleratorError::NotStarted) => Ok(()),
            Err(e) => Err(e.into()),
            Ok(_) => Ok(()),
        }
    }
}
