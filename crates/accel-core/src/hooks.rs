//! Puntos de extensión del runner.
//!
//! Los hooks se invocan en orden de registro. `before_pipeline_run` y los
//! dos hooks de cierre (`after_pipeline_run`, `on_pipeline_error`) reciben el
//! catálogo mutable: al inicio un plugin puede reemplazar handles y al cierre
//! debe devolver los que reemplazó. Mientras corren los nodos el catálogo es
//! de lectura para los hooks.

use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use log::warn;
use uuid::Uuid;

use crate::catalog::DataCatalog;
use crate::data::Data;
use crate::errors::{CoreError, HookError};
use crate::io::DatasetFactory;
use crate::pipeline::{Node, Pipeline};

/// Contexto compartido con los hooks durante una corrida.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub run_id: Uuid,
    /// Fábrica del handle por defecto del runner (volátil).
    pub default_factory: &'a dyn DatasetFactory,
}

#[allow(unused_variables)]
pub trait PipelineHook: Send {
    fn name(&self) -> &'static str;

    fn before_pipeline_run(&mut self,
                           ctx: &RunContext<'_>,
                           pipeline: &Pipeline,
                           catalog: &mut DataCatalog)
                           -> Result<(), HookError> {
        Ok(())
    }

    fn before_node_run(&mut self, ctx: &RunContext<'_>, node: &Node, catalog: &DataCatalog) -> Result<(), HookError> {
        Ok(())
    }

    fn after_node_run(&mut self,
                      ctx: &RunContext<'_>,
                      node: &Node,
                      catalog: &DataCatalog,
                      outputs: &IndexMap<String, Data>)
                      -> Result<(), HookError> {
        Ok(())
    }

    fn after_pipeline_run(&mut self, ctx: &RunContext<'_>, catalog: &mut DataCatalog) -> Result<(), HookError> {
        Ok(())
    }

    fn on_pipeline_error(&mut self,
                         ctx: &RunContext<'_>,
                         error: &CoreError,
                         catalog: &mut DataCatalog)
                         -> Result<(), HookError> {
        Ok(())
    }
}

/// Permite conservar una referencia al hook para inspeccionarlo al terminar.
impl<H: PipelineHook> PipelineHook for Arc<Mutex<H>> {
    fn name(&self) -> &'static str {
        self.lock().unwrap_or_else(PoisonError::into_inner).name()
    }

    fn before_pipeline_run(&mut self,
                           ctx: &RunContext<'_>,
                           pipeline: &Pipeline,
                           catalog: &mut DataCatalog)
                           -> Result<(), HookError> {
        lock(self)?.before_pipeline_run(ctx, pipeline, catalog)
    }

    fn before_node_run(&mut self, ctx: &RunContext<'_>, node: &Node, catalog: &DataCatalog) -> Result<(), HookError> {
        lock(self)?.before_node_run(ctx, node, catalog)
    }

    fn after_node_run(&mut self,
                      ctx: &RunContext<'_>,
                      node: &Node,
                      catalog: &DataCatalog,
                      outputs: &IndexMap<String, Data>)
                      -> Result<(), HookError> {
        lock(self)?.after_node_run(ctx, node, catalog, outputs)
    }

    fn after_pipeline_run(&mut self, ctx: &RunContext<'_>, catalog: &mut DataCatalog) -> Result<(), HookError> {
        lock(self)?.after_pipeline_run(ctx, catalog)
    }

    fn on_pipeline_error(&mut self,
                         ctx: &RunContext<'_>,
                         error: &CoreError,
                         catalog: &mut DataCatalog)
                         -> Result<(), HookError> {
        lock(self)?.on_pipeline_error(ctx, error, catalog)
    }
}

fn lock<H>(hook: &Mutex<H>) -> Result<std::sync::MutexGuard<'_, H>, HookError> {
    hook.lock().map_err(|_| HookError::Message("hook mutex poisoned".into()))
}

/// Despacho ordenado a los hooks registrados.
#[derive(Default)]
pub struct HookManager {
    hooks: Vec<Box<dyn PipelineHook>>,
}

impl HookManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Box<dyn PipelineHook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn before_pipeline_run(&mut self,
                               ctx: &RunContext<'_>,
                               pipeline: &Pipeline,
                               catalog: &mut DataCatalog)
                               -> Result<(), CoreError> {
        for h in self.hooks.iter_mut() {
            h.before_pipeline_run(ctx, pipeline, catalog).map_err(|e| wrap(h.name(), e))?;
        }
        Ok(())
    }

    pub fn before_node_run(&mut self, ctx: &RunContext<'_>, node: &Node, catalog: &DataCatalog) -> Result<(), CoreError> {
        for h in self.hooks.iter_mut() {
            h.before_node_run(ctx, node, catalog).map_err(|e| wrap(h.name(), e))?;
        }
        Ok(())
    }

    pub fn after_node_run(&mut self,
                          ctx: &RunContext<'_>,
                          node: &Node,
                          catalog: &DataCatalog,
                          outputs: &IndexMap<String, Data>)
                          -> Result<(), CoreError> {
        for h in self.hooks.iter_mut() {
            h.after_node_run(ctx, node, catalog, outputs).map_err(|e| wrap(h.name(), e))?;
        }
        Ok(())
    }

    /// Llama a todos los hooks aunque alguno falle; devuelve el primer error.
    pub fn after_pipeline_run(&mut self, ctx: &RunContext<'_>, catalog: &mut DataCatalog) -> Result<(), CoreError> {
        let mut first = None;
        for h in self.hooks.iter_mut() {
            if let Err(e) = h.after_pipeline_run(ctx, catalog) {
                keep_first(&mut first, h.name(), e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Igual que `after_pipeline_run`: el teardown nunca se salta.
    pub fn on_pipeline_error(&mut self,
                             ctx: &RunContext<'_>,
                             error: &CoreError,
                             catalog: &mut DataCatalog)
                             -> Result<(), CoreError> {
        let mut first = None;
        for h in self.hooks.iter_mut() {
            if let Err(e) = h.on_pipeline_error(ctx, error, catalog) {
                keep_first(&mut first, h.name(), e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

fn wrap(hook: &str, source: HookError) -> CoreError {
    CoreError::Hook { hook: hook.to_string(), source }
}

fn keep_first(first: &mut Option<CoreError>, hook: &str, source: HookError) {
    if first.is_some() {
        warn!("hooks:teardown_error hook={} error={} (suppressed)", hook, source);
    } else {
        *first = Some(wrap(hook, source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryFactory;

    #[derive(Default)]
    struct Probe {
        tag: &'static str,
        fail_teardown: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineHook for Probe {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn before_pipeline_run(&mut self, _: &RunContext<'_>, _: &Pipeline, _: &mut DataCatalog) -> Result<(), HookError> {
            self.log.lock().unwrap().push(format!("{}:before", self.tag));
            if self.fail_teardown {
                return Err(HookError::Message("refused".into()));
            }
            Ok(())
        }

        fn after_pipeline_run(&mut self, _: &RunContext<'_>, _: &mut DataCatalog) -> Result<(), HookError> {
            self.log.lock().unwrap().push(format!("{}:after", self.tag));
            if self.fail_teardown {
                return Err(HookError::Message(format!("{} teardown", self.tag)));
            }
            Ok(())
        }
    }

    fn manager(log: &Arc<Mutex<Vec<String>>>, fails: [bool; 3]) -> HookManager {
        let mut m = HookManager::new();
        for (tag, fail) in ["a", "b", "c"].into_iter().zip(fails) {
            m.register(Box::new(Probe { tag, fail_teardown: fail, log: log.clone() }));
        }
        m
    }

    #[test]
    fn before_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut m = manager(&log, [false, true, false]);
        let factory = MemoryFactory::new();
        let ctx = RunContext { run_id: Uuid::new_v4(), default_factory: &factory };
        let pipeline = Pipeline::new(vec![]).unwrap();
        let err = m.before_pipeline_run(&ctx, &pipeline, &mut DataCatalog::new()).unwrap_err();
        assert!(matches!(err, CoreError::Hook { ref hook, .. } if hook == "b"));
        assert_eq!(*log.lock().unwrap(), vec!["a:before", "b:before"]);
    }

    #[test]
    fn teardown_calls_every_hook_and_keeps_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut m = manager(&log, [false, true, true]);
        let factory = MemoryFactory::new();
        let ctx = RunContext { run_id: Uuid::new_v4(), default_factory: &factory };
        let err = m.after_pipeline_run(&ctx, &mut DataCatalog::new()).unwrap_err();
        assert_eq!(*log.lock().unwrap(), vec!["a:after", "b:after", "c:after"]);
        assert!(err.to_string().contains("b teardown"));
        assert_eq!(m.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn shared_hook_is_inspectable() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::new(Mutex::new(Probe { tag: "shared", fail_teardown: false, log: log.clone() }));
        let mut m = HookManager::new();
        m.register(Box::new(shared.clone()));
        let factory = MemoryFactory::new();
        let ctx = RunContext { run_id: Uuid::new_v4(), default_factory: &factory };
        m.after_pipeline_run(&ctx, &mut DataCatalog::new()).unwrap();
        assert_eq!(shared.lock().unwrap().name(), "shared");
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
