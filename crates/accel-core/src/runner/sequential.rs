//! Runner secuencial.
//!
//! Ejecuta los nodos del pipeline en orden topológico sobre un catálogo
//! provisto por el llamador, invocando los hooks registrados en cada
//! transición y registrando el diario de la corrida en un `EventStore`.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use log::{debug, error, info};
use serde_json::json;
use uuid::Uuid;

use crate::catalog::DataCatalog;
use crate::constants::ENGINE_VERSION;
use crate::data::Data;
use crate::errors::CoreError;
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::hashing::hash_value;
use crate::hooks::{HookManager, PipelineHook, RunContext};
use crate::io::{DatasetFactory, MemoryFactory};
use crate::pipeline::{Node, Pipeline};

use super::builder::RunnerBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub nodes_run: usize,
    pub run_fingerprint: String,
}

pub struct SequentialRunner<E: EventStore = InMemoryEventStore> {
    event_store: E,
    hooks: HookManager,
    default_factory: Box<dyn DatasetFactory>,
    last_run_id: Option<Uuid>,
}

impl SequentialRunner<InMemoryEventStore> {
    /// Runner sin hooks, diario en memoria y `MemoryFactory` por defecto.
    pub fn new() -> Self {
        Self::with_parts(InMemoryEventStore::default(), HookManager::new(), Box::new(MemoryFactory::new()))
    }

    pub fn builder() -> RunnerBuilder<InMemoryEventStore> {
        RunnerBuilder::new(InMemoryEventStore::default())
    }
}

impl Default for SequentialRunner<InMemoryEventStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EventStore> SequentialRunner<E> {
    pub fn builder_with_store(event_store: E) -> RunnerBuilder<E> {
        RunnerBuilder::new(event_store)
    }

    pub(crate) fn with_parts(event_store: E, hooks: HookManager, default_factory: Box<dyn DatasetFactory>) -> Self {
        Self { event_store, hooks, default_factory, last_run_id: None }
    }

    pub fn add_hook(&mut self, hook: Box<dyn PipelineHook>) {
        self.hooks.register(hook);
    }

    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.names()
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn last_run_id(&self) -> Option<Uuid> {
        self.last_run_id
    }

    /// Ejecuta `pipeline` sobre `catalog`.
    ///
    /// Las entradas libres deben estar registradas. Los datasets del pipeline
    /// sin registrar reciben un handle por defecto de la fábrica (después de
    /// `before_pipeline_run`). Si la corrida falla se invoca
    /// `on_pipeline_error`; si además falla ese teardown se devuelve
    /// `CoreError::Teardown` con ambos errores.
    pub fn run(&mut self, pipeline: &Pipeline, catalog: &mut DataCatalog) -> Result<RunSummary, CoreError> {
        let missing: Vec<String> = pipeline.inputs().into_iter().filter(|n| !catalog.contains(n)).collect();
        if !missing.is_empty() {
            error!("run:missing_inputs inputs={:?}", missing);
            return Err(CoreError::MissingInputs(missing));
        }

        let run_id = Uuid::new_v4();
        self.last_run_id = Some(run_id);
        let pipeline_hash = pipeline.definition_hash();
        info!("run:start run_id={} nodes={} hash={}", run_id, pipeline.len(), pipeline_hash);
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunStarted { pipeline_hash: pipeline_hash.clone(),
                                                                node_count: pipeline.len() });

        let Self { event_store, hooks, default_factory, .. } = self;
        let ctx = RunContext { run_id, default_factory: &**default_factory };

        let outcome = execute(event_store, hooks, &ctx, pipeline, catalog);
        match outcome {
            Ok(node_fps) => match hooks.after_pipeline_run(&ctx, catalog) {
                Ok(()) => {
                    let run_fingerprint = hash_value(&json!({
                        "engine_version": ENGINE_VERSION,
                        "pipeline_hash": pipeline_hash,
                        "node_fingerprints": node_fps,
                    }));
                    event_store.append_kind(run_id,
                                            RunEventKind::RunCompleted { run_fingerprint: run_fingerprint.clone() });
                    info!("run:complete run_id={} fingerprint={}", run_id, run_fingerprint);
                    Ok(RunSummary { run_id, nodes_run: node_fps.len(), run_fingerprint })
                }
                Err(err) => Err(fail_run(event_store, run_id, err)),
            },
            Err(err) => {
                let err = match hooks.on_pipeline_error(&ctx, &err, catalog) {
                    Ok(()) => err,
                    Err(CoreError::Hook { hook, source }) => {
                        CoreError::Teardown { hook, source, original: Box::new(err) }
                    }
                    Err(other) => other,
                };
                Err(fail_run(event_store, run_id, err))
            }
        }
    }

    /// Eventos de la última corrida.
    pub fn events(&self) -> Option<Vec<RunEvent>> {
        self.last_run_id.map(|id| self.event_store.list(id))
    }

    /// Traza compacta de la última corrida (`I S F ... C|E`).
    pub fn event_variants(&self) -> Option<Vec<&'static str>> {
        self.events().map(|events| events.iter().map(|e| e.kind.letter()).collect())
    }

    pub fn run_fingerprint(&self) -> Option<String> {
        self.events()?.iter().rev().find_map(|e| match &e.kind {
                                          RunEventKind::RunCompleted { run_fingerprint } => {
                                              Some(run_fingerprint.clone())
                                          }
                                          _ => None,
                                      })
    }
}

fn fail_run<E: EventStore>(event_store: &mut E, run_id: Uuid, err: CoreError) -> CoreError {
    error!("run:failed run_id={} error={}", run_id, err);
    event_store.append_kind(run_id, RunEventKind::RunFailed { error: err.to_string() });
    err
}

/// Hooks de inicio, handles por defecto y nodos. Devuelve los fingerprints
/// de los nodos ejecutados.
fn execute<E: EventStore>(event_store: &mut E,
                          hooks: &mut HookManager,
                          ctx: &RunContext<'_>,
                          pipeline: &Pipeline,
                          catalog: &mut DataCatalog)
                          -> Result<Vec<String>, CoreError> {
    hooks.before_pipeline_run(ctx, pipeline, catalog)?;

    for name in pipeline.datasets() {
        if !catalog.contains(&name) {
            let handle = ctx.default_factory.create(&name).map_err(|e| CoreError::dataset(&name, e))?;
            debug!("run:default_dataset name={} handle={}", name, handle.id());
            catalog.add(&name, handle, false)?;
        }
    }

    let free_inputs = pipeline.inputs();
    let free_outputs = pipeline.outputs();
    let mut load_counts: HashMap<&str, usize> = HashMap::new();
    for node in pipeline.nodes() {
        for input in node.inputs() {
            *load_counts.entry(input.as_str()).or_default() += 1;
        }
    }

    let catalog: &DataCatalog = catalog;
    let mut node_fps = Vec::with_capacity(pipeline.len());
    for (idx, node) in pipeline.nodes().iter().enumerate() {
        event_store.append_kind(ctx.run_id, RunEventKind::NodeStarted { node_index: idx, node: node.name().to_string() });
        match run_node(hooks, ctx, node, catalog) {
            Ok((input_fps, outputs)) => {
                let output_fps: Vec<String> = outputs.values().map(Data::fingerprint).collect();
                let fingerprint = hash_value(&json!({
                    "engine_version": ENGINE_VERSION,
                    "node_index": idx,
                    "node": node.name(),
                    "inputs": input_fps,
                    "outputs": output_fps,
                }));
                event_store.append_kind(ctx.run_id,
                                        RunEventKind::NodeFinished { node_index: idx,
                                                                     node: node.name().to_string(),
                                                                     outputs: output_fps,
                                                                     fingerprint: fingerprint.clone() });
                node_fps.push(fingerprint);
            }
            Err(err) => {
                let fingerprint = hash_value(&json!({
                    "engine_version": ENGINE_VERSION,
                    "node_index": idx,
                    "node": node.name(),
                    "error": err.to_string(),
                }));
                event_store.append_kind(ctx.run_id,
                                        RunEventKind::NodeFailed { node_index: idx,
                                                                   node: node.name().to_string(),
                                                                   error: err.to_string(),
                                                                   fingerprint });
                return Err(err);
            }
        }
        release_consumed(catalog, node, &mut load_counts, &free_inputs, &free_outputs)?;
    }
    Ok(node_fps)
}

type NodeRun = (Vec<String>, IndexMap<String, Data>);

fn run_node(hooks: &mut HookManager,
            ctx: &RunContext<'_>,
            node: &Node,
            catalog: &DataCatalog)
            -> Result<NodeRun, CoreError> {
    let inputs = node.inputs().iter().map(|n| catalog.load(n)).collect::<Result<Vec<_>, _>>()?;
    let input_fps = inputs.iter().map(Data::fingerprint).collect();
    hooks.before_node_run(ctx, node, catalog)?;
    let produced = node.run(&inputs)?;
    let outputs: IndexMap<String, Data> = node.outputs().iter().cloned().zip(produced).collect();
    hooks.after_node_run(ctx, node, catalog, &outputs)?;
    for (name, data) in &outputs {
        catalog.save(name, data.clone())?;
    }
    Ok((input_fps, outputs))
}

/// Libera datasets cuyo último consumidor ya corrió. Entradas y salidas
/// libres nunca se liberan.
fn release_consumed<'p>(catalog: &DataCatalog,
                        node: &'p Node,
                        load_counts: &mut HashMap<&'p str, usize>,
                        free_inputs: &BTreeSet<String>,
                        free_outputs: &BTreeSet<String>)
                        -> Result<(), CoreError> {
    for input in node.inputs() {
        let remaining = load_counts.get_mut(input.as_str()).map(|c| {
                                                             *c = c.saturating_sub(1);
                                                             *c
                                                         });
        if remaining.unwrap_or(0) == 0 && !free_inputs.contains(input) {
            debug!("run:release name={}", input);
            catalog.release(input)?;
        }
    }
    for output in node.outputs() {
        let pending_loads = load_counts.get(output.as_str()).copied().unwrap_or(0);
        if pending_loads == 0 && !free_outputs.contains(output) {
            debug!("run:release name={}", output);
            catalog.release(output)?;
        }
    }
    Ok(())
}
