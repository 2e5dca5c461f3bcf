//! accel-core: superficie del host (catálogo, datasets, pipeline, runner y
//! hooks) sobre la que se montan los plugins de aceleración.
//!
//! Módulos:
//! - `catalog`: registro ordenado de datasets y regla de nombres físicos.
//! - `data`: valor `Data` y políticas de copia.
//! - `io`: trait `Dataset`, handles con `HandleId` y `MemoryDataset`.
//! - `pipeline`: nodos, orden topológico y conjuntos frontera.
//! - `hooks`: `PipelineHook`, `HookManager` y `RunContext`.
//! - `runner`: `SequentialRunner` y su builder.
//! - `event`: diario append-only de corridas.
//! - `hashing`: JSON canónico + blake3.
pub mod catalog;
pub mod constants;
pub mod data;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod hooks;
pub mod io;
pub mod pipeline;
pub mod runner;

pub use catalog::{DataCatalog, NamingRule};
pub use data::{CopyMode, Data};
pub use errors::{CoreError, DatasetError, HookError};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use hooks::{HookManager, PipelineHook, RunContext};
pub use io::{Dataset, DatasetFactory, DatasetHandle, HandleId, MemoryDataset, MemoryFactory};
pub use pipeline::{Node, Pipeline};
pub use runner::{RunSummary, RunnerBuilder, SequentialRunner};
