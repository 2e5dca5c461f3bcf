//! Eventos del diario de una corrida.
//!
//! - El runner emite un evento por transición observable (inicio, nodo,
//!   cierre) a un `EventStore` append-only.
//! - Los fingerprints excluyen `ts`: dos corridas con la misma definición y
//!   los mismos datos producen los mismos fingerprints.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de cada `run_id`.
    RunStarted { pipeline_hash: String, node_count: usize },
    NodeStarted { node_index: usize, node: String },
    /// `outputs` son los fingerprints de los valores producidos, en orden.
    NodeFinished {
        node_index: usize,
        node: String,
        outputs: Vec<String>,
        fingerprint: String,
    },
    NodeFailed {
        node_index: usize,
        node: String,
        error: String,
        fingerprint: String,
    },
    /// Hash de los fingerprints de nodos en orden de ejecución.
    RunCompleted { run_fingerprint: String },
    /// Error de la corrida, incluido un fallo de teardown de hooks.
    RunFailed { error: String },
}

impl RunEventKind {
    /// Letra compacta para trazas: I S F X C E.
    pub fn letter(&self) -> &'static str {
        match self {
            RunEventKind::RunStarted { .. } => "I",
            RunEventKind::NodeStarted { .. } => "S",
            RunEventKind::NodeFinished { .. } => "F",
            RunEventKind::NodeFailed { .. } => "X",
            RunEventKind::RunCompleted { .. } => "C",
            RunEventKind::RunFailed { .. } => "E",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}
