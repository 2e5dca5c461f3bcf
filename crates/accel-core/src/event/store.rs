use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};

/// Almacenamiento append-only de eventos por corrida.
pub trait EventStore: Send {
    /// Agrega un evento y lo devuelve completo (con seq y ts).
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent;
    /// Eventos de una corrida en orden ascendente de seq.
    fn list(&self, run_id: Uuid) -> Vec<RunEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<RunEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let events = self.inner.entry(run_id).or_default();
        let ev = RunEvent { seq: events.len() as u64, run_id, kind, ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_run() {
        let mut store = InMemoryEventStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.append_kind(a, RunEventKind::RunStarted { pipeline_hash: "h".into(), node_count: 0 });
        store.append_kind(b, RunEventKind::RunFailed { error: "x".into() });
        let ev = store.append_kind(a, RunEventKind::RunCompleted { run_fingerprint: "f".into() });
        assert_eq!(ev.seq, 1);
        let letters: String = store.list(a).iter().map(|e| e.kind.letter()).collect();
        assert_eq!(letters, "IC");
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
