//! Pool acotado de guardados en segundo plano.
//!
//! - Cada guardado recibe un ticket; `pending` mantiene ticket → nombre
//!   mientras el guardado está en vuelo.
//! - Los resultados vuelven por un canal `mpsc` en orden de finalización.
//! - Un pánico dentro de `save` se captura y se reporta como
//!   `DatasetError::Failed` (rayon aborta el proceso si un job entra en pánico).
//! - `drain` espera a que todos los jobs terminen y luego suelta el pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use accel_core::{Data, DatasetError};
use dashmap::DashMap;
use log::{debug, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::MIN_WORKERS;
use crate::error::AcceleratorError;
use crate::shadow::CatalogShadow;

#[derive(Debug)]
struct SaveOutcome {
    ticket: u64,
    name: String,
    result: Result<(), DatasetError>,
}

/// Resultado de un drenaje. Ambas listas están en orden de finalización.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    pub completed: Vec<String>,
    pub failures: Vec<(String, DatasetError)>,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failures.len()
    }

    pub fn first_failure(&self) -> Option<&(String, DatasetError)> {
        self.failures.first()
    }
}

pub struct SavePool {
    pool: Option<ThreadPool>,
    sender: Option<Sender<SaveOutcome>>,
    receiver: Receiver<SaveOutcome>,
    pending: Arc<DashMap<u64, String>>,
    in_flight: Arc<AtomicUsize>,
    next_ticket: u64,
    submitted: usize,
}

impl SavePool {
    pub fn new(max_workers: usize) -> Result<Self, AcceleratorError> {
        let threads = max_workers.max(MIN_WORKERS);
        let pool = ThreadPoolBuilder::new().num_threads(threads)
                                           .thread_name(|i| format!("accel-save-{i}"))
                                           .build()
                                           .map_err(|e| AcceleratorError::Pool(e.to_string()))?;
        let (sender, receiver) = mpsc::channel();
        debug!("save_pool:new threads={}", threads);
        Ok(Self { pool: Some(pool),
                  sender: Some(sender),
                  receiver,
                  pending: Arc::new(DashMap::new()),
                  in_flight: Arc::new(AtomicUsize::new(0)),
                  next_ticket: 0,
                  submitted: 0 })
    }

    /// Programa `shadow.save(name, data)` y devuelve su ticket sin esperar.
    pub fn submit(&mut self, name: &str, data: Data, shadow: Arc<CatalogShadow>) -> Result<u64, AcceleratorError> {
        let (pool, sender) = match (&self.pool, &self.sender) {
            (Some(pool), Some(sender)) => (pool, sender.clone()),
            _ => return Err(AcceleratorError::Pool("save pool already drained".into())),
        };
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.submitted += 1;
        self.pending.insert(ticket, name.to_string());
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let pending = Arc::clone(&self.pending);
        let in_flight = Arc::clone(&self.in_flight);
        let name = name.to_string();
        debug!("deferred_save:start name={} ticket={}", name, ticket);
        pool.spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| shadow.save(&name, data)))
                    .unwrap_or_else(|payload| Err(DatasetError::Failed(panic_message(payload))));
                pending.remove(&ticket);
                in_flight.fetch_sub(1, Ordering::SeqCst);
                // el receptor vive hasta el final de `drain`
                let _ = sender.send(SaveOutcome { ticket, name, result });
            });
        Ok(ticket)
    }

    /// Guardados en vuelo.
    pub fn pending(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn pending_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pending.iter().map(|e| e.value().clone()).collect();
        names.sort();
        names
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn is_open(&self) -> bool {
        self.pool.is_some()
    }

    /// Bloquea hasta que todos los guardados terminen y suelta el pool.
    /// Llamarlo otra vez devuelve un reporte vacío.
    pub fn drain(&mut self) -> DrainReport {
        // sin este sender el canal se cierra cuando termine el último job
        self.sender.take();
        let mut report = DrainReport::default();
        for outcome in self.receiver.iter() {
            match outcome.result {
                Ok(()) => {
                    debug!("deferred_save:done name={} ticket={}", outcome.name, outcome.ticket);
                    report.completed.push(outcome.name);
                }
                Err(e) => {
                    warn!("deferred_save:failed name={} ticket={} error={}", outcome.name, outcome.ticket, e);
                    report.failures.push((outcome.name, e));
                }
            }
        }
        if self.pool.take().is_some() {
            debug!("save_pool:shutdown saves={}", report.total());
        }
        report
    }
}

impl Drop for SavePool {
    fn drop(&mut self) {
        if self.pool.is_some() {
            let report = self.drain();
            if !report.failures.is_empty() {
                warn!("save_pool:dropped_with_failures count={}", report.failures.len());
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("save panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("save panicked: {s}")
    } else {
        "save panicked".to_string()
    }
}
