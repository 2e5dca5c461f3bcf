//! Dobles de prueba compartidos por los tests de integración.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use accel_core::pipeline::NodeFnError;
use accel_core::{Data, DataCatalog, Dataset, DatasetError, DatasetFactory, DatasetHandle};
use serde_json::{json, Value};

/// Dataset que cuenta cargas y guardados. Puede fallar o tardar al guardar.
#[derive(Debug, Default)]
pub struct RecordingDataset {
    label: String,
    value: Mutex<Option<Data>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    fail_saves: bool,
    save_delay: Option<Duration>,
    volatile: bool,
}

impl RecordingDataset {
    pub fn new(label: &str) -> Self {
        Self { label: label.to_string(), ..Default::default() }
    }

    pub fn with_value(self, v: Value) -> Self {
        *self.value.lock().unwrap() = Some(Data::new(v));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn delayed(mut self, ms: u64) -> Self {
        self.save_delay = Some(Duration::from_millis(ms));
        self
    }

    pub fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<Data> {
        self.value.lock().unwrap().clone()
    }
}

impl Dataset for RecordingDataset {
    fn load(&self) -> Result<Data, DatasetError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.value.lock().unwrap().clone().ok_or_else(|| DatasetError::Empty(self.label.clone()))
    }

    fn save(&self, data: Data) -> Result<(), DatasetError> {
        if let Some(d) = self.save_delay {
            thread::sleep(d);
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(DatasetError::Io(format!("{} is read-only", self.label)));
        }
        *self.value.lock().unwrap() = Some(data);
        Ok(())
    }

    fn exists(&self) -> Result<bool, DatasetError> {
        Ok(self.value.lock().unwrap().is_some())
    }

    fn describe(&self) -> Value {
        json!({"type": "RecordingDataset", "label": self.label})
    }

    fn release(&self) -> Result<(), DatasetError> {
        if self.volatile {
            *self.value.lock().unwrap() = None;
        }
        Ok(())
    }

    fn is_volatile(&self) -> bool {
        self.volatile
    }
}

/// Fábrica de volátiles que recuerda lo que creó, por nombre.
#[derive(Clone, Default)]
pub struct RecordingFactory {
    created: Arc<Mutex<Vec<(String, Arc<RecordingDataset>)>>>,
}

impl RecordingFactory {
    pub fn get(&self, name: &str) -> Option<Arc<RecordingDataset>> {
        self.created.lock().unwrap().iter().rev().find(|(n, _)| n == name).map(|(_, d)| d.clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.created.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl DatasetFactory for RecordingFactory {
    fn create(&self, name: &str) -> Result<DatasetHandle, DatasetError> {
        let ds = RecordingDataset::new(name).volatile().shared();
        self.created.lock().unwrap().push((name.to_string(), ds.clone()));
        Ok(DatasetHandle::from_arc(ds))
    }
}

pub struct FailingFactory;

impl DatasetFactory for FailingFactory {
    fn create(&self, name: &str) -> Result<DatasetHandle, DatasetError> {
        Err(DatasetError::Io(format!("cannot allocate {name}")))
    }
}

pub fn register(catalog: &mut DataCatalog, name: &str, ds: &Arc<RecordingDataset>) {
    catalog.add(name, DatasetHandle::from_arc(ds.clone()), false).unwrap();
}

pub fn add_one(inp: &[Data]) -> Result<Vec<Data>, NodeFnError> {
    let n = inp[0].value().as_i64().ok_or("expected integer")?;
    Ok(vec![Data::new(json!(n + 1))])
}

pub fn sum(inp: &[Data]) -> Result<Vec<Data>, NodeFnError> {
    let total: i64 = inp.iter().filter_map(|d| d.value().as_i64()).sum();
    Ok(vec![Data::new(json!(total))])
}

pub fn split(inp: &[Data]) -> Result<Vec<Data>, NodeFnError> {
    let n = inp[0].value().as_i64().ok_or("expected integer")?;
    Ok(vec![Data::new(json!(n * 10)), Data::new(json!(n * 100))])
}
