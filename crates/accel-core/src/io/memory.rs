use std::sync::RwLock;

use serde_json::{json, Value};

use super::Dataset;
use crate::data::{CopyMode, Data};
use crate::errors::DatasetError;

/// Dataset en memoria, volátil. Aplica la política de copia al guardar y
/// al cargar (inferida por valor si no se fijó una).
#[derive(Debug, Default)]
pub struct MemoryDataset {
    data: RwLock<Option<Data>>,
    copy_mode: Option<CopyMode>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Data) -> Self {
        Self { data: RwLock::new(Some(data)), copy_mode: None }
    }

    pub fn with_copy_mode(copy_mode: Option<CopyMode>) -> Self {
        Self { data: RwLock::new(None), copy_mode }
    }

    fn mode_for(&self, data: &Data) -> CopyMode {
        self.copy_mode.unwrap_or_else(|| CopyMode::infer(data))
    }
}

fn poisoned<T>(_: T) -> DatasetError {
    DatasetError::Poisoned("MemoryDataset".into())
}

impl Dataset for MemoryDataset {
    fn load(&self) -> Result<Data, DatasetError> {
        let guard = self.data.read().map_err(poisoned)?;
        match guard.as_ref() {
            Some(data) => Ok(self.mode_for(data).apply(data)),
            None => Err(DatasetError::Empty("MemoryDataset".into())),
        }
    }

    fn save(&self, data: Data) -> Result<(), DatasetError> {
        let stored = self.mode_for(&data).apply(&data);
        *self.data.write().map_err(poisoned)? = Some(stored);
        Ok(())
    }

    fn exists(&self) -> Result<bool, DatasetError> {
        Ok(self.data.read().map_err(poisoned)?.is_some())
    }

    fn describe(&self) -> Value {
        let kind = self.data
                       .read()
                       .ok()
                       .and_then(|g| g.as_ref().map(|d| if d.is_scalar() { "scalar" } else { "document" }))
                       .unwrap_or("empty");
        json!({ "type": "MemoryDataset", "data": kind, "copy_mode": self.copy_mode })
    }

    fn release(&self) -> Result<(), DatasetError> {
        *self.data.write().map_err(poisoned)? = None;
        Ok(())
    }

    fn is_volatile(&self) -> bool {
        true
    }
}
