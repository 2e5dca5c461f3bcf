//! Dataset duradero respaldado por un archivo JSON, para las pruebas de punta a punta.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use accelerator::prelude::*;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct JsonFileDataset {
    path: PathBuf,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl JsonFileDataset {
    pub fn new(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self { path: path.into(), loads: AtomicUsize::new(0), saves: AtomicUsize::new(0) })
    }

    pub fn seeded(path: impl Into<PathBuf>, value: Value) -> Arc<Self> {
        let ds = Self::new(path);
        fs::write(&ds.path, serde_json::to_vec(&value).unwrap()).unwrap();
        ds
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Contenido actual del archivo, sin pasar por `load`.
    pub fn on_disk(&self) -> Option<Value> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

impl Dataset for JsonFileDataset {
    fn load(&self) -> Result<Data, DatasetError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let bytes = fs::read(&self.path).map_err(|e| DatasetError::Io(format!("{}: {e}", self.path.display())))?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| DatasetError::Serialization(e.to_string()))?;
        Ok(Data::new(value))
    }

    fn save(&self, data: Data) -> Result<(), DatasetError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let bytes = serde_json::to_vec_pretty(data.value()).map_err(|e| DatasetError::Serialization(e.to_string()))?;
        fs::write(&self.path, bytes).map_err(|e| DatasetError::Io(format!("{}: {e}", self.path.display())))
    }

    fn exists(&self) -> Result<bool, DatasetError> {
        Ok(self.path.exists())
    }

    fn describe(&self) -> Value {
        json!({"type": "JsonFileDataset", "path": self.path.display().to_string()})
    }
}

pub fn register(catalog: &mut DataCatalog, name: &str, ds: &Arc<JsonFileDataset>) {
    catalog.add(name, DatasetHandle::from_arc(ds.clone()), false).unwrap();
}

pub fn double_x(inp: &[Data]) -> Result<Vec<Data>, NodeFnError> {
    let rows = inp[0].value().as_array().ok_or("expected array")?;
    let out = rows.iter()
                  .map(|r| json!({"id": r["id"], "x": r["x"].as_i64().unwrap_or(0) * 2}))
                  .collect::<Vec<_>>();
    Ok(vec![Data::new(json!(out))])
}

pub fn total_x(inp: &[Data]) -> Result<Vec<Data>, NodeFnError> {
    let sum: i64 = inp.iter()
                      .filter_map(|d| d.value().as_array())
                      .flatten()
                      .filter_map(|r| r["x"].as_i64())
                      .sum();
    Ok(vec![Data::new(json!(sum))])
}
