use std::sync::atomic::{AtomicU64, Ordering};

use accel_core::{CopyMode, Data, Dataset, DatasetError, DatasetHandle, MemoryDataset};
use log::debug;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Envuelve un handle con una copia en memoria.
///
/// - `load`: devuelve la copia si existe; si no, carga del interno y la
///   retiene.
/// - `save`: guarda en el interno y después retiene el valor. Si el interno
///   falla la copia previa no cambia.
#[derive(Debug)]
pub struct CachedDataset {
    inner: DatasetHandle,
    cache: MemoryDataset,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedDataset {
    pub fn new(inner: DatasetHandle, copy_mode: Option<CopyMode>) -> Self {
        Self { inner,
               cache: MemoryDataset::with_copy_mode(copy_mode),
               hits: AtomicU64::new(0),
               misses: AtomicU64::new(0) }
    }

    pub fn inner(&self) -> &DatasetHandle {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats { hits: self.hits.load(Ordering::Relaxed), misses: self.misses.load(Ordering::Relaxed) }
    }
}

impl Dataset for CachedDataset {
    fn load(&self) -> Result<Data, DatasetError> {
        if self.cache.exists()? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return self.cache.load();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let data = self.inner.load()?;
        debug!("cache:miss inner={}", self.inner.id());
        self.cache.save(data.clone())?;
        Ok(data)
    }

    fn save(&self, data: Data) -> Result<(), DatasetError> {
        self.inner.save(data.clone())?;
        self.cache.save(data)
    }

    fn exists(&self) -> Result<bool, DatasetError> {
        Ok(self.cache.exists()? || self.inner.exists()?)
    }

    fn describe(&self) -> Value {
        json!({ "type": "CachedDataset", "inner": self.inner.describe(), "stats": self.stats() })
    }

    fn release(&self) -> Result<(), DatasetError> {
        self.cache.release()?;
        self.inner.release()
    }

    fn is_volatile(&self) -> bool {
        self.inner.is_volatile()
    }
}
