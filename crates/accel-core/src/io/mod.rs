//! Contrato de datasets y handles con identidad.
//!
//! Un `DatasetHandle` envuelve un `Arc<dyn Dataset>` y un `HandleId` único:
//! clonar el handle conserva el id, crear uno nuevo (aunque envuelva el mismo
//! `Arc`) asigna otro. Los plugins comparan ids, nunca direcciones.

mod memory;

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::data::{CopyMode, Data};
use crate::errors::DatasetError;

pub use memory::MemoryDataset;

/// Operaciones mínimas de un dataset.
///
/// `save` debe poder invocarse desde un hilo distinto al que creó el dataset
/// (de ahí `Send + Sync`).
pub trait Dataset: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Data, DatasetError>;
    fn save(&self, data: Data) -> Result<(), DatasetError>;
    fn exists(&self) -> Result<bool, DatasetError>;
    /// Descripción breve para logs.
    fn describe(&self) -> Value;
    /// Libera datos en memoria. No-op por defecto.
    fn release(&self) -> Result<(), DatasetError> {
        Ok(())
    }
    /// `true` para datasets que no sobreviven a la corrida.
    fn is_volatile(&self) -> bool {
        false
    }
}

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    fn next() -> Self {
        Self(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

#[derive(Clone)]
pub struct DatasetHandle {
    id: HandleId,
    inner: Arc<dyn Dataset>,
}

impl DatasetHandle {
    pub fn new<D: Dataset + 'static>(dataset: D) -> Self {
        Self::from_arc(Arc::new(dataset))
    }

    /// Handle nuevo (id nuevo) sobre un dataset ya compartido.
    pub fn from_arc(inner: Arc<dyn Dataset>) -> Self {
        Self { id: HandleId::next(), inner }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn dataset(&self) -> &Arc<dyn Dataset> {
        &self.inner
    }

    pub fn same_handle(&self, other: &DatasetHandle) -> bool {
        self.id == other.id
    }
}

impl Deref for DatasetHandle {
    type Target = dyn Dataset;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl fmt::Debug for DatasetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetHandle")
         .field("id", &self.id)
         .field("dataset", &self.inner)
         .finish()
    }
}

/// Fábrica del dataset por defecto del runner (volátil, en memoria).
pub trait DatasetFactory: Send + Sync {
    fn create(&self, name: &str) -> Result<DatasetHandle, DatasetError>;
}

impl<T: DatasetFactory + ?Sized> DatasetFactory for Arc<T> {
    fn create(&self, name: &str) -> Result<DatasetHandle, DatasetError> {
        (**self).create(name)
    }
}

impl<T: DatasetFactory + ?Sized> DatasetFactory for Box<T> {
    fn create(&self, name: &str) -> Result<DatasetHandle, DatasetError> {
        (**self).create(name)
    }
}

/// Crea `MemoryDataset`s vacíos con la política de copia configurada.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryFactory {
    copy_mode: Option<CopyMode>,
}

impl MemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_copy_mode(copy_mode: Option<CopyMode>) -> Self {
        Self { copy_mode }
    }

    pub fn copy_mode(&self) -> Option<CopyMode> {
        self.copy_mode
    }
}

impl DatasetFactory for MemoryFactory {
    fn create(&self, _name: &str) -> Result<DatasetHandle, DatasetError> {
        Ok(DatasetHandle::new(MemoryDataset::with_copy_mode(self.copy_mode)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_id_new_handles_do_not() {
        let h = DatasetHandle::new(MemoryDataset::new());
        let c = h.clone();
        assert!(h.same_handle(&c));
        let rewrapped = DatasetHandle::from_arc(h.dataset().clone());
        assert!(!h.same_handle(&rewrapped));
    }

    #[test]
    fn memory_factory_creates_empty_volatile_datasets() {
        let factory = MemoryFactory::with_copy_mode(Some(CopyMode::Assign));
        let a = factory.create("a").unwrap();
        let b = factory.create("a").unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.is_volatile());
        assert!(!a.exists().unwrap());
        a.save(Data::new(json!(1))).unwrap();
        assert!(!b.exists().unwrap());
    }
}
