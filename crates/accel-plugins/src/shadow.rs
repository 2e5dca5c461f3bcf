//! Copia congelada del catálogo tomada antes de la sustitución.
//!
//! Conserva los handles duraderos originales (mismo `HandleId`) para que los
//! guardados diferidos escriban en ellos aunque el catálogo vivo apunte ya a
//! handles volátiles. Nunca se muta después de `capture`; se comparte entre
//! hilos como `Arc<CatalogShadow>`.

use accel_core::{Data, DataCatalog, DatasetError, DatasetHandle};

#[derive(Debug)]
pub struct CatalogShadow {
    catalog: DataCatalog,
}

impl CatalogShadow {
    pub fn capture(catalog: &DataCatalog) -> Self {
        Self { catalog: catalog.shallow_copy() }
    }

    /// Guarda en el handle original. Los errores del dataset se devuelven
    /// sin transformar.
    pub fn save(&self, name: &str, data: Data) -> Result<(), DatasetError> {
        match self.catalog.get(name) {
            Some(handle) => handle.save(data),
            None => Err(DatasetError::Failed(format!("{name} is not in the catalog shadow"))),
        }
    }

    pub fn handle(&self, name: &str) -> Option<&DatasetHandle> {
        self.catalog.get(name)
    }

    pub fn handle_physical(&self, physical: &str) -> Option<&DatasetHandle> {
        self.catalog.get_physical(physical)
    }

    pub fn names(&self) -> Vec<String> {
        self.catalog.list()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}
