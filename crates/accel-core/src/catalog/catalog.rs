use indexmap::IndexMap;
use log::debug;

use super::NamingRule;
use crate::data::Data;
use crate::errors::CoreError;
use crate::io::DatasetHandle;

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    handle: DatasetHandle,
}

/// Registro ordenado identificador → handle.
///
/// Internamente la clave es el nombre físico (`NamingRule::normalize`); dos
/// identificadores lógicos que colapsan al mismo físico no pueden coexistir.
/// `list` devuelve los lógicos en orden de registro. Reemplazar un handle
/// conserva la posición.
#[derive(Debug, Clone, Default)]
pub struct DataCatalog {
    naming: NamingRule,
    entries: IndexMap<String, CatalogEntry>,
}

impl DataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming(naming: NamingRule) -> Self {
        Self { naming, entries: IndexMap::new() }
    }

    pub fn naming(&self) -> NamingRule {
        self.naming
    }

    pub fn physical_name(&self, name: &str) -> String {
        self.naming.normalize(name).into_owned()
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.values().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&DatasetHandle> {
        self.entries
            .get(&*self.naming.normalize(name))
            .filter(|e| e.name == name)
            .map(|e| &e.handle)
    }

    pub fn get_physical(&self, physical: &str) -> Option<&DatasetHandle> {
        self.entries.get(physical).map(|e| &e.handle)
    }

    pub fn handle(&self, name: &str) -> Result<&DatasetHandle, CoreError> {
        self.get(name).ok_or_else(|| CoreError::DatasetNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatasetHandle)> {
        self.entries.values().map(|e| (e.name.as_str(), &e.handle))
    }

    /// Registra `handle` bajo `name`. Con `replace = false` un nombre ya
    /// registrado es un error.
    pub fn add(&mut self, name: &str, handle: DatasetHandle, replace: bool) -> Result<(), CoreError> {
        let physical = self.check_slot(name, replace)?;
        debug!("catalog:add name={} physical={} handle={} replace={}", name, physical, handle.id(), replace);
        self.entries.insert(physical, CatalogEntry { name: name.to_string(), handle });
        Ok(())
    }

    /// Registro masivo atómico: se valida todo antes de mutar, de modo que
    /// un error deja el catálogo intacto.
    pub fn add_all<I>(&mut self, handles: I, replace: bool) -> Result<(), CoreError>
        where I: IntoIterator<Item = (String, DatasetHandle)>
    {
        let mut staged: IndexMap<String, CatalogEntry> = IndexMap::new();
        for (name, handle) in handles {
            let physical = self.check_slot(&name, replace)?;
            if let Some(prev) = staged.get(&physical) {
                if prev.name != name || !replace {
                    return Err(CoreError::DatasetAlreadyExists(name));
                }
            }
            staged.insert(physical, CatalogEntry { name, handle });
        }
        debug!("catalog:add_all count={} replace={}", staged.len(), replace);
        for (physical, entry) in staged {
            self.entries.insert(physical, entry);
        }
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Data, CoreError> {
        self.handle(name)?.load().map_err(|e| CoreError::dataset(name, e))
    }

    pub fn save(&self, name: &str, data: Data) -> Result<(), CoreError> {
        self.handle(name)?.save(data).map_err(|e| CoreError::dataset(name, e))
    }

    pub fn exists(&self, name: &str) -> Result<bool, CoreError> {
        match self.get(name) {
            Some(h) => h.exists().map_err(|e| CoreError::dataset(name, e)),
            None => Ok(false),
        }
    }

    pub fn release(&self, name: &str) -> Result<(), CoreError> {
        match self.get(name) {
            Some(h) => h.release().map_err(|e| CoreError::dataset(name, e)),
            None => Ok(()),
        }
    }

    /// Copia superficial: mismas entradas, mismos handles (mismo `HandleId`).
    /// Mutar la copia no afecta al original.
    pub fn shallow_copy(&self) -> DataCatalog {
        self.clone()
    }

    fn check_slot(&self, name: &str, replace: bool) -> Result<String, CoreError> {
        let physical = self.physical_name(name);
        if let Some(existing) = self.entries.get(&physical) {
            // otro lógico ya ocupa el mismo nombre físico
            if existing.name != name || !replace {
                return Err(CoreError::DatasetAlreadyExists(name.to_string()));
            }
        }
        Ok(physical)
    }
}
