use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use accel_core::{Data, DataCatalog, DatasetFactory, DatasetHandle, NamingRule, Pipeline};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;

use super::pool::{DrainReport, SavePool};
use crate::config::AcceleratorConfig;
use crate::error::AcceleratorError;
use crate::shadow::CatalogShadow;
use crate::substitution::substitute_volatile;

/// Fases de una corrida con guardados diferidos.
///
/// `Init → Active → Draining → Complete | Failed`. `Draining` sólo se
/// observa mientras `drain` espera al pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Init,
    Active,
    Draining,
    Complete,
    Failed,
}

/// Estado por corrida: sombra del catálogo, nombres registrados al inicio,
/// conjunto sustituido y pool de guardados.
pub struct DeferredSaves {
    phase: RunPhase,
    naming: NamingRule,
    shadow: Arc<CatalogShadow>,
    registered: BTreeSet<String>,
    substituted: BTreeSet<String>,
    scheduled: HashMap<String, usize>,
    pool: SavePool,
    report: Option<DrainReport>,
}

impl DeferredSaves {
    /// Captura la sombra, sustituye intermedios por handles de `factory` y
    /// abre el pool. Si la sustitución falla el catálogo queda intacto.
    pub fn start(catalog: &mut DataCatalog,
                 pipeline: &Pipeline,
                 factory: &dyn DatasetFactory,
                 config: &AcceleratorConfig)
                 -> Result<Self, AcceleratorError> {
        if catalog.naming() != config.naming {
            warn!("deferred:naming_mismatch catalog={} plugin={}", catalog.naming(), config.naming);
        }
        let shadow = Arc::new(CatalogShadow::capture(catalog));
        let registered: BTreeSet<String> = catalog.list().into_iter().collect();
        let substituted = substitute_volatile(catalog, pipeline, factory)?;
        let pool = SavePool::new(config.max_workers)?;
        info!("deferred:start registered={} substituted={:?} workers={}",
              registered.len(),
              substituted,
              config.max_workers);
        Ok(Self { phase: RunPhase::Active,
                  naming: config.naming,
                  shadow,
                  registered,
                  substituted,
                  scheduled: HashMap::new(),
                  pool,
                  report: None })
    }

    /// Programa un guardado duradero por cada salida registrada al inicio
    /// cuyo handle vivo ya no es el original. Devuelve cuántos programó.
    pub fn after_node(&mut self, catalog: &DataCatalog, outputs: &IndexMap<String, Data>) -> Result<usize, AcceleratorError> {
        if self.phase != RunPhase::Active {
            return Err(AcceleratorError::NotActive(self.phase));
        }
        let mut scheduled = 0;
        for (name, data) in outputs {
            if !self.registered.contains(name) {
                debug!("deferred:skip_unregistered name={}", name);
                continue;
            }
            let physical = self.naming.normalize(name);
            let unknown = || AcceleratorError::UnknownPhysicalName { name: name.clone(),
                                                                     physical: physical.to_string() };
            let original = self.shadow.handle_physical(&physical).ok_or_else(unknown)?;
            let live = catalog.get_physical(&physical).ok_or_else(unknown)?;
            if live.same_handle(original) {
                debug!("deferred:skip_unchanged name={} handle={}", name, live.id());
                continue;
            }
            let count = self.scheduled.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                // sin orden entre guardados del mismo nombre: gana el último en terminar
                warn!("deferred:duplicate_producer name={} saves={}", name, count);
            }
            self.pool.submit(name, data.clone(), Arc::clone(&self.shadow))?;
            scheduled += 1;
        }
        Ok(scheduled)
    }

    /// Espera todos los guardados y cierra el pool. Idempotente: una segunda
    /// llamada no espera nada y devuelve el mismo resultado.
    ///
    /// Si algún guardado falló se devuelve el primero en orden de
    /// finalización; el resto sólo se registra.
    pub fn drain(&mut self) -> Result<DrainReport, AcceleratorError> {
        if self.report.is_none() {
            self.phase = RunPhase::Draining;
            let report = self.pool.drain();
            for (name, err) in report.failures.iter().skip(1) {
                warn!("deferred:suppressed_failure name={} error={}", name, err);
            }
            self.phase = if report.failures.is_empty() { RunPhase::Complete } else { RunPhase::Failed };
            info!("deferred:drained saved={} failed={}", report.completed.len(), report.failures.len());
            self.report = Some(report);
        }
        match self.report.as_ref() {
            Some(report) => match report.first_failure() {
                Some((name, source)) => Err(AcceleratorError::DeferredSave { name: name.clone(),
                                                                             source: source.clone() }),
                None => Ok(report.clone()),
            },
            None => Err(AcceleratorError::NotStarted),
        }
    }

    /// Devuelve a `catalog` los handles duraderos de los datasets sustituidos.
    ///
    /// Sólo toca nombres sustituidos; el resto del catálogo queda igual. Se
    /// llama después de `drain`, así ningún guardado queda apuntando a un
    /// handle volátil en una corrida posterior sobre el mismo catálogo.
    pub fn restore(&self, catalog: &mut DataCatalog) -> Result<usize, AcceleratorError> {
        let durable: Vec<(String, DatasetHandle)> =
            self.substituted
                .iter()
                .filter_map(|name| self.shadow.handle(name).map(|h| (name.clone(), h.clone())))
                .collect();
        let restored = durable.len();
        catalog.add_all(durable, true)?;
        debug!("deferred:restored count={}", restored);
        Ok(restored)
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn pending(&self) -> usize {
        self.pool.pending()
    }

    pub fn pending_names(&self) -> Vec<String> {
        self.pool.pending_names()
    }

    pub fn substituted(&self) -> &BTreeSet<String> {
        &self.substituted
    }

    pub fn registered(&self) -> &BTreeSet<String> {
        &self.registered
    }

    pub fn shadow(&self) -> &CatalogShadow {
        &self.shadow
    }

    pub fn report(&self) -> Option<&DrainReport> {
        self.report.as_ref()
    }
}
