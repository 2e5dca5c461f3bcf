//! Sustitución de datasets intermedios por handles volátiles.
//!
//! Conjunto sustituible = identificadores del catálogo
//!   − entradas libres del pipeline
//!   − salidas libres del pipeline
//!   − identificadores transcodificados (`@`).
//!
//! La sustitución es todo-o-nada: primero se crean todos los handles y sólo
//! después se registran con un único `add_all`.

use std::collections::BTreeSet;

use accel_core::pipeline::is_transcoded;
use accel_core::{DataCatalog, DatasetFactory, DatasetHandle, Pipeline};
use log::debug;

use crate::error::AcceleratorError;

pub fn substitution_set(catalog: &DataCatalog, pipeline: &Pipeline) -> BTreeSet<String> {
    let inputs = pipeline.inputs();
    let outputs = pipeline.outputs();
    catalog.list()
           .into_iter()
           .filter(|name| !inputs.contains(name) && !outputs.contains(name) && !is_transcoded(name))
           .collect()
}

/// Reemplaza cada miembro del conjunto sustituible por un handle nuevo de
/// `factory`. Un error de la fábrica deja el catálogo intacto.
pub fn substitute_volatile(catalog: &mut DataCatalog,
                           pipeline: &Pipeline,
                           factory: &dyn DatasetFactory)
                           -> Result<BTreeSet<String>, AcceleratorError> {
    let targets = substitution_set(catalog, pipeline);
    let mut handles: Vec<(String, DatasetHandle)> = Vec::with_capacity(targets.len());
    for name in &targets {
        let handle = factory.create(name).map_err(|source| AcceleratorError::Substitution { name: name.clone(),
                                                                                            source })?;
        debug!("substitution:volatile name={} handle={}", name, handle.id());
        handles.push((name.clone(), handle));
    }
    catalog.add_all(handles, true)?;
    Ok(targets)
}
