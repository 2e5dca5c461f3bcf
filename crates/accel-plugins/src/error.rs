//! Errores de los plugins de aceleración.

use accel_core::{CoreError, DatasetError, HookError};
use thiserror::Error;

use crate::deferred::RunPhase;

#[derive(Debug, Error)]
pub enum AcceleratorError {
    /// No se pudo crear el handle volátil; la corrida aborta antes de
    /// ejecutar cualquier nodo.
    #[error("cannot substitute volatile dataset {name}: {source}")]
    Substitution { name: String, source: DatasetError },
    /// Primer guardado diferido fallido, en orden de finalización.
    #[error("deferred save of {name} failed: {source}")]
    DeferredSave { name: String, source: DatasetError },
    #[error("deferred saves used before pipeline start")]
    NotStarted,
    #[error("deferred saves not active (phase {0:?})")]
    NotActive(RunPhase),
    #[error("dataset {name} has no shadow entry under physical name {physical}")]
    UnknownPhysicalName { name: String, physical: String },
    #[error("save pool: {0}")]
    Pool(String),
    #[error(transparent)]
    Catalog(#[from] CoreError),
}

impl From<AcceleratorError> for HookError {
    fn from(err: AcceleratorError) -> Self {
        HookError::plugin(err)
    }
}
