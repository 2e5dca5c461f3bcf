//! Errores del core: datasets, catálogo, pipeline, runner y hooks.

use thiserror::Error;

/// Error producido por una implementación de `Dataset`.
///
/// Es `Clone + PartialEq` para que el error de un guardado diferido pueda
/// reportarse tal cual al llamador (y compararse en tests).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DatasetError {
    #[error("data for {0} has not been saved yet")]
    Empty(String),
    #[error("io: {0}")]
    Io(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("lock poisoned: {0}")]
    Poisoned(String),
    #[error("{0}")]
    Failed(String),
}

/// Error devuelto por un hook. Los plugins encapsulan su propio tipo de error
/// en `Plugin`; el llamador puede recuperarlo con `downcast_ref`.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Plugin(Box<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    pub fn plugin<E>(err: E) -> Self
        where E: std::error::Error + Send + Sync + 'static
    {
        Self::Plugin(Box::new(err))
    }

    /// Recupera el error concreto de un plugin, si es del tipo `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
        where E: std::error::Error + 'static
    {
        match self {
            Self::Plugin(inner) => inner.downcast_ref::<E>(),
            Self::Message(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),
    #[error("dataset already exists: {0}")]
    DatasetAlreadyExists(String),
    #[error("dataset {name}: {source}")]
    Dataset { name: String, source: DatasetError },
    #[error("missing pipeline inputs: {0:?}")]
    MissingInputs(Vec<String>),
    #[error("node {node} failed: {message}")]
    NodeFailed { node: String, message: String },
    #[error("node {node} returned {found} outputs, expected {expected}")]
    OutputArity { node: String, expected: usize, found: usize },
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),
    #[error("hook {hook} failed: {source}")]
    Hook { hook: String, source: HookError },
    /// El run ya había fallado y además falló el teardown de un hook. Se
    /// conservan ambos errores.
    #[error("hook {hook} failed during teardown: {source} (run error: {original})")]
    Teardown { hook: String, source: HookError, original: Box<CoreError> },
    #[error("internal: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn dataset(name: &str, source: DatasetError) -> Self {
        Self::Dataset { name: name.to_string(), source }
    }

    /// Error de hook encapsulado, ya sea el de un run exitoso (`Hook`) o el
    /// del teardown de un run fallido (`Teardown`).
    pub fn hook_error(&self) -> Option<&HookError> {
        match self {
            Self::Hook { source, .. } | Self::Teardown { source, .. } => Some(source),
            _ => None,
        }
    }
}
