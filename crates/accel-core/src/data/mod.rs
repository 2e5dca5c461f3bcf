//! Valor neutral que fluye entre nodos.
//!
//! `Data` es un documento JSON inmutable y compartido (`Arc<Value>`):
//! - la igualdad es por valor; la identidad se observa con `Data::ptr_eq`.
//! - clonar un `Data` nunca copia el documento (sólo incrementa el conteo).
//! - `fingerprint` es el hash blake3 del JSON canónico; el runner lo usa en
//!   los fingerprints de nodos.
//!
//! La política de copia al leer/escribir un dataset en memoria vive en
//! [`copy`].

pub mod copy;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::hashing::hash_value;

pub use copy::{CopyMode, ParseCopyModeError};

#[derive(Clone)]
pub struct Data(Arc<Value>);

impl Data {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Devuelve el documento; sólo copia si hay otras referencias vivas.
    pub fn into_value(self) -> Value {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }

    /// `true` si ambos apuntan al mismo documento (misma asignación).
    pub fn ptr_eq(a: &Data, b: &Data) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn fingerprint(&self) -> String {
        hash_value(&self.0)
    }

    /// Escalares: null, bool, número o string.
    pub fn is_scalar(&self) -> bool {
        !matches!(*self.0, Value::Array(_) | Value::Object(_))
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        Data::ptr_eq(self, other) || self.0 == other.0
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data({})", self.0)
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Data {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Data::new)
    }
}
