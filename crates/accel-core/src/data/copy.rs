//! Políticas de copia para datasets en memoria.
//!
//! - `Assign`: se comparte el mismo documento (identidad preservada).
//! - `Copy` y `DeepCopy`: se clona el documento (igual en valor, asignación
//!   nueva). Un `Value` es dueño de todo su árbol, así que el clon ya es
//!   profundo y ambas políticas producen lo mismo; se conservan separadas
//!   porque son los nombres aceptados en la configuración y en `describe`.
//!
//! Sin política explícita se infiere por valor con [`CopyMode::infer`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::Data;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    Assign,
    Copy,
    DeepCopy,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid copy mode {0:?}: expected assign, copy or deepcopy")]
pub struct ParseCopyModeError(pub String);

impl CopyMode {
    /// Escalares → `Assign`; tablas de registros (arrays de objetos) →
    /// `Copy`; cualquier otro documento → `DeepCopy`.
    pub fn infer(data: &Data) -> Self {
        match data.value() {
            Value::Array(rows) if !rows.is_empty() && rows.iter().all(Value::is_object) => CopyMode::Copy,
            Value::Array(_) | Value::Object(_) => CopyMode::DeepCopy,
            _ => CopyMode::Assign,
        }
    }

    pub fn apply(self, data: &Data) -> Data {
        match self {
            CopyMode::Assign => data.clone(),
            CopyMode::Copy | CopyMode::DeepCopy => Data::new(data.value().clone()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CopyMode::Assign => "assign",
            CopyMode::Copy => "copy",
            CopyMode::DeepCopy => "deepcopy",
        }
    }
}

impl fmt::Display for CopyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopyMode {
    type Err = ParseCopyModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assign" => Ok(CopyMode::Assign),
            "copy" => Ok(CopyMode::Copy),
            "deepcopy" | "deep_copy" | "deep-copy" => Ok(CopyMode::DeepCopy),
            other => Err(ParseCopyModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn infer_by_shape() {
        assert_eq!(CopyMode::infer(&Data::new(json!(3))), CopyMode::Assign);
        assert_eq!(CopyMode::infer(&Data::new(json!("s"))), CopyMode::Assign);
        assert_eq!(CopyMode::infer(&Data::new(json!([{"a": 1}, {"a": 2}]))), CopyMode::Copy);
        assert_eq!(CopyMode::infer(&Data::new(json!([1, 2]))), CopyMode::DeepCopy);
        assert_eq!(CopyMode::infer(&Data::new(json!([]))), CopyMode::DeepCopy);
        assert_eq!(CopyMode::infer(&Data::new(json!({"a": [1]}))), CopyMode::DeepCopy);
    }

    #[test]
    fn assign_shares_copy_and_deepcopy_do_not() {
        let d = Data::new(json!({"rows": [1, 2, 3]}));
        assert!(Data::ptr_eq(&CopyMode::Assign.apply(&d), &d));
        for mode in [CopyMode::Copy, CopyMode::DeepCopy] {
            let c = mode.apply(&d);
            assert_eq!(c, d);
            assert!(!Data::ptr_eq(&c, &d), "{mode} must not share the document");
        }
    }

    #[test]
    fn copy_and_deepcopy_yield_the_same_document() {
        let d = Data::new(json!({"b": [0.1, 18446744073709551615u64, {"z": null, "a": "ñ"}], "a": -1.5e300}));
        let copy = CopyMode::Copy.apply(&d);
        let deep = CopyMode::DeepCopy.apply(&d);
        assert_eq!(copy.value(), deep.value());
        assert_eq!(copy.fingerprint(), d.fingerprint());
        assert!(!Data::ptr_eq(&copy, &deep));
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("DeepCopy".parse::<CopyMode>(), Ok(CopyMode::DeepCopy));
        assert_eq!("deep_copy".parse::<CopyMode>(), Ok(CopyMode::DeepCopy));
        assert_eq!(" assign ".parse::<CopyMode>(), Ok(CopyMode::Assign));
        assert!("shallow".parse::<CopyMode>().is_err());
    }
}
