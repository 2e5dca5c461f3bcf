//! JSON canónico + blake3.
//!
//! La forma canónica ordena las claves de cada objeto y no emite espacios, así
//! dos `Value` iguales producen siempre los mismos bytes. Se usa para los
//! fingerprints de `Data`, del pipeline y de la corrida.

use std::fmt::Write;

use blake3::Hasher;
use serde_json::Value;

pub fn to_canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Display de Value::String escapa el literal
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(out, &map[key]);
            }
            out.push('}');
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
}

/// Hex blake3 de la forma canónica de `value`.
pub fn hash_value(value: &Value) -> String {
    let mut h = Hasher::new();
    h.update(to_canonical_json(value).as_bytes());
    h.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted_at_every_level() {
        let v = json!({"b": 1, "a": {"d": [1, 2], "c": null}});
        assert_eq!(to_canonical_json(&v), r#"{"a":{"c":null,"d":[1,2]},"b":1}"#);
    }

    #[test]
    fn strings_are_escaped() {
        let v = json!({"k\"ey": "va\nlue"});
        assert_eq!(to_canonical_json(&v), r#"{"k\"ey":"va\nlue"}"#);
    }

    #[test]
    fn hash_ignores_key_order() {
        assert_eq!(hash_value(&json!({"x": 1, "y": [true]})), hash_value(&json!({"y": [true], "x": 1})));
        assert_ne!(hash_value(&json!({"x": 1})), hash_value(&json!({"x": 2})));
        assert_eq!(hash_value(&json!(null)).len(), 64);
    }
}
