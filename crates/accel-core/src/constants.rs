//! Constantes del runner.
//!
//! `ENGINE_VERSION` participa en los fingerprints de nodos y de la corrida:
//! cambiarla invalida deterministamente los fingerprints registrados aunque
//! la definición del pipeline y los datos no cambien.

/// Versión lógica del runner.
pub const ENGINE_VERSION: &str = "A1.0";

/// Separador de transcodificación: `"cars@spark"` y `"cars@pandas"` son dos
/// vistas del mismo artefacto físico `"cars"`.
pub const TRANSCODING_SEPARATOR: char = '@';
