//! Normalización de identificadores lógicos a nombres físicos.
//!
//! Las versiones del host cambiaron la regla con la que el catálogo deriva
//! el nombre físico (atributo) de cada dataset. La regla se elige una sola
//! vez a partir de la versión y luego se aplica de forma pura.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("static regex"));
static NON_ALNUM_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9a-zA-Z_]+").expect("static regex"));

const REPLACEMENT: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NamingRule {
    /// Host < 0.16.2: el nombre físico es el lógico.
    Verbatim,
    /// 0.16.2 <= host < 0.16.6: tramos fuera de `[0-9a-zA-Z_]` → `"__"`.
    AlphanumericUnderscore,
    /// Host >= 0.16.6: tramos de caracteres no-palabra (Unicode) → `"__"`.
    #[default]
    NonWord,
}

impl NamingRule {
    pub const LATEST: NamingRule = NamingRule::NonWord;

    /// Selecciona la regla para una versión `major.minor.patch`.
    /// Partes ausentes cuentan como 0; sufijos (`rc1`, `-dev`) se ignoran.
    /// Una versión ilegible selecciona la regla más reciente.
    pub fn for_version(version: &str) -> Self {
        match parse_version(version) {
            Some(v) if v < (0, 16, 2) => NamingRule::Verbatim,
            Some(v) if v < (0, 16, 6) => NamingRule::AlphanumericUnderscore,
            _ => Self::LATEST,
        }
    }

    pub fn normalize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            NamingRule::Verbatim => Cow::Borrowed(name),
            NamingRule::AlphanumericUnderscore => NON_ALNUM_UNDERSCORE.replace_all(name, REPLACEMENT),
            NamingRule::NonWord => NON_WORD.replace_all(name, REPLACEMENT),
        }
    }
}

impl fmt::Display for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NamingRule::Verbatim => "verbatim",
            NamingRule::AlphanumericUnderscore => "alphanumeric_underscore",
            NamingRule::NonWord => "non_word",
        };
        f.write_str(s)
    }
}

fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
    let mut parts = version.trim().trim_start_matches('v').split('.');
    let major = leading_number(parts.next()?)?;
    let minor = parts.next().map(|p| leading_number(p).unwrap_or(0)).unwrap_or(0);
    let patch = parts.next().map(|p| leading_number(p).unwrap_or(0)).unwrap_or(0);
    Some((major, minor, patch))
}

fn leading_number(part: &str) -> Option<u64> {
    let end = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
    part[..end].parse().ok()
}
