//! Configuración de los plugins desde variables de entorno.
//!
//! Variables reconocidas (todas opcionales):
//! - `ACCEL_MAX_WORKERS`: hilos del pool de guardados diferidos.
//! - `ACCEL_HOST_VERSION`: versión del host; selecciona la `NamingRule`.
//! - `ACCEL_COPY_MODE`: `assign`, `copy` o `deepcopy` para datasets volátiles.
//! - `ACCEL_CACHE`: `1`/`true` habilita el hook de caché.
//!
//! Valores inválidos se registran con `warn!` y se usa el default.

use std::env;
use std::thread;

use accel_core::{CopyMode, NamingRule};
use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const ENV_MAX_WORKERS: &str = "ACCEL_MAX_WORKERS";
pub const ENV_HOST_VERSION: &str = "ACCEL_HOST_VERSION";
pub const ENV_COPY_MODE: &str = "ACCEL_COPY_MODE";
pub const ENV_CACHE: &str = "ACCEL_CACHE";

/// Con menos de dos hilos los guardados duraderos no pueden solaparse.
pub const MIN_WORKERS: usize = 2;
const MAX_DEFAULT_WORKERS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceleratorConfig {
    pub max_workers: usize,
    pub naming: NamingRule,
    /// `None`: la política se infiere por valor.
    pub copy_mode: Option<CopyMode>,
    pub cache_enabled: bool,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self { max_workers: default_workers(),
               naming: NamingRule::LATEST,
               copy_mode: None,
               cache_enabled: false }
    }
}

/// `min(32, cpus + 4)`, nunca menos de `MIN_WORKERS`.
pub fn default_workers() -> usize {
    let cpus = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    (cpus + 4).min(MAX_DEFAULT_WORKERS).max(MIN_WORKERS)
}

impl AcceleratorConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_MAX_WORKERS) {
            match raw.trim().parse::<usize>() {
                Ok(n) => cfg = cfg.with_max_workers(n),
                Err(e) => warn!("config:invalid key={} value={:?} error={}", ENV_MAX_WORKERS, raw, e),
            }
        }
        if let Some(raw) = lookup(ENV_HOST_VERSION) {
            cfg.naming = NamingRule::for_version(&raw);
        }
        if let Some(raw) = lookup(ENV_COPY_MODE) {
            match raw.parse::<CopyMode>() {
                Ok(mode) => cfg.copy_mode = Some(mode),
                Err(e) => warn!("config:invalid key={} error={}", ENV_COPY_MODE, e),
            }
        }
        if let Some(raw) = lookup(ENV_CACHE) {
            match parse_flag(&raw) {
                Some(flag) => cfg.cache_enabled = flag,
                None => warn!("config:invalid key={} value={:?}", ENV_CACHE, raw),
            }
        }
        cfg
    }

    pub fn with_max_workers(mut self, n: usize) -> Self {
        if n < MIN_WORKERS {
            warn!("config:max_workers_clamped requested={} min={}", n, MIN_WORKERS);
        }
        self.max_workers = n.max(MIN_WORKERS);
        self
    }

    pub fn with_naming(mut self, naming: NamingRule) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_copy_mode(mut self, copy_mode: Option<CopyMode>) -> Self {
        self.copy_mode = copy_mode;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
