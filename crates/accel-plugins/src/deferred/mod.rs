//! Persistencia diferida de intermedios ("tee").
//!
//! - `pool`: pool rayon acotado con tickets y resultados en orden de
//!   finalización.
//! - `coordinator`: máquina de estados por corrida (`DeferredSaves`).
//! - `hook`: `TeeHook`, el adaptador a `PipelineHook`.

mod coordinator;
mod hook;
mod pool;

pub use coordinator::{DeferredSaves, RunPhase};
pub use hook::TeeHook;
pub use pool::{DrainReport, SavePool};
