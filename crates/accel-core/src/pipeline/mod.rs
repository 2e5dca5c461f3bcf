//! Nodos y pipelines.

mod node;
#[allow(clippy::module_inception)]
mod pipeline;

pub use node::{Node, NodeFn, NodeFnError};
pub use pipeline::{is_transcoded, strip_transcoding, Pipeline};
