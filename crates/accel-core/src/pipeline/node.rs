use std::fmt;
use std::sync::Arc;

use crate::data::Data;
use crate::errors::CoreError;

pub type NodeFnError = Box<dyn std::error::Error + Send + Sync>;
pub type NodeFn = Arc<dyn Fn(&[Data]) -> Result<Vec<Data>, NodeFnError> + Send + Sync>;

/// Unidad de cómputo: consume `inputs` (en orden) y produce exactamente
/// `outputs.len()` valores (en orden).
#[derive(Clone)]
pub struct Node {
    name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    func: NodeFn,
}

impl Node {
    pub fn new<I, O, S, T, F>(name: &str, inputs: I, outputs: O, func: F) -> Self
        where I: IntoIterator<Item = S>,
              O: IntoIterator<Item = T>,
              S: Into<String>,
              T: Into<String>,
              F: Fn(&[Data]) -> Result<Vec<Data>, NodeFnError> + Send + Sync + 'static
    {
        Self { name: name.to_string(),
               inputs: inputs.into_iter().map(Into::into).collect(),
               outputs: outputs.into_iter().map(Into::into).collect(),
               func: Arc::new(func) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Ejecuta la función y valida la aridad de la salida.
    pub fn run(&self, inputs: &[Data]) -> Result<Vec<Data>, CoreError> {
        let produced = (self.func)(inputs).map_err(|e| CoreError::NodeFailed { node: self.name.clone(),
                                                                                   message: e.to_string() })?;
        if produced.len() != self.outputs.len() {
            return Err(CoreError::OutputArity { node: self.name.clone(),
                                                expected: self.outputs.len(),
                                                found: produced.len() });
        }
        Ok(produced)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
         .field("name", &self.name)
         .field("inputs", &self.inputs)
         .field("outputs", &self.outputs)
         .finish_non_exhaustive()
    }
}
