use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::json;

use super::Node;
use crate::constants::{ENGINE_VERSION, TRANSCODING_SEPARATOR};
use crate::errors::CoreError;
use crate::hashing::hash_value;

/// Nombre base de un identificador transcodificado (`"cars@spark"` → `"cars"`).
pub fn strip_transcoding(name: &str) -> &str {
    name.split(TRANSCODING_SEPARATOR).next().unwrap_or(name)
}

pub fn is_transcoded(name: &str) -> bool {
    name.contains(TRANSCODING_SEPARATOR)
}

/// Conjunto validado de nodos en orden topológico.
#[derive(Debug, Clone)]
pub struct Pipeline {
    nodes: Vec<Node>,
}

impl Pipeline {
    /// Valida nombres únicos, un único productor por dataset (comparando
    /// nombres base) y ausencia de ciclos. El orden resultante es topológico
    /// y, entre nodos independientes, respeta el orden de declaración.
    pub fn new(nodes: Vec<Node>) -> Result<Self, CoreError> {
        let mut names = HashSet::new();
        for n in &nodes {
            if !names.insert(n.name()) {
                return Err(CoreError::InvalidPipeline(format!("duplicate node name {}", n.name())));
            }
        }

        let mut producer: HashMap<&str, usize> = HashMap::new();
        for (idx, n) in nodes.iter().enumerate() {
            for out in n.outputs() {
                if let Some(prev) = producer.insert(strip_transcoding(out), idx) {
                    return Err(CoreError::InvalidPipeline(format!("dataset {} produced by {} and {}",
                                                                  out,
                                                                  nodes[prev].name(),
                                                                  n.name())));
                }
            }
        }

        // Kahn con cola ordenada por índice de declaración
        let mut indegree = vec![0usize; nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (idx, n) in nodes.iter().enumerate() {
            let mut deps = BTreeSet::new();
            for inp in n.inputs() {
                if let Some(&p) = producer.get(strip_transcoding(inp)) {
                    deps.insert(p);
                }
            }
            for p in deps {
                if p == idx {
                    return Err(CoreError::InvalidPipeline(format!("node {} consumes its own output", n.name())));
                }
                dependents[p].push(idx);
                indegree[idx] += 1;
            }
        }
        let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(nodes.len());
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &d in &dependents[i] {
                indegree[d] -= 1;
                if indegree[d] == 0 {
                    ready.insert(d);
                }
            }
        }
        if order.len() != nodes.len() {
            let stuck: Vec<&str> = (0..nodes.len()).filter(|i| !order.contains(i)).map(|i| nodes[i].name()).collect();
            return Err(CoreError::InvalidPipeline(format!("cycle between nodes {stuck:?}")));
        }

        let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
        let nodes = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn all_inputs(&self) -> BTreeSet<String> {
        self.nodes.iter().flat_map(|n| n.inputs().iter().cloned()).collect()
    }

    pub fn all_outputs(&self) -> BTreeSet<String> {
        self.nodes.iter().flat_map(|n| n.outputs().iter().cloned()).collect()
    }

    /// Entradas libres: consumidas pero no producidas por ningún nodo.
    pub fn inputs(&self) -> BTreeSet<String> {
        self.remove_intermediates(self.all_inputs())
    }

    /// Salidas libres: producidas pero no consumidas por ningún nodo.
    pub fn outputs(&self) -> BTreeSet<String> {
        self.remove_intermediates(self.all_outputs())
    }

    pub fn datasets(&self) -> BTreeSet<String> {
        let mut all = self.all_inputs();
        all.extend(self.all_outputs());
        all
    }

    /// Hash estable de la forma del pipeline (nombres y conexiones).
    pub fn definition_hash(&self) -> String {
        let nodes: Vec<_> = self.nodes
                                .iter()
                                .map(|n| json!({"name": n.name(), "inputs": n.inputs(), "outputs": n.outputs()}))
                                .collect();
        hash_value(&json!({"engine_version": ENGINE_VERSION, "nodes": nodes}))
    }

    fn remove_intermediates(&self, datasets: BTreeSet<String>) -> BTreeSet<String> {
        let consumed: HashSet<&str> = self.nodes.iter().flat_map(|n| n.inputs()).map(|s| strip_transcoding(s)).collect();
        let produced: HashSet<&str> = self.nodes.iter().flat_map(|n| n.outputs()).map(|s| strip_transcoding(s)).collect();
        datasets.into_iter()
                .filter(|d| {
                    let base = strip_transcoding(d);
                    !(consumed.contains(base) && produced.contains(base))
                })
                .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Data;

    fn n(name: &str, inputs: &[&str], outputs: &[&str]) -> Node {
        let arity = outputs.len();
        Node::new(name,
                  inputs.iter().copied(),
                  outputs.iter().copied(),
                  move |_: &[Data]| Ok(vec![Data::new(serde_json::Value::Null); arity]))
    }

    fn names(p: &Pipeline) -> Vec<&str> {
        p.nodes().iter().map(|n| n.name()).collect()
    }

    #[test]
    fn topological_order_is_stable() {
        let p = Pipeline::new(vec![n("g", &["B"], &["C"]), n("f", &["A"], &["B"]), n("h", &["A"], &["D"])]).unwrap();
        assert_eq!(names(&p), vec!["f", "g", "h"]);
    }

    #[test]
    fn boundary_sets() {
        let p = Pipeline::new(vec![n("f", &["A"], &["B"]), n("g", &["B"], &["C"])]).unwrap();
        assert_eq!(p.inputs(), BTreeSet::from(["A".to_string()]));
        assert_eq!(p.outputs(), BTreeSet::from(["C".to_string()]));
        assert_eq!(p.datasets().len(), 3);
    }

    #[test]
    fn transcoded_names_compare_on_base() {
        let p = Pipeline::new(vec![n("f", &["A"], &["cars@spark"]), n("g", &["cars@pandas"], &["C"])]).unwrap();
        assert!(!p.inputs().contains("cars@pandas"));
        assert!(!p.outputs().contains("cars@spark"));
        assert_eq!(names(&p), vec!["f", "g"]);
    }

    #[test]
    fn rejects_duplicates_and_cycles() {
        assert!(Pipeline::new(vec![n("f", &[], &["A"]), n("f", &[], &["B"])]).is_err());
        assert!(Pipeline::new(vec![n("f", &[], &["A"]), n("g", &[], &["A@x"])]).is_err());
        let err = Pipeline::new(vec![n("f", &["B"], &["A"]), n("g", &["A"], &["B"])]).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn definition_hash_changes_with_wiring() {
        let a = Pipeline::new(vec![n("f", &["A"], &["B"])]).unwrap();
        let b = Pipeline::new(vec![n("f", &["A"], &["C"])]).unwrap();
        assert_ne!(a.definition_hash(), b.definition_hash());
        assert_eq!(a.definition_hash(), Pipeline::new(vec![n("f", &["A"], &["B"])]).unwrap().definition_hash());
    }

    #[test]
    fn transcoding_helpers() {
        assert_eq!(strip_transcoding("cars@spark"), "cars");
        assert_eq!(strip_transcoding("cars"), "cars");
        assert!(is_transcoded("a@b"));
        assert!(!is_transcoded("a"));
    }
}
