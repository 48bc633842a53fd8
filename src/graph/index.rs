//! Reverse adjacency index.
//!
//! Maps each normalized dependency path to the graph keys that import it.
//! Built once per graph, it turns the "who imports this module?" question
//! into a single map lookup instead of a scan over every edge.

use std::collections::{BTreeMap, BTreeSet};

use super::DependencyGraph;
use crate::policy::ProjectPolicy;

/// Normalized dependency → raw identifiers of its dependents.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    dependents: BTreeMap<String, Vec<String>>,
    edge_count: usize,
}

impl ReverseIndex {
    /// Index `graph`, normalizing dependency paths against the project directory.
    ///
    /// Dependents are listed in graph key order, each at most once per
    /// dependency even if a module lists the same import twice.
    pub fn build(graph: &DependencyGraph, policy: &ProjectPolicy) -> Self {
        let mut dependents: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut edge_count = 0;

        for (module, deps) in graph.iter() {
            let mut seen: BTreeSet<String> = BTreeSet::new();
            for dep in deps {
                let normalized = policy.normalize_module(dep);
                if seen.insert(normalized.clone()) {
                    dependents
                        .entry(normalized)
                        .or_default()
                        .push(module.to_string());
                    edge_count += 1;
                }
            }
        }

        Self { dependents, edge_count }
    }

    /// Raw identifiers of the modules importing `normalized_path`.
    pub fn dependents_of(&self, normalized_path: &str) -> &[String] {
        self.dependents
            .get(normalized_path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct indexed edges.
    pub fn num_edges(&self) -> usize {
        self.edge_count
    }
}
