//! In-memory graph source for tests and embedding.

use std::path::Path;

use async_trait::async_trait;

use super::{DependencyGraph, GraphError, GraphSource};
use crate::config::NextAffectedConfig;

/// Graph source that hands out a prebuilt graph.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphSource {
    graph: DependencyGraph,
}

impl InMemoryGraphSource {
    /// Wrap an existing graph.
    pub fn new(graph: DependencyGraph) -> Self {
        Self { graph }
    }

    /// Add a module and its direct dependencies.
    pub fn add_module(&mut self, module: impl Into<String>, dependencies: Vec<String>) {
        self.graph.insert(module, dependencies);
    }

    /// The wrapped graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

#[async_trait]
impl GraphSource for InMemoryGraphSource {
    async fn build_graph(
        &self,
        _project_dir: &Path,
        _config: &NextAffectedConfig,
    ) -> Result<DependencyGraph, GraphError> {
        Ok(self.graph.clone())
    }
}
