//! Graph source backed by a JSON file.
//!
//! Reads the layout madge prints with `--json`:
//!
//! ```json
//! { "pages/index.tsx": ["components/Button.tsx"], "components/Button.tsx": [] }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{DependencyGraph, GraphError, GraphSource};
use crate::config::NextAffectedConfig;
use crate::path::resolve_in;

/// Graph source that loads a prebuilt graph from disk.
#[derive(Debug, Clone)]
pub struct JsonGraphSource {
    path: PathBuf,
}

impl JsonGraphSource {
    /// Read the graph from `path`. A relative path is taken relative to the
    /// project directory passed to [`GraphSource::build_graph`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the graph synchronously from an explicit location.
    pub fn load(path: &Path) -> Result<DependencyGraph, GraphError> {
        let content = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let graph = DependencyGraph::from_json_str(&content).map_err(|source| GraphError::Parse {
            origin: path.display().to_string(),
            source,
        })?;

        debug!(path = %path.display(), modules = graph.len(), "Loaded dependency graph file");
        Ok(graph)
    }
}

#[async_trait]
impl GraphSource for JsonGraphSource {
    async fn build_graph(
        &self,
        project_dir: &Path,
        _config: &NextAffectedConfig,
    ) -> Result<DependencyGraph, GraphError> {
        let path = PathBuf::from(resolve_in(project_dir, &self.path));
        Self::load(&path)
    }
}
