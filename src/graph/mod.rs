//! Dependency graphs and the sources they come from.
//!
//! The crate never parses imports itself. A [`GraphSource`] hands over a
//! finished [`DependencyGraph`] (module → modules it imports), which is then
//! filtered through the exclusion policy and indexed in reverse for
//! traversal.

pub mod index;
pub mod json;
pub mod memory;

#[cfg(feature = "madge")]
pub mod madge;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::NextAffectedConfig;
use crate::policy::ProjectPolicy;

pub use index::ReverseIndex;
pub use json::JsonGraphSource;
pub use memory::InMemoryGraphSource;

#[cfg(feature = "madge")]
pub use madge::{find_ts_config, MadgeGraphSource};

/// Error type for graph construction.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// None of the configured pages directories exist.
    #[error("No valid entry points found in {}", .0.display())]
    NoEntryPoints(PathBuf),
    /// No tsconfig was found walking up from the project directory.
    #[error("Could not find tsconfig.json or tsconfig.base.json above {}", .0.display())]
    TsConfigNotFound(PathBuf),
    /// Reading a graph file failed.
    #[error("Graph I/O error at {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Graph JSON did not have the `{ "module": ["dep", ...] }` shape.
    #[error("Invalid dependency graph from {origin}: {source}")]
    Parse {
        /// Where the JSON came from (file path or builder name).
        origin: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The external graph builder failed.
    #[error("Graph builder error: {0}")]
    Builder(String),
}

impl GraphError {
    /// Create a builder error from any error type.
    pub fn from_builder<E: std::error::Error>(e: E) -> Self {
        Self::Builder(e.to_string())
    }
}

/// Static import graph: module → modules it directly imports.
///
/// Identifiers are path strings, relative to the project directory or
/// absolute. Keys iterate in sorted order so traversal is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph(BTreeMap<String, Vec<String>>);

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direct dependencies of `module`, replacing any previous entry.
    pub fn insert(&mut self, module: impl Into<String>, dependencies: Vec<String>) {
        self.0.insert(module.into(), dependencies);
    }

    /// Direct dependencies of `module`, if it is a key.
    pub fn dependencies(&self, module: &str) -> Option<&[String]> {
        self.0.get(module).map(Vec::as_slice)
    }

    /// Whether `module` is a key.
    pub fn contains(&self, module: &str) -> bool {
        self.0.contains_key(module)
    }

    /// Number of modules (keys).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the graph has no modules.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Module identifiers in sorted order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(module, dependencies)` pairs in sorted module order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Parse a graph from `{ "module": ["dep", ...] }` JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<BTreeMap<String, Vec<String>>> for DependencyGraph {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

impl<K, D> FromIterator<(K, Vec<D>)> for DependencyGraph
where
    K: Into<String>,
    D: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<D>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, deps)| (k.into(), deps.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

/// Trait for dependency graph builders.
///
/// Implementations return the raw graph; exclusion filtering is applied by
/// the caller with [`filter_graph`].
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Build the dependency graph for a project.
    async fn build_graph(
        &self,
        project_dir: &Path,
        config: &NextAffectedConfig,
    ) -> Result<DependencyGraph, GraphError>;
}

/// Drop excluded modules from the graph keys and from every dependency list.
///
/// This only trims the graph. Traversal re-checks exclusion on every module
/// it reaches, since an excluded module filtered from the keys may still be
/// reached through an edge of an unfiltered graph.
pub fn filter_graph(graph: &DependencyGraph, policy: &ProjectPolicy) -> DependencyGraph {
    graph
        .iter()
        .filter(|(module, _)| !policy.should_exclude(&policy.normalize_module(module)))
        .map(|(module, deps)| {
            let kept: Vec<String> = deps
                .iter()
                .filter(|dep| !policy.should_exclude(&policy.normalize_module(dep)))
                .cloned()
                .collect();
            (module.to_string(), kept)
        })
        .collect()
}
