//! Module policies: which modules are ignored, which are pages, and what
//! route a page maps to.
//!
//! [`ProjectPolicy`] is the compiled form of a [`NextAffectedConfig`] for one
//! project directory: page roots and excluded prefixes are resolved and
//! normalized once, then every lookup is a plain string comparison.

pub mod exclusion;
pub mod pages;

pub use exclusion::should_exclude;
pub use pages::{is_page, route_from_page, strip_source_extension};

use crate::config::NextAffectedConfig;
use crate::path::{normalize_path, resolve_in};

/// Normalized view of a config for a single project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPolicy {
    project_dir: String,
    /// Normalized absolute page roots, in configuration order.
    pages_roots: Vec<String>,
    excluded_extensions: Vec<String>,
    /// Normalized absolute excluded path prefixes.
    excluded_prefixes: Vec<String>,
}

impl ProjectPolicy {
    /// Compile `config` against `project_dir`.
    pub fn new(project_dir: impl AsRef<std::path::Path>, config: &NextAffectedConfig) -> Self {
        let project_dir = normalize_path(project_dir);
        let pages_roots = config
            .pages_directories
            .iter()
            .map(|dir| resolve_in(&project_dir, dir))
            .collect();
        let excluded_prefixes = config
            .excluded_paths
            .iter()
            .map(|p| resolve_in(&project_dir, p))
            .collect();

        Self {
            project_dir,
            pages_roots,
            excluded_extensions: config.excluded_extensions.clone(),
            excluded_prefixes,
        }
    }

    /// Normalized project directory.
    pub fn project_dir(&self) -> &str {
        &self.project_dir
    }

    /// Normalized page roots, in priority order.
    pub fn pages_roots(&self) -> &[String] {
        &self.pages_roots
    }

    /// Resolve a raw graph identifier against the project directory.
    pub fn normalize_module(&self, module: &str) -> String {
        resolve_in(&self.project_dir, module)
    }
}
