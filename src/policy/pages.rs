//! Page classification and route derivation.
//!
//! A page is any module under a configured pages root. Its route is the path
//! below the first matching root with the source extension removed:
//!
//! ```text
//! /project/src/pages/blog/post.tsx  (root: src/pages)  →  /blog/post
//! /project/pages/index.tsx          (root: pages)      →  /index
//! /project/pages.tsx                (root: pages)      →  .tsx stripped, "" → /
//! ```
//!
//! Index files are not folded into their parent route.

use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;

use super::ProjectPolicy;
use crate::config::NextAffectedConfig;
use crate::path::normalize_path;

fn source_extension() -> &'static Regex {
    static SOURCE_EXTENSION: OnceLock<Regex> = OnceLock::new();
    SOURCE_EXTENSION.get_or_init(|| {
        Regex::new(r"\.(js|jsx|ts|tsx)$").expect("source extension pattern is valid")
    })
}

/// Remove a trailing `.js`, `.jsx`, `.ts` or `.tsx`.
pub fn strip_source_extension(path: &str) -> &str {
    match source_extension().find(path) {
        Some(m) => &path[..m.start()],
        None => path,
    }
}

impl ProjectPolicy {
    /// Whether a normalized module path lies under any pages root.
    pub fn is_page(&self, module_path: &str) -> bool {
        self.pages_roots
            .iter()
            .any(|root| module_path.starts_with(root.as_str()))
    }

    /// Route for a normalized page path.
    ///
    /// The first root (in configuration order) that prefixes the path is
    /// stripped. A path under no root keeps its full normalized form.
    pub fn route_from_page(&self, page_path: &str) -> String {
        let remainder = self
            .pages_roots
            .iter()
            .find_map(|root| page_path.strip_prefix(root.as_str()))
            .unwrap_or(page_path);

        match strip_source_extension(remainder) {
            "" => "/".to_string(),
            route => route.to_string(),
        }
    }

    /// Route for a normalized module path, if it is a page.
    pub fn page_route(&self, module_path: &str) -> Option<String> {
        self.is_page(module_path)
            .then(|| self.route_from_page(module_path))
    }
}

/// Whether `module_path` is a page under `config` for `project_dir`.
pub fn is_page(module_path: &str, project_dir: impl AsRef<Path>, config: &NextAffectedConfig) -> bool {
    ProjectPolicy::new(project_dir, config).is_page(&normalize_path(module_path))
}

/// Route of `page_path` under `config` for `project_dir`.
pub fn route_from_page(
    page_path: &str,
    project_dir: impl AsRef<Path>,
    config: &NextAffectedConfig,
) -> String {
    ProjectPolicy::new(project_dir, config).route_from_page(&normalize_path(page_path))
}
