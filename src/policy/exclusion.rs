//! Exclusion policy.
//!
//! A module is excluded when its normalized path ends with one of the
//! configured extensions, or starts with one of the configured excluded
//! paths. Excluded modules are never pages and never pass impact through to
//! their dependents.

use std::path::Path;

use super::ProjectPolicy;
use crate::config::NextAffectedConfig;
use crate::path::normalize_path;

impl ProjectPolicy {
    /// Whether a normalized module path is excluded.
    ///
    /// Extensions are checked first (exact, case-sensitive suffix), then
    /// excluded path prefixes.
    pub fn should_exclude(&self, module_path: &str) -> bool {
        self.excluded_extensions
            .iter()
            .any(|ext| module_path.ends_with(ext.as_str()))
            || self
                .excluded_prefixes
                .iter()
                .any(|prefix| module_path.starts_with(prefix.as_str()))
    }
}

/// Whether `module_path` is excluded under `config` for `project_dir`.
///
/// Convenience wrapper that compiles a [`ProjectPolicy`] per call. Prefer the
/// method when checking many modules.
pub fn should_exclude(
    module_path: &str,
    config: &NextAffectedConfig,
    project_dir: impl AsRef<Path>,
) -> bool {
    ProjectPolicy::new(project_dir, config).should_exclude(&normalize_path(module_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NextAffectedConfig {
        NextAffectedConfig::new(
            vec!["pages".into()],
            vec![".css".into(), ".scss".into()],
            vec!["src/legacy".into(), "components/Old.tsx".into()],
        )
    }

    #[test]
    fn test_excluded_extension() {
        assert!(should_exclude("/project/styles/main.css", &config(), "/project"));
        assert!(should_exclude("/project/pages/a.module.scss", &config(), "/project"));
        assert!(!should_exclude("/project/pages/a.tsx", &config(), "/project"));
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert!(!should_exclude("/project/styles/main.CSS", &config(), "/project"));
    }

    #[test]
    fn test_excluded_path_prefix() {
        assert!(should_exclude("/project/src/legacy/util.ts", &config(), "/project"));
        assert!(should_exclude("/project/components/Old.tsx", &config(), "/project"));
        assert!(!should_exclude("/project/src/modern/util.ts", &config(), "/project"));
    }

    #[test]
    fn test_excluded_paths_resolve_against_project_dir() {
        assert!(!should_exclude("/elsewhere/src/legacy/util.ts", &config(), "/project"));
    }
}
