//! End-to-end analysis run: config, graph, change set, traversal.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{load_config, ConfigError};
use crate::git::{ChangeSetError, ChangeSetProvider, ChangeSetRequest};
use crate::graph::{filter_graph, GraphError, GraphSource};
use crate::orchestrator::{AffectedPagesAnalyzer, AffectedPagesReport, AnalysisProgress};
use crate::path::normalize_path;
use crate::policy::ProjectPolicy;

/// Error type for a full run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Neither a component nor a base reference was given.
    #[error("You must specify a component path or use --base to compare commits or branches.")]
    MissingTarget,
    /// Loading the config failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Building the dependency graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Detecting changed files failed.
    #[error(transparent)]
    ChangeSet(#[from] ChangeSetError),
}

/// What to analyze and how.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Project directory, relative to the working directory or absolute.
    pub project: PathBuf,
    /// Single component to analyze. Takes precedence over `base`.
    pub component: Option<String>,
    /// Base reference for change detection.
    pub base: Option<String>,
    /// Head reference for change detection.
    pub head: String,
    /// Maximum reverse hops; `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Add uncommitted changes to the change set.
    pub uncommitted: bool,
    /// Use only uncommitted changes.
    pub only_uncommitted: bool,
    /// Log per file and every 100 modules.
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            project: PathBuf::from("."),
            component: None,
            base: None,
            head: "HEAD".to_string(),
            max_depth: None,
            uncommitted: false,
            only_uncommitted: false,
            verbose: false,
        }
    }
}

impl RunOptions {
    /// Component to analyze; an empty path counts as none.
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref().filter(|c| !c.is_empty())
    }

    /// Base reference to diff against, if change detection applies.
    ///
    /// The uncommitted flags imply `HEAD` when no base is given.
    pub fn effective_base(&self) -> Option<&str> {
        match &self.base {
            Some(base) => Some(base.as_str()),
            None if self.uncommitted || self.only_uncommitted => Some("HEAD"),
            None => None,
        }
    }
}

/// Run a full analysis.
///
/// The target is checked before any graph is built, so a usage error costs
/// nothing. `on_progress` is forwarded to the analyzer.
pub async fn run_next_affected<G, C>(
    options: &RunOptions,
    graph_source: &G,
    change_set: &C,
    on_progress: impl FnMut(AnalysisProgress),
) -> Result<AffectedPagesReport, RunError>
where
    G: GraphSource + ?Sized,
    C: ChangeSetProvider + ?Sized,
{
    if options.component().is_none() && options.effective_base().is_none() {
        return Err(RunError::MissingTarget);
    }

    debug!("Starting next-affected analysis...");
    let project_dir = PathBuf::from(normalize_path(&options.project));
    let config = load_config(&project_dir)?;
    let policy = ProjectPolicy::new(&project_dir, &config);

    info!(project = %project_dir.display(), "Building dependency graph. This may take a while...");
    let raw_graph = graph_source.build_graph(&project_dir, &config).await?;
    let graph = filter_graph(&raw_graph, &policy);
    if options.verbose {
        info!(
            modules = graph.len(),
            filtered_out = raw_graph.len() - graph.len(),
            "Dependency graph built."
        );
    }

    let analyzer = AffectedPagesAnalyzer::new(&graph, &policy, options.max_depth)
        .with_verbose(options.verbose);

    if let Some(component) = options.component() {
        return Ok(analyzer.analyze_component(component, on_progress));
    }

    let base = options.effective_base().ok_or(RunError::MissingTarget)?;
    info!("Getting changed files between {base} and {}", options.head);

    let request = ChangeSetRequest::new(base, &project_dir)
        .with_head(options.head.clone())
        .with_uncommitted(options.uncommitted)
        .with_only_uncommitted(options.only_uncommitted);
    let changed_files = change_set.changed_files(&request)?;

    if changed_files.is_empty() {
        info!("No changes detected between the specified commits or branches.");
        return Ok(AffectedPagesReport::empty(analyzer.total_modules()));
    }

    info!(changed_files = changed_files.len(), "Found {} changed files.", changed_files.len());
    info!("Analyzing affected pages...");
    Ok(analyzer.analyze_changed_files(&changed_files, on_progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencyGraph, InMemoryGraphSource};
    use std::cell::RefCell;

    /// Change set returning fixed files and recording requests.
    struct FixedChangeSet {
        files: Vec<String>,
        requests: RefCell<Vec<ChangeSetRequest>>,
    }

    impl FixedChangeSet {
        fn new(files: &[&str]) -> Self {
            Self {
                files: files.iter().map(|f| f.to_string()).collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChangeSetProvider for FixedChangeSet {
        fn changed_files(&self, request: &ChangeSetRequest) -> Result<Vec<String>, ChangeSetError> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self.files.clone())
        }
    }

    fn source() -> InMemoryGraphSource {
        let graph: DependencyGraph = [
            ("pages/index.tsx", vec!["components/Button.tsx", "styles/home.css"]),
            ("components/Button.tsx", vec![]),
            ("styles/home.css", vec![]),
        ]
        .into_iter()
        .collect();
        InMemoryGraphSource::new(graph)
    }

    fn options(dir: &std::path::Path) -> RunOptions {
        RunOptions {
            project: dir.to_path_buf(),
            ..RunOptions::default()
        }
    }

    #[tokio::test]
    async fn test_missing_target_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let changes = FixedChangeSet::new(&[]);
        let err = run_next_affected(&options(dir.path()), &source(), &changes, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::MissingTarget));
    }

    #[tokio::test]
    async fn test_component_mode() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunOptions {
            component: Some(dir.path().join("components/Button.tsx").display().to_string()),
            ..options(dir.path())
        };
        let changes = FixedChangeSet::new(&[]);

        let report = run_next_affected(&run, &source(), &changes, |_| {}).await.unwrap();

        assert_eq!(report.routes.into_iter().collect::<Vec<_>>(), vec!["/index"]);
        assert_eq!(report.total_modules, 2);
        assert!(changes.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_change_set_mode() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunOptions {
            base: Some("main".to_string()),
            uncommitted: true,
            ..options(dir.path())
        };
        let changes = FixedChangeSet::new(&["components/Button.tsx", "styles/home.css"]);

        let report = run_next_affected(&run, &source(), &changes, |_| {}).await.unwrap();

        assert_eq!(report.routes.into_iter().collect::<Vec<_>>(), vec!["/index"]);
        assert_eq!(report.files_analyzed, 2);

        let requests = changes.requests.borrow();
        assert_eq!(requests[0].base, "main");
        assert_eq!(requests[0].head, "HEAD");
        assert!(requests[0].include_uncommitted);
    }

    #[tokio::test]
    async fn test_uncommitted_flag_implies_head_base() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunOptions {
            only_uncommitted: true,
            ..options(dir.path())
        };
        let changes = FixedChangeSet::new(&[]);

        let report = run_next_affected(&run, &source(), &changes, |_| {}).await.unwrap();

        assert!(!report.has_affected_pages());
        assert_eq!(changes.requests.borrow()[0].base, "HEAD");
    }

    #[tokio::test]
    async fn test_graph_errors_abort_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunOptions {
            base: Some("main".to_string()),
            ..options(dir.path())
        };
        let graph_source = crate::graph::JsonGraphSource::new("missing.json");

        let err = run_next_affected(&run, &graph_source, &FixedChangeSet::new(&[]), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Graph(GraphError::Io { .. })));
    }

    #[tokio::test]
    async fn test_empty_component_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunOptions {
            component: Some(String::new()),
            ..options(dir.path())
        };
        let changes = FixedChangeSet::new(&[]);

        let err = run_next_affected(&run, &source(), &changes, |_| {}).await.unwrap_err();

        assert!(matches!(err, RunError::MissingTarget));
        assert!(changes.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_empty_component_falls_back_to_base() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunOptions {
            component: Some(String::new()),
            base: Some("main".to_string()),
            ..options(dir.path())
        };
        let changes = FixedChangeSet::new(&["components/Button.tsx"]);

        let report = run_next_affected(&run, &source(), &changes, |_| {}).await.unwrap();

        assert_eq!(report.routes.into_iter().collect::<Vec<_>>(), vec!["/index"]);
        assert_eq!(changes.requests.borrow().len(), 1);
    }
}
