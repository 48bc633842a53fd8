//! Affected-pages analysis over one component or a batch of changed files.
//!
//! Each changed file gets its own traversal with a fresh visited set; the
//! routes are unioned into a single report. The reverse index is built once
//! and shared by all traversals of a run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::graph::DependencyGraph;
use crate::path::{normalize_path, relative_to};
use crate::policy::ProjectPolicy;
use crate::traversal::ReverseTraversal;

/// Progress notification emitted while analyzing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisProgress {
    /// Cumulative modules processed by a component traversal.
    Modules {
        /// Modules processed so far.
        processed: usize,
        /// Modules in the graph.
        total: usize,
    },
    /// A changed file is about to be traversed.
    File {
        /// 1-based position of the file in the batch.
        position: usize,
        /// Files in the batch.
        total: usize,
    },
}

/// Outcome of an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedPagesReport {
    /// Routes of all affected pages, deduplicated and sorted.
    pub routes: BTreeSet<String>,
    /// Modules processed, summed over every traversal.
    pub processed_modules: usize,
    /// Modules in the dependency graph.
    pub total_modules: usize,
    /// Changed files (or components) that were traversed from.
    pub files_analyzed: usize,
}

impl AffectedPagesReport {
    /// Empty report for a graph of `total_modules` modules.
    pub fn empty(total_modules: usize) -> Self {
        Self {
            total_modules,
            ..Self::default()
        }
    }

    /// Whether any page is affected.
    pub fn has_affected_pages(&self) -> bool {
        !self.routes.is_empty()
    }
}

/// Runs reverse traversals against one graph and unions their routes.
pub struct AffectedPagesAnalyzer<'a> {
    policy: &'a ProjectPolicy,
    traversal: ReverseTraversal<'a>,
    total_modules: usize,
    verbose: bool,
}

impl<'a> AffectedPagesAnalyzer<'a> {
    /// Prepare an analyzer for `graph`.
    pub fn new(graph: &DependencyGraph, policy: &'a ProjectPolicy, max_depth: Option<usize>) -> Self {
        Self {
            policy,
            traversal: ReverseTraversal::new(graph, policy, max_depth),
            total_modules: graph.len(),
            verbose: false,
        }
    }

    /// Log per file and every 100 modules through `tracing`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self.traversal = self.traversal.with_verbose(verbose);
        self
    }

    /// Number of modules in the analyzed graph.
    pub fn total_modules(&self) -> usize {
        self.total_modules
    }

    /// Pages affected by a single component.
    ///
    /// `component_path` is resolved against the current working directory
    /// and then expressed relative to the project directory, the form graph
    /// keys use. `on_progress` receives [`AnalysisProgress::Modules`].
    pub fn analyze_component(
        &self,
        component_path: &str,
        mut on_progress: impl FnMut(AnalysisProgress),
    ) -> AffectedPagesReport {
        let relative = relative_to(self.policy.project_dir(), normalize_path(component_path));
        if self.verbose {
            info!(component = %relative, "Analyzing component: {component_path}");
        }

        let total = self.total_modules;
        let mut processed = 0usize;
        let outcome = self.traversal.run(&relative, |n| {
            processed += n;
            on_progress(AnalysisProgress::Modules { processed, total });
        });

        AffectedPagesReport {
            routes: outcome.routes,
            processed_modules: outcome.processed_modules,
            total_modules: total,
            files_analyzed: 1,
        }
    }

    /// Pages affected by any of `changed_files`, each traversed independently.
    ///
    /// `on_progress` receives [`AnalysisProgress::File`] before each file.
    pub fn analyze_changed_files(
        &self,
        changed_files: &[String],
        mut on_progress: impl FnMut(AnalysisProgress),
    ) -> AffectedPagesReport {
        let total_files = changed_files.len();
        let mut report = AffectedPagesReport::empty(self.total_modules);

        for (i, file) in changed_files.iter().enumerate() {
            if self.verbose {
                info!(file = %file, "Processing file: {file}");
            }
            on_progress(AnalysisProgress::File {
                position: i + 1,
                total: total_files,
            });

            let outcome = self.traversal.run(file, |_| {});
            debug!(
                file = %file,
                processed_modules = outcome.processed_modules,
                affected_pages = outcome.routes.len(),
                "Traversal finished"
            );

            report.processed_modules += outcome.processed_modules;
            report.routes.extend(outcome.routes);
            report.files_analyzed += 1;
        }

        if self.verbose {
            info!(
                "Total modules processed: {}/{}",
                report.processed_modules, report.total_modules
            );
        }

        report
    }
}
