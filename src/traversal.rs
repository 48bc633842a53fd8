//! Reverse dependency traversal.
//!
//! Walks the import graph backwards from a changed module (from each module
//! to the modules that import it) and collects the route of every page
//! reached within the hop budget.
//!
//! ## Algorithm
//!
//! 1. Start with the changed module at depth 0
//! 2. Pop the next `(module, depth)` from a FIFO work queue
//!    - Skip if already visited or `depth > max_depth`
//!    - Normalize against the project directory; skip if excluded
//!    - Mark visited; if it is a page, record its route
//!    - Queue every non-excluded dependent at `depth + 1`
//!    - Count it as processed and report progress
//! 3. Return the collected routes
//!
//! Breadth-first order means each module is processed at its shortest hop
//! distance from the changed module, so the depth bound is exact. The queue
//! replaces call recursion, so deep graphs cannot exhaust the stack.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::NextAffectedConfig;
use crate::graph::{DependencyGraph, ReverseIndex};
use crate::policy::ProjectPolicy;

/// Modules processed between verbose progress lines.
pub const PROGRESS_LOG_INTERVAL: usize = 100;

/// Result of one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalOutcome {
    /// Routes of the affected pages.
    pub routes: BTreeSet<String>,
    /// Modules visited and expanded (excluded and skipped modules not counted).
    pub processed_modules: usize,
}

/// Reverse traversal over one graph.
///
/// Holds the reverse index so that several changed modules can be analyzed
/// against the same graph without re-indexing. Every call to
/// [`ReverseTraversal::run`] starts with a fresh visited set.
#[derive(Debug, Clone)]
pub struct ReverseTraversal<'a> {
    policy: &'a ProjectPolicy,
    index: ReverseIndex,
    max_depth: Option<usize>,
    verbose: bool,
}

impl<'a> ReverseTraversal<'a> {
    /// Index `graph` for traversal under `policy`.
    ///
    /// `max_depth` bounds the number of reverse hops; `None` is unbounded.
    pub fn new(graph: &DependencyGraph, policy: &'a ProjectPolicy, max_depth: Option<usize>) -> Self {
        Self {
            policy,
            index: ReverseIndex::build(graph, policy),
            max_depth,
            verbose: false,
        }
    }

    /// Log progress every [`PROGRESS_LOG_INTERVAL`] modules and a final total.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Hop bound of this traversal.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    fn beyond_depth(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }

    /// Find the pages affected by a change to `changed_component`.
    ///
    /// `on_progress` is called with `1` after each processed module.
    pub fn run(&self, changed_component: &str, mut on_progress: impl FnMut(usize)) -> TraversalOutcome {
        let mut visited: HashSet<String> = HashSet::new();
        let mut routes: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        let mut processed = 0usize;

        queue.push_back((changed_component.to_string(), 0));

        while let Some((module, depth)) = queue.pop_front() {
            if visited.contains(&module) || self.beyond_depth(depth) {
                continue;
            }

            let module_path = self.policy.normalize_module(&module);
            if self.policy.should_exclude(&module_path) {
                continue;
            }

            visited.insert(module);

            if let Some(route) = self.policy.page_route(&module_path) {
                debug!(module = %module_path, route = %route, "Affected page");
                routes.insert(route);
            }

            let next_depth = depth + 1;
            if !self.beyond_depth(next_depth) {
                for dependent in self.index.dependents_of(&module_path) {
                    if visited.contains(dependent) {
                        continue;
                    }
                    let dependent_path = self.policy.normalize_module(dependent);
                    if self.policy.should_exclude(&dependent_path) {
                        continue;
                    }
                    queue.push_back((dependent.clone(), next_depth));
                }
            }

            processed += 1;
            on_progress(1);

            if self.verbose && processed % PROGRESS_LOG_INTERVAL == 0 {
                info!(processed_modules = processed, "Processed {processed} modules...");
            }
        }

        if self.verbose {
            info!(
                changed = %changed_component,
                processed_modules = processed,
                affected_pages = routes.len(),
                "Total modules processed: {processed}"
            );
        }

        TraversalOutcome {
            routes,
            processed_modules: processed,
        }
    }
}

/// Find the routes of all pages affected by a change to `changed_component`.
///
/// One-shot form of [`ReverseTraversal`]: compiles the policy and indexes the
/// graph for this call only.
pub fn find_affected_pages(
    graph: &DependencyGraph,
    changed_component: &str,
    project_dir: impl AsRef<Path>,
    config: &NextAffectedConfig,
    max_depth: Option<usize>,
    verbose: bool,
    on_progress: Option<&mut dyn FnMut(usize)>,
) -> BTreeSet<String> {
    let policy = ProjectPolicy::new(project_dir, config);
    let traversal = ReverseTraversal::new(graph, &policy, max_depth).with_verbose(verbose);

    match on_progress {
        Some(callback) => traversal.run(changed_component, callback).routes,
        None => traversal.run(changed_component, |_| {}).routes,
    }
}
