//! # next-affected
//!
//! Find the Next.js pages affected by a change.
//!
//! The crate answers one question:
//!
//! > Given a changed source file, which routable pages (transitively) import it?
//!
//! ## Core Contract
//!
//! 1. Take a dependency graph (module → modules it imports) from a [`GraphSource`]
//! 2. Walk it in reverse from the changed module, bounded by a hop limit
//! 3. Map every page reached to its route and return the deduplicated set
//!
//! ## Architecture
//!
//! ```text
//! Changed files (git) ─┐
//!                      ├→ AffectedPagesAnalyzer → ReverseTraversal → routes
//! Component path ──────┘            ↓                    ↓
//!                            DependencyGraph       ProjectPolicy
//!                       (madge / JSON / memory)  (exclusion, pages)
//! ```
//!
//! ## Guarantees
//!
//! - Same graph + same config + same changed module → same route set
//! - Raising the depth limit only ever adds routes
//! - Cycles terminate; excluded modules never pass impact through

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod git;
pub mod graph;
pub mod orchestrator;
pub mod path;
pub mod policy;
pub mod run;
pub mod traversal;

// Re-exports
pub use config::{init_config, load_config, ConfigError, InitOutcome, NextAffectedConfig, CONFIG_FILE_NAME};
pub use git::{ChangeSetError, ChangeSetProvider, ChangeSetRequest, GitChangeSet};
pub use graph::{
    filter_graph, DependencyGraph, GraphError, GraphSource, InMemoryGraphSource, JsonGraphSource,
    ReverseIndex,
};
#[cfg(feature = "madge")]
pub use graph::MadgeGraphSource;
pub use orchestrator::{AffectedPagesAnalyzer, AffectedPagesReport, AnalysisProgress};
pub use path::{normalize_path, relative_to, resolve_in};
pub use policy::{is_page, route_from_page, should_exclude, ProjectPolicy};
pub use run::{run_next_affected, RunError, RunOptions};
pub use traversal::{find_affected_pages, ReverseTraversal, TraversalOutcome};
