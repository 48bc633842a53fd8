//! Property tests for the reverse traversal.

use std::collections::BTreeSet;

use next_affected::{DependencyGraph, NextAffectedConfig, ProjectPolicy, ReverseTraversal};
use proptest::prelude::*;

const PROJECT: &str = "/project";

/// Module name for index `i`: every third module is a page, every seventh a stylesheet.
fn module_name(i: usize) -> String {
    if i % 7 == 6 {
        format!("styles/s{i}.css")
    } else if i % 3 == 0 {
        format!("pages/p{i}.tsx")
    } else {
        format!("lib/m{i}.ts")
    }
}

fn arb_graph() -> impl Strategy<Value = (DependencyGraph, usize)> {
    (2usize..24).prop_flat_map(|n| {
        let edges = proptest::collection::vec((0..n, 0..n), 0..(n * 3));
        (Just(n), edges, 0..n)
    })
    .prop_map(|(n, edges, changed)| {
        let mut adjacency: Vec<Vec<String>> = vec![Vec::new(); n];
        for (from, to) in edges {
            adjacency[from].push(module_name(to));
        }
        let graph: DependencyGraph = adjacency
            .into_iter()
            .enumerate()
            .map(|(i, deps)| (module_name(i), deps))
            .collect();
        (graph, changed)
    })
}

fn routes(graph: &DependencyGraph, changed: &str, max_depth: Option<usize>) -> BTreeSet<String> {
    let policy = ProjectPolicy::new(PROJECT, &NextAffectedConfig::default());
    ReverseTraversal::new(graph, &policy, max_depth)
        .run(changed, |_| {})
        .routes
}

/// Stylesheets by extension, plus `lib/m1*` and `pages/p1*` by path prefix.
fn exclusion_config() -> NextAffectedConfig {
    NextAffectedConfig {
        excluded_paths: vec!["lib/m1".to_string(), "pages/p1".to_string()],
        ..NextAffectedConfig::default()
    }
}

/// Fixed-point reverse reachability where excluded modules neither match nor
/// pass impact on to their importers.
fn reachable_routes(graph: &DependencyGraph, policy: &ProjectPolicy, changed: &str) -> BTreeSet<String> {
    let mut reached = BTreeSet::new();
    let start = policy.normalize_module(changed);
    if !policy.should_exclude(&start) {
        reached.insert(start);
    }

    loop {
        let before = reached.len();
        for (module, deps) in graph.iter() {
            let module = policy.normalize_module(module);
            if policy.should_exclude(&module) || reached.contains(&module) {
                continue;
            }
            if deps.iter().any(|dep| reached.contains(&policy.normalize_module(dep))) {
                reached.insert(module);
            }
        }
        if reached.len() == before {
            break;
        }
    }

    reached
        .iter()
        .filter(|path| policy.is_page(path))
        .map(|path| policy.route_from_page(path))
        .collect()
}

proptest! {
    #[test]
    fn depth_zero_is_only_the_changed_module((graph, changed) in arb_graph()) {
        let name = module_name(changed);
        let result = routes(&graph, &name, Some(0));

        let policy = ProjectPolicy::new(PROJECT, &NextAffectedConfig::default());
        let path = policy.normalize_module(&name);
        let expected: BTreeSet<String> = if !policy.should_exclude(&path) && policy.is_page(&path) {
            [policy.route_from_page(&path)].into_iter().collect()
        } else {
            BTreeSet::new()
        };
        prop_assert_eq!(result, expected);
    }

    #[test]
    fn deeper_bound_never_removes_routes((graph, changed) in arb_graph(), depth in 0usize..6) {
        let name = module_name(changed);
        let shallow = routes(&graph, &name, Some(depth));
        let deeper = routes(&graph, &name, Some(depth + 1));
        let unbounded = routes(&graph, &name, None);

        prop_assert!(shallow.is_subset(&deeper));
        prop_assert!(deeper.is_subset(&unbounded));
    }

    #[test]
    fn traversal_is_idempotent((graph, changed) in arb_graph()) {
        let name = module_name(changed);
        prop_assert_eq!(routes(&graph, &name, None), routes(&graph, &name, None));
    }

    #[test]
    fn excluded_modules_block_propagation((graph, changed) in arb_graph()) {
        let config = exclusion_config();
        let policy = ProjectPolicy::new(PROJECT, &config);
        let name = module_name(changed);

        let result = ReverseTraversal::new(&graph, &policy, None).run(&name, |_| {}).routes;

        prop_assert_eq!(result, reachable_routes(&graph, &policy, &name));
    }

    #[test]
    fn processed_modules_bounded_by_graph((graph, changed) in arb_graph()) {
        let policy = ProjectPolicy::new(PROJECT, &NextAffectedConfig::default());
        let outcome = ReverseTraversal::new(&graph, &policy, None).run(&module_name(changed), |_| {});
        prop_assert!(outcome.processed_modules <= graph.len());
    }
}
