//! Ancestor reachability over reverse containment edges.
//!
//! # Algorithm
//!
//! Stack-based DFS seeded with the target: its direct containers form the
//! first frontier. Each popped bag's direct containers are read from
//! `reverse_membership`; any container not yet visited is marked and
//! pushed. The visited set is the result, with the target itself removed:
//! the target seeds the walk but is never its own ancestor, even when a
//! cycle leads back to it.
//!
//! Each reverse edge is examined at most once, so a query is O(V+E) over the
//! ancestor subgraph.

#![allow(clippy::must_use_candidate)]

use std::collections::{BTreeSet, HashSet};

use tracing::instrument;

use super::build::ContainmentGraph;
use crate::rules::BagType;

/// All bag types that can, directly or transitively, contain `target`.
///
/// Unknown targets yield an empty set. The result is ordered so callers can
/// print it deterministically.
#[instrument(level = "debug", skip(graph))]
pub fn ancestors(graph: &ContainmentGraph, target: &str) -> BTreeSet<BagType> {
    collect_ancestors(graph, target)
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Number of bag types that can eventually contain `target`.
///
/// Same as `ancestors(graph, target).len()` without allocating owned names.
pub fn ancestor_count(graph: &ContainmentGraph, target: &str) -> usize {
    collect_ancestors(graph, target).len()
}

fn collect_ancestors<'g>(graph: &'g ContainmentGraph, target: &str) -> HashSet<&'g str> {
    let mut visited: HashSet<&'g str> = HashSet::new();
    let mut stack: Vec<&'g str> = graph.containers_iter(target).collect();
    visited.extend(stack.iter().copied());

    while let Some(current) = stack.pop() {
        for container in graph.containers_iter(current) {
            if visited.insert(container) {
                stack.push(container);
            }
        }
    }

    // Seeded, never counted.
    visited.remove(target);
    visited
}
