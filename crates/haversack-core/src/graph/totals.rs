//! Weighted totals over forward containment edges.
//!
//! # Recurrence
//!
//! ```text
//! total(n) = Σ over (child, k) in forward(n) of k × (1 + total(child))
//! ```
//!
//! The `+ 1` counts the child bag itself on top of everything inside it. A
//! bag with no rule, or a `no other bags` rule, totals 0.
//!
//! # Memoization
//!
//! A [`TotalsRun`] caches each bag's total the first time it is computed and
//! reads the cache on every later reference, so a bag shared by many
//! containers is expanded once per run. The walk is an explicit post-order
//! stack rather than native recursion, so deep rule chains cannot exhaust
//! the thread stack.
//!
//! # Cycles
//!
//! Rule sets are expected to be acyclic. A bag reached again while it is
//! still on the expansion stack fails the query with
//! [`GraphError::CyclicContainment`] instead of looping.
//!
//! # Arithmetic
//!
//! Totals are `u64` and every step is checked; a total that does not fit
//! fails with [`GraphError::Overflow`].

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use super::GraphError;
use super::build::ContainmentGraph;
use crate::rules::ContentEdge;

/// Total number of bags, counted with multiplicity, inside one `node` bag.
///
/// Runs a fresh [`TotalsRun`] and discards its cache afterwards. Unknown
/// bags total 0.
///
/// # Errors
///
/// Returns [`GraphError::CyclicContainment`] if `node` can contain itself
/// and [`GraphError::Overflow`] if the total does not fit in a `u64`.
#[instrument(level = "debug", skip(graph))]
pub fn total_contained(graph: &ContainmentGraph, node: &str) -> Result<u64, GraphError> {
    let mut run = TotalsRun::new(graph);
    let total = run.total(node)?;
    debug!(expansions = run.expansions(), total, "computed contained total");
    Ok(total)
}

/// One memoized traversal over a [`ContainmentGraph`].
///
/// The cache lives as long as the run, so several queries against the same
/// run share work. Create a new run for independent queries.
#[derive(Debug)]
pub struct TotalsRun<'g> {
    graph: &'g ContainmentGraph,
    memo: HashMap<&'g str, u64>,
    expansions: usize,
}

/// A bag whose children are being summed.
#[derive(Debug)]
struct Frame<'g> {
    node: &'g str,
    children: &'g [ContentEdge],
    next: usize,
    total: u64,
}

impl<'g> Frame<'g> {
    const fn new(node: &'g str, children: &'g [ContentEdge]) -> Self {
        Self {
            node,
            children,
            next: 0,
            total: 0,
        }
    }

    /// Fold the finished total of `children[next]` into this frame.
    fn absorb(&mut self, inner: u64) -> Result<(), GraphError> {
        let edge = &self.children[self.next];
        self.total = weighted(self.total, edge.multiplicity, inner).ok_or_else(|| {
            GraphError::Overflow {
                node: self.node.to_string(),
            }
        })?;
        self.next += 1;
        Ok(())
    }
}

impl<'g> TotalsRun<'g> {
    /// Start a run with an empty cache.
    #[must_use]
    pub fn new(graph: &'g ContainmentGraph) -> Self {
        Self {
            graph,
            memo: HashMap::new(),
            expansions: 0,
        }
    }

    /// Number of bags whose total this run has computed (cache misses).
    ///
    /// Each bag is expanded at most once per run.
    #[must_use]
    pub const fn expansions(&self) -> usize {
        self.expansions
    }

    /// The cached total for `node`, if this run has computed it.
    #[must_use]
    pub fn cached(&self, node: &str) -> Option<u64> {
        self.memo.get(node).copied()
    }

    /// Total number of bags inside one `node` bag.
    ///
    /// # Errors
    ///
    /// See [`total_contained`]. A failed query leaves the cache holding only
    /// totals that were fully computed, so the run stays usable.
    pub fn total(&mut self, node: &str) -> Result<u64, GraphError> {
        let Some((root, children)) = self.graph.forward_entry(node) else {
            return Ok(0);
        };
        if let Some(&total) = self.memo.get(root) {
            return Ok(total);
        }

        let mut on_stack: HashSet<&'g str> = HashSet::from([root]);
        let mut stack: Vec<Frame<'g>> = vec![Frame::new(root, children)];
        self.expansions += 1;
        let mut result = 0;

        while let Some(frame) = stack.last_mut() {
            let children: &'g [ContentEdge] = frame.children;

            if let Some(edge) = children.get(frame.next) {
                let child = edge.child.as_str();
                if let Some(&inner) = self.memo.get(child) {
                    frame.absorb(inner)?;
                    continue;
                }
                if on_stack.contains(child) {
                    return Err(cycle_error(&stack, child));
                }
                on_stack.insert(child);
                self.expansions += 1;
                stack.push(Frame::new(child, self.graph.children(child)));
                continue;
            }

            // Every child summed: publish this bag and hand its total up.
            let node = frame.node;
            let total = frame.total;
            stack.pop();
            on_stack.remove(node);
            self.memo.insert(node, total);

            match stack.last_mut() {
                Some(parent) => parent.absorb(total)?,
                None => result = total,
            }
        }

        Ok(result)
    }
}

/// `total + multiplicity × (1 + inner)`, or `None` on overflow.
fn weighted(total: u64, multiplicity: u32, inner: u64) -> Option<u64> {
    inner
        .checked_add(1)?
        .checked_mul(u64::from(multiplicity))?
        .checked_add(total)
}

/// Build the cycle path from the first frame for `reentered` to the top.
fn cycle_error(stack: &[Frame<'_>], reentered: &str) -> GraphError {
    let start = stack
        .iter()
        .position(|frame| frame.node == reentered)
        .unwrap_or(0);
    let mut path: Vec<String> = stack[start..]
        .iter()
        .map(|frame| frame.node.to_string())
        .collect();
    path.push(reentered.to_string());
    GraphError::CyclicContainment { path }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleGroup;

    fn graph(rules: &str) -> ContainmentGraph {
        ContainmentGraph::from_rules(rules).expect("valid rules")
    }

    #[test]
    fn terminal_bag_totals_zero() {
        let g = graph("dotted black bags contain no other bags.");
        assert_eq!(total_contained(&g, "dotted black"), Ok(0));
    }

    #[test]
    fn unknown_bag_totals_zero() {
        let g = graph("a bags contain 1 b bag.");
        assert_eq!(total_contained(&g, "b"), Ok(0));
        assert_eq!(total_contained(&g, "nowhere"), Ok(0));
    }

    #[test]
    fn chain_worked_example() {
        // 1 × (1 + 2 × (1 + 0)) = 3
        let g = graph(
            "A bags contain 1 B bag.\n\
             B bags contain 2 C bags.\n\
             C bags contain no other bags.",
        );
        assert_eq!(total_contained(&g, "A"), Ok(3));
        assert_eq!(total_contained(&g, "B"), Ok(2));
        assert_eq!(total_contained(&g, "C"), Ok(0));
    }

    #[test]
    fn shared_child_is_expanded_once() {
        let g = graph(
            "A bags contain 1 B bag, 1 C bag.\n\
             B bags contain 2 D bags.\n\
             C bags contain 2 D bags.\n\
             D bags contain 3 E bags.\n\
             E bags contain no other bags.",
        );
        let mut run = TotalsRun::new(&g);
        // B = 2 × (1 + 3) = 8, C = 8, A = 1 × 9 + 1 × 9 = 18
        assert_eq!(run.total("A"), Ok(18));
        // A, B, C, D, E: one expansion each, although D is reached twice.
        assert_eq!(run.expansions(), 5);
        assert_eq!(run.cached("D"), Some(3));

        // Later queries on the same run are pure cache hits.
        assert_eq!(run.total("C"), Ok(8));
        assert_eq!(run.expansions(), 5);
    }

    #[test]
    fn duplicate_clauses_both_count() {
        let g = graph("A bags contain 2 X bags, 3 X bags.\nX bags contain 1 Y bag.");
        let mut run = TotalsRun::new(&g);
        // X = 1; A = 2 × 2 + 3 × 2 = 10
        assert_eq!(run.total("A"), Ok(10));
        assert_eq!(run.expansions(), 3);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let g = graph("a bags contain 4 b bags.\nb bags contain 5 c bags.");
        let first = total_contained(&g, "a");
        let second = total_contained(&g, "a");
        assert_eq!(first, Ok(24));
        assert_eq!(first, second);
    }

    #[test]
    fn self_loop_is_reported() {
        let g = graph("a bags contain 1 a bag.");
        assert_eq!(
            total_contained(&g, "a"),
            Err(GraphError::CyclicContainment {
                path: vec!["a".to_string(), "a".to_string()],
            })
        );
    }

    #[test]
    fn longer_cycle_reports_path() {
        let g = graph(
            "root bags contain 1 a bag.\n\
             a bags contain 1 b bag.\n\
             b bags contain 2 c bags.\n\
             c bags contain 1 a bag.",
        );
        let err = total_contained(&g, "root").expect_err("cycle");
        assert_eq!(
            err,
            GraphError::CyclicContainment {
                path: ["a", "b", "c", "a"].map(String::from).to_vec(),
            }
        );
        assert_eq!(err.to_string(), "cyclic containment: a → b → c → a");
    }

    #[test]
    fn run_survives_a_failed_query() {
        let g = graph(
            "ok bags contain 2 leaf bags.\n\
             leaf bags contain no other bags.\n\
             bad bags contain 1 loop bag, 1 ok bag.\n\
             loop bags contain 1 bad bag.",
        );
        let mut run = TotalsRun::new(&g);
        assert!(run.total("bad").is_err());
        assert_eq!(run.total("ok"), Ok(2));
    }

    #[test]
    fn overflow_is_reported() {
        let groups = (0..8).map(|level| RuleGroup {
            container: format!("level{level}"),
            contents: vec![ContentEdge::new(format!("level{}", level + 1), u32::MAX)],
        });
        let g = ContainmentGraph::build(groups);
        let err = total_contained(&g, "level0").expect_err("overflow");
        assert!(matches!(err, GraphError::Overflow { .. }));
    }

    #[test]
    fn deep_chain_does_not_exhaust_the_stack() {
        let depth = 100_000;
        let groups = (0..depth).map(|level| RuleGroup {
            container: format!("n{level}"),
            contents: vec![ContentEdge::new(format!("n{}", level + 1), 1)],
        });
        let g = ContainmentGraph::build(groups);
        assert_eq!(total_contained(&g, "n0"), Ok(depth));
    }
}
