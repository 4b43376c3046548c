//! Containment cycle report on a petgraph projection of the forward edges.
//!
//! # Edge Direction
//!
//! An edge `A → B` with weight `k` means "one A bag directly holds `k` B
//! bags". Repeated clauses for the same pair are merged into one edge whose
//! weight is the sum of their counts.
//!
//! Totals are only defined on acyclic rule sets; this report lists the
//! strongly connected components that break that assumption.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::build::ContainmentGraph;
use crate::rules::BagType;

// ---------------------------------------------------------------------------
// ContainmentDiGraph
// ---------------------------------------------------------------------------

/// The forward containment edges as a petgraph [`DiGraph`].
///
/// Nodes are bag types, added in sorted order so node indices are stable
/// for a given rule set. Edge weights are summed multiplicities.
#[derive(Debug)]
pub struct ContainmentDiGraph {
    /// Directed graph: nodes = bag types, edges = direct containment.
    pub graph: DiGraph<BagType, u64>,
    /// Mapping from bag type to petgraph `NodeIndex`.
    pub node_map: HashMap<BagType, NodeIndex>,
}

impl ContainmentDiGraph {
    /// Project `graph` into petgraph form.
    #[must_use]
    pub fn from_containment(graph: &ContainmentGraph) -> Self {
        let nodes = graph.nodes();
        let mut digraph = DiGraph::<BagType, u64>::with_capacity(nodes.len(), graph.edge_count());
        let mut node_map: HashMap<BagType, NodeIndex> = HashMap::with_capacity(nodes.len());

        for bag in nodes {
            let idx = digraph.add_node(bag.to_string());
            node_map.insert(bag.to_string(), idx);
        }

        // Sort edges so repeated builds add them in the same order.
        let mut edges: Vec<(&str, &str, u32)> = graph
            .edges()
            .map(|(container, edge)| (container, edge.child.as_str(), edge.multiplicity))
            .collect();
        edges.sort_unstable();

        for (container, child, multiplicity) in edges {
            let (Some(&from), Some(&to)) = (node_map.get(container), node_map.get(child)) else {
                continue;
            };
            match digraph.find_edge(from, to) {
                Some(existing) => digraph[existing] += u64::from(multiplicity),
                None => {
                    digraph.add_edge(from, to, u64::from(multiplicity));
                }
            }
        }

        Self {
            graph: digraph,
            node_map,
        }
    }

    /// Return the number of nodes (bag types) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of distinct `(container, child)` edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a bag type.
    #[must_use]
    pub fn node_index(&self, bag: &str) -> Option<NodeIndex> {
        self.node_map.get(bag).copied()
    }
}

impl From<&ContainmentGraph> for ContainmentDiGraph {
    fn from(graph: &ContainmentGraph) -> Self {
        Self::from_containment(graph)
    }
}

// ---------------------------------------------------------------------------
// Cycle detection
// ---------------------------------------------------------------------------

/// Find every containment cycle in `graph`.
///
/// Each entry is a sorted list of the bag types in one strongly connected
/// component (SCC). A bag that contains itself is reported as a one-element
/// cycle. The outer list is sorted too.
#[must_use]
pub fn find_cycles(graph: &ContainmentGraph) -> Vec<Vec<BagType>> {
    let projected = ContainmentDiGraph::from_containment(graph);
    let digraph = &projected.graph;

    let mut cycles: Vec<Vec<BagType>> = tarjan_scc(digraph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|node| digraph.find_edge(*node, *node).is_some())
        })
        .map(|component| {
            let ids: BTreeSet<BagType> = component
                .into_iter()
                .map(|idx| digraph[idx].clone())
                .collect();
            ids.into_iter().collect()
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

/// Returns `true` if no bag can contain itself, directly or transitively.
#[must_use]
pub fn is_acyclic(graph: &ContainmentGraph) -> bool {
    let projected = ContainmentDiGraph::from_containment(graph);
    !petgraph::algo::is_cyclic_directed(&projected.graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(rules: &str) -> ContainmentGraph {
        ContainmentGraph::from_rules(rules).expect("valid rules")
    }

    #[test]
    fn projection_merges_repeated_clauses() {
        let g = graph("a bags contain 2 b bags, 3 b bags, 1 c bag.\nc bags contain no other bags.");
        let projected = ContainmentDiGraph::from(&g);

        assert_eq!(projected.node_count(), 3);
        assert_eq!(projected.edge_count(), 2);

        let a = projected.node_index("a").expect("a");
        let b = projected.node_index("b").expect("b");
        let edge = projected.graph.find_edge(a, b).expect("a → b");
        assert_eq!(projected.graph[edge], 5);
    }

    #[test]
    fn acyclic_rules_have_no_cycles() {
        let g = graph(
            "a bags contain 1 b bag, 1 c bag.\n\
             b bags contain 1 d bag.\n\
             c bags contain 1 d bag.",
        );
        assert!(find_cycles(&g).is_empty());
        assert!(is_acyclic(&g));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = graph("a bags contain 1 a bag.");
        assert_eq!(find_cycles(&g), vec![vec!["a".to_string()]]);
        assert!(!is_acyclic(&g));
    }

    #[test]
    fn cycles_are_sorted_components() {
        let g = graph(
            "z bags contain 1 y bag.\n\
             y bags contain 1 z bag.\n\
             c bags contain 1 b bag.\n\
             b bags contain 1 a bag.\n\
             a bags contain 1 c bag, 1 free bag.",
        );
        assert_eq!(
            find_cycles(&g),
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["y".to_string(), "z".to_string()],
            ]
        );
    }
}
