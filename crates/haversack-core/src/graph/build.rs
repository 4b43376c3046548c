//! Containment graph built from parsed rule groups.
//!
//! # Data Model
//!
//! Two adjacency maps are filled in one pass over the rule groups:
//!
//! - `forward`: container → ordered `(child, multiplicity)` edges. Every
//!   container named by a rule has an entry, even a `no other bags` one.
//! - `reverse_membership`: child → set of containers that hold it directly.
//!
//! Bags that only ever appear as contents have no `forward` entry; lookups
//! for them return an empty slice, never an error.
//!
//! # Usage
//!
//! ```rust
//! use haversack_core::graph::ContainmentGraph;
//!
//! let graph = ContainmentGraph::from_rules(
//!     "light red bags contain 1 bright white bag, 2 muted yellow bags.",
//! )?;
//! assert_eq!(graph.children("light red").len(), 2);
//! assert!(graph.containers("muted yellow").contains("light red"));
//! assert!(graph.children("muted yellow").is_empty());
//! # Ok::<(), haversack_core::rules::RuleError>(())
//! ```

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use crate::rules::{self, BagType, ContentEdge, RuleError, RuleGroup};

// ---------------------------------------------------------------------------
// ContainmentGraph
// ---------------------------------------------------------------------------

/// Forward and reverse adjacency for a complete rule set.
///
/// Constructed once from a rule set and immutable afterwards. Call
/// [`ContainmentGraph::build`] again if the rules change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainmentGraph {
    /// container → direct contents, in rule order.
    forward: HashMap<BagType, Vec<ContentEdge>>,
    /// child → containers that hold it directly.
    reverse_membership: HashMap<BagType, HashSet<BagType>>,
}

impl ContainmentGraph {
    /// Build a [`ContainmentGraph`] from parsed rule groups.
    ///
    /// A container that appears in more than one group keeps the contents
    /// of all of them, in order.
    ///
    /// # Complexity
    ///
    /// O(E) where E is the total number of content edges.
    pub fn build(groups: impl IntoIterator<Item = RuleGroup>) -> Self {
        let mut forward: HashMap<BagType, Vec<ContentEdge>> = HashMap::new();
        let mut reverse_membership: HashMap<BagType, HashSet<BagType>> = HashMap::new();

        for RuleGroup {
            container,
            contents,
        } in groups
        {
            for edge in &contents {
                reverse_membership
                    .entry(edge.child.clone())
                    .or_default()
                    .insert(container.clone());
            }

            match forward.get_mut(&container) {
                Some(existing) => {
                    warn!(%container, "container has more than one rule; merging contents");
                    existing.extend(contents);
                }
                None => {
                    forward.insert(container, contents);
                }
            }
        }

        let graph = Self {
            forward,
            reverse_membership,
        };
        debug!(
            containers = graph.forward.len(),
            edges = graph.edge_count(),
            "built containment graph"
        );
        graph
    }

    /// Parse `input` with [`rules::parse`] and build the graph.
    ///
    /// # Errors
    ///
    /// Returns the parser's [`RuleError`] for the first malformed line.
    pub fn from_rules(input: &str) -> Result<Self, RuleError> {
        rules::parse(input).map(Self::build)
    }

    /// Direct contents of `node`, in rule order.
    ///
    /// Returns an empty slice for terminal and unknown bags alike.
    pub fn children(&self, node: &str) -> &[ContentEdge] {
        self.forward
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Bag types that directly contain `node`.
    ///
    /// Returns an empty set if nothing contains `node` or it is not known.
    pub fn containers(&self, node: &str) -> HashSet<&str> {
        self.containers_iter(node).collect()
    }

    /// Iterate the bag types that directly contain `node` without collecting.
    pub fn containers_iter<'g>(&'g self, node: &str) -> impl Iterator<Item = &'g str> + use<'g> {
        self.reverse_membership
            .get(node)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Returns `true` if `node` has a rule of its own.
    pub fn has_rule(&self, node: &str) -> bool {
        self.forward.contains_key(node)
    }

    /// Returns `true` if `node` appears anywhere in the rule set.
    pub fn contains_node(&self, node: &str) -> bool {
        self.forward.contains_key(node) || self.reverse_membership.contains_key(node)
    }

    /// Every bag type named by a rule, as container or as contents, sorted.
    pub fn nodes(&self) -> BTreeSet<&str> {
        self.forward
            .keys()
            .chain(self.reverse_membership.keys())
            .map(String::as_str)
            .collect()
    }

    /// Return the number of distinct bag types in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Return the number of content edges, counting repeated clauses.
    pub fn edge_count(&self) -> usize {
        self.forward.values().map(Vec::len).sum()
    }

    /// Return `true` if the graph has no bag types.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.reverse_membership.is_empty()
    }

    /// Look up the graph-owned key and contents for `node`.
    ///
    /// Lets traversals hold `&'g str` keys for nodes named by the caller.
    pub(crate) fn forward_entry(&self, node: &str) -> Option<(&str, &[ContentEdge])> {
        self.forward
            .get_key_value(node)
            .map(|(key, edges)| (key.as_str(), edges.as_slice()))
    }

    /// Iterate `(container, edge)` pairs over every content edge.
    pub(crate) fn edges(&self) -> impl Iterator<Item = (&str, &ContentEdge)> {
        self.forward
            .iter()
            .flat_map(|(container, edges)| edges.iter().map(move |e| (container.as_str(), e)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
