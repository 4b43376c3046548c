//! Containment rules: the text format and its parsed representation.
//!
//! A rule line names one container bag and the bags it directly holds:
//!
//! ```text
//! light red bags contain 1 bright white bag, 2 muted yellow bags.
//! faded blue bags contain no other bags.
//! ```
//!
//! [`parser`] turns lines into [`RuleGroup`]s; [`crate::graph`] turns groups
//! into a queryable graph.

pub mod parser;

pub use parser::{
    MalformedPolicy, ParseError, ParseOutcome, RuleError, normalize_bag, parse, parse_rule,
    parse_with,
};

/// A bag type identifier, e.g. `"shiny gold"`.
///
/// Whitespace-normalized at parse time; compared by exact string match.
pub type BagType = String;

/// One `<count> <child> bag(s)` clause of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentEdge {
    /// The contained bag type.
    pub child: BagType,
    /// How many `child` bags the container holds directly. Always ≥ 1.
    pub multiplicity: u32,
}

impl ContentEdge {
    /// Build an edge from borrowed parts.
    pub fn new(child: impl Into<BagType>, multiplicity: u32) -> Self {
        Self {
            child: child.into(),
            multiplicity,
        }
    }
}

/// A parsed rule line: a container and its direct contents in line order.
///
/// An empty `contents` is a terminal bag (`no other bags`), not a missing
/// rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup {
    /// The outer bag type.
    pub container: BagType,
    /// Direct contents, in clause order.
    pub contents: Vec<ContentEdge>,
}

impl RuleGroup {
    /// Returns `true` for a `no other bags` rule.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.contents.is_empty()
    }
}
