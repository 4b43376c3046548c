//! The containment graph and the queries it answers.
//!
//! ## Pipeline
//!
//! ```text
//! rule text
//!        ↓  rules::parse()
//! Vec<RuleGroup>
//!        ↓  build::ContainmentGraph::build()
//! ContainmentGraph
//!   ├─ forward:            container → [(child, multiplicity)]
//!   └─ reverse_membership: child → {container}
//!        ↓
//!   ├─ ancestors::ancestors()          (reverse edges, set result)
//!   ├─ totals::total_contained()       (forward edges, memoized sum)
//!   └─ cycles::find_cycles()           (petgraph SCC report)
//! ```
//!
//! The graph is immutable once built. Every query takes `&ContainmentGraph`
//! and keeps its working state (visited set, memo cache) local to the call,
//! so one graph can serve any number of queries, from any number of threads.

pub mod ancestors;
pub mod build;
pub mod cycles;
pub mod totals;

use crate::error::ErrorCode;

// Re-export primary types at module level for convenience.
pub use ancestors::{ancestor_count, ancestors};
pub use build::ContainmentGraph;
pub use cycles::{ContainmentDiGraph, find_cycles, is_acyclic};
pub use totals::{TotalsRun, total_contained};

/// Errors raised by graph queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A bag was reached again while its own total was still being summed.
    ///
    /// `path` starts and ends at the re-entered bag, e.g.
    /// `["a", "b", "a"]` for `a → b → a`.
    #[error("cyclic containment: {}", path.join(" → "))]
    CyclicContainment { path: Vec<String> },

    /// The contained total for `node` does not fit in a `u64`.
    #[error("contained total for '{node}' overflows u64")]
    Overflow { node: String },
}

impl GraphError {
    /// Stable machine code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CyclicContainment { .. } => ErrorCode::CyclicContainment,
            Self::Overflow { .. } => ErrorCode::TotalOverflow,
        }
    }
}
