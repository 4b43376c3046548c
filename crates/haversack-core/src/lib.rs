#![forbid(unsafe_code)]
//! haversack-core library.
//!
//! Parses bag containment rules into a [`graph::ContainmentGraph`] and
//! answers two questions over it: which bag types can eventually hold a
//! target ([`graph::ancestors`]) and how many bags one target bag holds
//! ([`graph::total_contained`]).
//!
//! ```rust
//! use haversack_core::graph::{ContainmentGraph, ancestors, total_contained};
//! use haversack_core::rules::parse;
//!
//! let rules = "\
//! shiny gold bags contain 1 dark red bag.
//! dark red bags contain 2 dark orange bags.
//! dark orange bags contain no other bags.";
//!
//! let graph = ContainmentGraph::build(parse(rules)?);
//! assert_eq!(ancestors(&graph, "dark orange").len(), 2);
//! assert_eq!(total_contained(&graph, "shiny gold")?, 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per module; [`error::ErrorCode`]
//!   gives each one a stable machine code.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod graph;
pub mod rules;

/// The bag type every puzzle query asks about unless told otherwise.
pub const DEFAULT_TARGET: &str = "shiny gold";
