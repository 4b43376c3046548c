//! Line parser for containment rules.
//!
//! # Rule format
//!
//! ```text
//! <container> bags contain <contents>.
//! ```
//!
//! `<contents>` is either `no other bags` or a comma-separated list of
//! `<count> <child> bag` / `<count> <child> bags` clauses. The bag word may
//! also be singular in the container position.
//!
//! # Normalization
//!
//! Whitespace runs are collapsed to a single space and the line is trimmed
//! before matching, so `"shiny   gold"` and `"shiny gold"` are the same bag.
//! Case is preserved: identifiers are matched exactly.
//!
//! # Malformed lines
//!
//! [`parse`] stops at the first malformed line and reports it with its
//! 1-based line number. [`parse_with`] and [`MalformedPolicy::Skip`] warn
//! and continue instead.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{BagType, ContentEdge, RuleGroup};
use crate::error::ErrorCode;

/// Separator between the container and its contents.
const CONTAIN: &str = " contain ";

/// The contents phrase of a terminal bag.
const NO_OTHER_BAGS: &str = "no other bags";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a single rule line failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line does not end with `.`.
    #[error("rule must end with '.'")]
    MissingTerminator,

    /// No ` contain ` between the container and its contents.
    #[error("expected '<container> bags contain <contents>'")]
    MissingSeparator,

    /// The container part is not `<name> bag(s)`.
    #[error("invalid container '{0}': expected '<color> bags'")]
    InvalidContainer(String),

    /// A clause count is not a positive integer.
    #[error("invalid count '{0}': expected a positive integer")]
    InvalidCount(String),

    /// A clause is not `<count> <child> bag(s)`.
    #[error("invalid content clause '{0}': expected '<count> <color> bag(s)'")]
    InvalidClause(String),
}

/// A malformed line in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("line {line_no}: {source}: '{line}'")]
    Malformed {
        /// 1-based line number.
        line_no: usize,
        /// The offending line, as read.
        line: String,
        #[source]
        source: ParseError,
    },
}

impl RuleError {
    /// Stable machine code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed { .. } => ErrorCode::MalformedRule,
        }
    }

    /// The 1-based line number the error refers to.
    #[must_use]
    pub const fn line_no(&self) -> usize {
        match self {
            Self::Malformed { line_no, .. } => *line_no,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What to do when a rule line is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop at the first malformed line.
    #[default]
    Fail,
    /// Log a warning, drop the line and keep going.
    Skip,
}

/// Result of [`parse_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Parsed groups in line order.
    pub groups: Vec<RuleGroup>,
    /// Lines dropped under [`MalformedPolicy::Skip`]. Always empty under
    /// [`MalformedPolicy::Fail`].
    pub skipped: Vec<RuleError>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_bag(raw: &str) -> BagType {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse one rule line.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the first part of the line that does not
/// match the rule format.
pub fn parse_rule(line: &str) -> Result<RuleGroup, ParseError> {
    let normalized = normalize_bag(line);
    let body = normalized
        .strip_suffix('.')
        .ok_or(ParseError::MissingTerminator)?;

    let (container, contents_raw) = split_container(body)?;
    let contents_raw = contents_raw.trim();

    if contents_raw == NO_OTHER_BAGS {
        return Ok(RuleGroup {
            container: container.to_string(),
            contents: Vec::new(),
        });
    }

    let contents = contents_raw
        .split(',')
        .map(parse_clause)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleGroup {
        container: container.to_string(),
        contents,
    })
}

/// Parse a full rule file, skipping blank lines.
///
/// # Errors
///
/// Returns [`RuleError::Malformed`] for the first line that fails to parse.
pub fn parse(input: &str) -> Result<Vec<RuleGroup>, RuleError> {
    parse_with(input, MalformedPolicy::Fail).map(|outcome| outcome.groups)
}

/// Parse a full rule file under the given [`MalformedPolicy`].
///
/// # Errors
///
/// Under [`MalformedPolicy::Fail`], returns [`RuleError::Malformed`] for
/// the first line that fails to parse. Never fails under
/// [`MalformedPolicy::Skip`].
pub fn parse_with(input: &str, policy: MalformedPolicy) -> Result<ParseOutcome, RuleError> {
    let mut outcome = ParseOutcome::default();

    for (i, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_rule(line) {
            Ok(group) => outcome.groups.push(group),
            Err(source) => {
                let err = RuleError::Malformed {
                    line_no: i + 1,
                    line: line.trim_end_matches('\r').to_string(),
                    source,
                };
                match policy {
                    MalformedPolicy::Fail => return Err(err),
                    MalformedPolicy::Skip => {
                        warn!(line_no = err.line_no(), "skipping malformed rule: {err}");
                        outcome.skipped.push(err);
                    }
                }
            }
        }
    }

    debug!(
        groups = outcome.groups.len(),
        skipped = outcome.skipped.len(),
        "parsed containment rules"
    );
    Ok(outcome)
}

/// Split `<name> bag(s) contain <contents>` at the first ` contain ` whose
/// left side ends with the bag word, so names may themselves hold "contain".
fn split_container(body: &str) -> Result<(&str, &str), ParseError> {
    let mut first_prefix = None;
    for (idx, _) in body.match_indices(CONTAIN) {
        let prefix = &body[..idx];
        if let Some(name) = strip_bag_word(prefix) {
            return Ok((name, &body[idx + CONTAIN.len()..]));
        }
        first_prefix = first_prefix.or(Some(prefix));
    }

    match first_prefix {
        Some(prefix) => Err(ParseError::InvalidContainer(prefix.to_string())),
        None => Err(ParseError::MissingSeparator),
    }
}

/// Strip a trailing ` bags` / ` bag` and return the non-empty name before it.
fn strip_bag_word(raw: &str) -> Option<&str> {
    let name = raw
        .strip_suffix(" bags")
        .or_else(|| raw.strip_suffix(" bag"))?;
    if name.is_empty() { None } else { Some(name) }
}

/// Parse `<count> <child> bag(s)`.
fn parse_clause(raw: &str) -> Result<ContentEdge, ParseError> {
    let clause = raw.trim();
    let (count_raw, rest) = clause
        .split_once(' ')
        .ok_or_else(|| ParseError::InvalidClause(clause.to_string()))?;

    // `u32::from_str` accepts a leading '+', which the rule format does not.
    if !count_raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::InvalidCount(count_raw.to_string()));
    }
    let multiplicity: u32 = count_raw
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ParseError::InvalidCount(count_raw.to_string()))?;

    let child =
        strip_bag_word(rest).ok_or_else(|| ParseError::InvalidClause(clause.to_string()))?;

    Ok(ContentEdge::new(child, multiplicity))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
