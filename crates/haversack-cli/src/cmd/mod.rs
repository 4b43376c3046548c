//! Command handlers for the `hs` binary.
//!
//! Each subcommand reads one rule file, builds the containment graph and
//! renders a single payload through [`crate::output`].

pub mod ancestors;
pub mod cycles;
pub mod solve;
pub mod total;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use haversack_core::config::HaversackConfig;
use haversack_core::graph::ContainmentGraph;
use haversack_core::rules::{MalformedPolicy, normalize_bag, parse_with};
use tracing::{info, warn};

use crate::output::OutputMode;

/// Rules input shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct RulesArgs {
    /// Rule file to read (`-` reads stdin).
    pub rules: PathBuf,
}

/// Target selection shared by the query subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Bag type to query (defaults to `[query] target`, then "shiny gold").
    #[arg(short, long)]
    pub target: Option<String>,
}

/// Settings resolved from flags, environment and config for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub policy: MalformedPolicy,
    pub config: HaversackConfig,
}

impl Context {
    /// Resolve the query target: the flag if given, else the config value.
    /// Either way the name is whitespace-normalized like parsed rules.
    pub fn target(&self, args: &TargetArgs) -> String {
        normalize_bag(args.target.as_deref().unwrap_or(&self.config.query.target))
    }
}

/// A built graph plus what the parser dropped on the way.
#[derive(Debug)]
pub struct LoadedRules {
    pub graph: ContainmentGraph,
    pub skipped: usize,
}

/// Read and parse a rule file under the context's malformed-line policy.
pub fn load_rules(args: &RulesArgs, ctx: &Context) -> anyhow::Result<LoadedRules> {
    let text = read_input(&args.rules)?;
    let outcome = parse_with(&text, ctx.policy)
        .with_context(|| format!("failed to parse {}", display_path(&args.rules)))?;

    if !outcome.skipped.is_empty() {
        warn!(
            skipped = outcome.skipped.len(),
            "ignored malformed rule lines"
        );
    }

    let skipped = outcome.skipped.len();
    let graph = ContainmentGraph::build(outcome.groups);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded containment rules"
    );
    Ok(LoadedRules { graph, skipped })
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read rules from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn display_path(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}
