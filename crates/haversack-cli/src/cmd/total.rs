//! `hs total` — how many bags the target must hold in total.

use std::io::Write;

use clap::Args;
use haversack_core::graph::TotalsRun;
use serde::Serialize;
use tracing::debug;

use super::{Context, RulesArgs, TargetArgs, load_rules};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `hs total`.
#[derive(Args, Debug)]
pub struct TotalArgs {
    #[command(flatten)]
    pub input: RulesArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Serialize)]
struct TotalOutput {
    target: String,
    total: u64,
    /// Distinct bags whose contents were summed.
    expanded: usize,
}

/// Execute `hs total`.
pub fn run_total(args: &TotalArgs, ctx: &Context) -> anyhow::Result<()> {
    let loaded = load_rules(&args.input, ctx)?;
    let target = ctx.target(&args.target);

    let mut run = TotalsRun::new(&loaded.graph);
    let total = run.total(&target)?;
    debug!(target = %target, total, expanded = run.expansions(), "summed contents");

    let payload = TotalOutput {
        target,
        total,
        expanded: run.expansions(),
    };

    render_mode(ctx.output, &payload, render_total_text, render_total_pretty)
}

fn render_total_text(payload: &TotalOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", payload.total)
}

fn render_total_pretty(payload: &TotalOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Contents of {}", payload.target))?;
    pretty_kv(w, "Total", format!("{} bags", payload.total))?;
    pretty_kv(w, "Expanded", format!("{} bag colors", payload.expanded))
}
