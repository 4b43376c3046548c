//! `hs cycles` — list containment cycles (strongly connected components).

use std::io::Write;

use clap::Args;
use haversack_core::graph::find_cycles;
use serde::Serialize;

use super::{Context, RulesArgs, load_rules};
use crate::output::{pretty_rule, render_mode};

/// Arguments for `hs cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub input: RulesArgs,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    cycles: Vec<Vec<String>>,
}

/// Execute `hs cycles`.
pub fn run_cycles(args: &CyclesArgs, ctx: &Context) -> anyhow::Result<()> {
    let loaded = load_rules(&args.input, ctx)?;
    let payload = CyclesOutput {
        cycles: find_cycles(&loaded.graph),
    };

    render_mode(ctx.output, &payload, render_cycles_text, render_cycles_pretty)
}

fn render_cycles_text(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for cycle in &payload.cycles {
        writeln!(w, "{}", cycle.join("\t"))?;
    }
    Ok(())
}

fn render_cycles_pretty(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No containment cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Containment cycles ({})", payload.cycles.len())?;
    pretty_rule(w)?;
    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "{:>2}. {}", idx + 1, cycle.join(" -> "))?;
    }
    Ok(())
}
