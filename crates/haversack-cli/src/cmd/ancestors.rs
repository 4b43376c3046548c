//! `hs ancestors` — bag colors that can eventually contain the target.

use std::io::Write;

use clap::Args;
use haversack_core::graph::ancestors;
use serde::Serialize;

use super::{Context, RulesArgs, TargetArgs, load_rules};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `hs ancestors`.
#[derive(Args, Debug)]
pub struct AncestorsArgs {
    #[command(flatten)]
    pub input: RulesArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Print every ancestor color, not just the count.
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Serialize)]
struct AncestorsOutput {
    target: String,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    ancestors: Option<Vec<String>>,
}

/// Execute `hs ancestors`.
pub fn run_ancestors(args: &AncestorsArgs, ctx: &Context) -> anyhow::Result<()> {
    let loaded = load_rules(&args.input, ctx)?;
    let target = ctx.target(&args.target);
    let found = ancestors(&loaded.graph, &target);

    let payload = AncestorsOutput {
        count: found.len(),
        ancestors: args.list.then(|| found.into_iter().collect()),
        target,
    };

    render_mode(
        ctx.output,
        &payload,
        render_ancestors_text,
        render_ancestors_pretty,
    )
}

fn render_ancestors_text(payload: &AncestorsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match payload.ancestors {
        Some(ref list) => {
            for bag in list {
                writeln!(w, "{bag}")?;
            }
            Ok(())
        }
        None => writeln!(w, "{}", payload.count),
    }
}

fn render_ancestors_pretty(payload: &AncestorsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Containers of {}", payload.target))?;
    pretty_kv(w, "Count", payload.count.to_string())?;

    if let Some(ref list) = payload.ancestors {
        if list.is_empty() {
            writeln!(w, "No bag can hold {}.", payload.target)?;
        }
        for bag in list {
            writeln!(w, "  {bag}")?;
        }
    }
    Ok(())
}
