//! `hs solve` — both answers for one target: how many bags can eventually
//! hold it, and how many bags it must hold.

use std::io::Write;

use clap::Args;
use haversack_core::graph::{ancestor_count, total_contained};
use serde::Serialize;

use super::{Context, RulesArgs, TargetArgs, load_rules};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `hs solve`.
#[derive(Args, Debug)]
pub struct SolveArgs {
    #[command(flatten)]
    pub input: RulesArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Serialize)]
struct SolveOutput {
    target: String,
    ancestors: usize,
    total: u64,
    #[serde(skip_serializing_if = "is_zero")]
    skipped_lines: usize,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Execute `hs solve`.
pub fn run_solve(args: &SolveArgs, ctx: &Context) -> anyhow::Result<()> {
    let loaded = load_rules(&args.input, ctx)?;
    let target = ctx.target(&args.target);

    let payload = SolveOutput {
        ancestors: ancestor_count(&loaded.graph, &target),
        total: total_contained(&loaded.graph, &target)?,
        target,
        skipped_lines: loaded.skipped,
    };

    render_mode(ctx.output, &payload, render_solve_text, render_solve_pretty)
}

fn render_solve_text(payload: &SolveOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", payload.ancestors)?;
    writeln!(w, "{}", payload.total)
}

fn render_solve_pretty(payload: &SolveOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Bag: {}", payload.target))?;
    pretty_kv(w, "Held by", format!("{} bag colors", payload.ancestors))?;
    pretty_kv(w, "Holds", format!("{} bags", payload.total))?;
    if payload.skipped_lines > 0 {
        pretty_kv(w, "Skipped", format!("{} malformed lines", payload.skipped_lines))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: SolveArgs,
    }

    fn payload(skipped_lines: usize) -> SolveOutput {
        SolveOutput {
            target: "shiny gold".to_string(),
            ancestors: 4,
            total: 32,
            skipped_lines,
        }
    }

    #[test]
    fn solve_args_parse_target() {
        let parsed = Wrapper::parse_from(["test", "rules.txt", "--target", "dark olive"]);
        assert_eq!(parsed.args.input.rules.to_str(), Some("rules.txt"));
        assert_eq!(parsed.args.target.target.as_deref(), Some("dark olive"));
    }

    #[test]
    fn solve_args_target_is_optional() {
        let parsed = Wrapper::parse_from(["test", "-"]);
        assert!(parsed.args.target.target.is_none());
    }

    #[test]
    fn text_prints_both_answers() {
        let mut out = Vec::new();
        render_solve_text(&payload(0), &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "4\n32\n");
    }

    #[test]
    fn pretty_mentions_skipped_lines_only_when_present() {
        let mut clean = Vec::new();
        render_solve_pretty(&payload(0), &mut clean).expect("render");
        let clean = String::from_utf8(clean).expect("utf8");
        assert!(clean.starts_with("Bag: shiny gold\n"));
        assert!(!clean.contains("Skipped"));

        let mut lenient = Vec::new();
        render_solve_pretty(&payload(2), &mut lenient).expect("render");
        assert!(String::from_utf8(lenient).expect("utf8").contains("2 malformed lines"));
    }

    #[test]
    fn json_omits_zero_skipped() {
        let json = serde_json::to_value(payload(0)).expect("serialize");
        assert_eq!(json["ancestors"], 4);
        assert_eq!(json["total"], 32);
        assert!(json.get("skipped_lines").is_none());
    }
}
