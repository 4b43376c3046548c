#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use haversack_core::config::{discover_config, resolve_output};
use haversack_core::rules::MalformedPolicy;
use output::{CliError, OutputMode, render_error};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "hs",
    author,
    version,
    about = "haversack: bag containment rules solver",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to load instead of ./haversack.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skip malformed rule lines instead of failing.
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Output mode to use before the config file has been read.
    const fn fallback_output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Count a bag's containers and its total contents",
        long_about = "Report how many bag colors can eventually hold the target, and how many bags the target must hold.",
        after_help = "EXAMPLES:\n    # Solve for shiny gold\n    hs solve rules.txt\n\n    # Read rules from stdin, another target\n    cat rules.txt | hs solve - --target \"dark olive\""
    )]
    Solve(cmd::solve::SolveArgs),

    #[command(
        about = "List bag colors that can eventually hold the target",
        after_help = "EXAMPLES:\n    # Count containers\n    hs ancestors rules.txt\n\n    # Print each color\n    hs ancestors rules.txt --list"
    )]
    Ancestors(cmd::ancestors::AncestorsArgs),

    #[command(
        about = "Count the bags the target must hold",
        after_help = "EXAMPLES:\n    hs total rules.txt --target \"shiny gold\" --json"
    )]
    Total(cmd::total::TotalArgs),

    #[command(
        about = "List containment cycles",
        long_about = "List strongly connected groups of bags that hold each other. Totals are undefined for bags that reach a cycle."
    )]
    Cycles(cmd::cycles::CyclesArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HAVERSACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "hs=debug,haversack_core=debug,info"
        } else {
            "hs=info,haversack_core=warn,warn"
        })
    });

    let format = env::var("HAVERSACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for answers.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn build_context(cli: &Cli) -> anyhow::Result<cmd::Context> {
    let project_root = env::current_dir()?;
    let config = discover_config(&project_root, cli.config.as_deref())?;

    let env_format = env::var("HAVERSACK_FORMAT").ok();
    let mode = resolve_output(
        cli.json,
        config.output.format.as_deref(),
        env_format.as_deref(),
    );

    let policy = if cli.lenient {
        MalformedPolicy::Skip
    } else {
        config.parse.on_malformed
    };
    debug!(output = mode, ?policy, target = %config.query.target, "resolved settings");

    Ok(cmd::Context {
        output: OutputMode::from_name(mode),
        policy,
        config,
    })
}

fn run(cli: &Cli, ctx: &cmd::Context) -> anyhow::Result<()> {
    match cli.command {
        Commands::Solve(ref args) => cmd::solve::run_solve(args, ctx),
        Commands::Ancestors(ref args) => cmd::ancestors::run_ancestors(args, ctx),
        Commands::Total(ref args) => cmd::total::run_total(args, ctx),
        Commands::Cycles(ref args) => cmd::cycles::run_cycles(args, ctx),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let (output, result) = match build_context(&cli) {
        Ok(ctx) => (ctx.output, run(&cli, &ctx)),
        Err(err) => (cli.fallback_output_mode(), Err(err)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Nothing more useful to do if stderr itself is gone.
            let _ = render_error(output, &CliError::from(&err));
            ExitCode::FAILURE
        }
    }
}
