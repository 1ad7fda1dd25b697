//! shimcall command-line harness
//!
//! Times compiled shims against reflective and direct calls on a demo type,
//! prints the call plan the compiler builds for a member, and lists the demo
//! type's members.

mod commands;
mod demo;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

use commands::bench::BenchKind;
use commands::plan::TierArg;

#[derive(Parser)]
#[command(name = "shimcall")]
#[command(about = "Compiled late-bound invocation harness", long_about = None)]
#[command(version)]
struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time shims against reflection and direct calls
    Bench {
        /// Member kinds to measure (all when omitted)
        #[arg(short, long, value_enum)]
        kind: Vec<BenchKind>,
        /// Calls per strategy
        #[arg(short = 'n', long, default_value_t = 100_000)]
        iterations: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the call plan for a member of the demo type
    Plan {
        /// `new`, `get:<property>`, `set:<property>` or a method name
        member: String,
        /// Shim tier to plan for
        #[arg(short, long, value_enum, default_value_t = TierArg::Untyped)]
        tier: TierArg,
        /// Plan the by-ref variant
        #[arg(long)]
        by_ref: bool,
        /// Pick a method overload by parameter count
        #[arg(long)]
        arity: Option<usize>,
    },

    /// List the members of the demo type
    Members,
}

struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(&self, _w: &mut Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

/// Install a subscriber when `SHIMCALL_LOG` is set.
///
/// `SHIMCALL_LOG_STYLE=full` adds timestamps; the default is compact.
fn init_tracing() {
    let Ok(filter) = EnvFilter::try_from_env("SHIMCALL_LOG") else {
        return;
    };
    let style = std::env::var("SHIMCALL_LOG_STYLE").unwrap_or_default();
    if style == "full" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_timer(NoTimestamp)
            .with_writer(std::io::stderr)
            .init();
    }
    tracing::debug!("tracing initialized");
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let choice = output::resolve_color_choice(cli.color.as_deref());

    match cli.command {
        Commands::Bench {
            kind,
            iterations,
            json,
        } => commands::bench::execute(&kind, iterations, json, choice),
        Commands::Plan {
            member,
            tier,
            by_ref,
            arity,
        } => commands::plan::execute(&member, tier, by_ref, arity, choice),
        Commands::Members => commands::members::execute(choice),
    }
}
