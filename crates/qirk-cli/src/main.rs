//! qirk Command-Line Interface
//!
//! Build, load, verify and evaluate QIR programs.
//!
//! ```text
//! qirk generate bell -o bell.ll
//! qirk verify bell.ll
//! qirk eval bell.ll --results 10
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::eval::OutputFormat;
use commands::generate::Program;
use commands::{eval, fmt, generate, verify, version};
use config::Config;

/// qirk - QIR builder, loader and non-adaptive evaluator
#[derive(Parser)]
#[command(name = "qirk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a QIR program and print its gate log
    Eval {
        /// Input file (.ll)
        input: PathBuf,

        /// Function to evaluate instead of the module's entry point
        #[arg(short, long)]
        entry_point: Option<String>,

        /// Measurement outcomes, as bits (1011) or a list (true,false)
        #[arg(short, long)]
        results: Option<String>,

        /// Stop after this many executed instructions
        #[arg(long)]
        max_steps: Option<u64>,

        /// Maximum nesting of calls to defined functions
        #[arg(long)]
        max_call_depth: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Load and verify a QIR program
    Verify {
        /// Input file (.ll)
        input: PathBuf,
    },

    /// Re-emit a QIR program in canonical form
    Fmt {
        /// Input file (.ll)
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a demo QIR program
    Generate {
        /// Program to build
        #[arg(value_enum)]
        program: Program,

        /// Query register size (bernstein-vazirani)
        #[arg(short, long)]
        qubits: Option<u64>,

        /// Hidden bit pattern, little-endian (bernstein-vazirani)
        #[arg(short, long)]
        pattern: Option<u64>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    // Setup logging
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Eval {
            input,
            entry_point,
            results,
            max_steps,
            max_call_depth,
            format,
        } => {
            if entry_point.is_some() {
                config.eval.entry_point = entry_point;
            }
            if max_steps.is_some() {
                config.eval.limits.max_steps = max_steps;
            }
            if let Some(depth) = max_call_depth {
                config.eval.limits.max_call_depth = depth;
            }
            config
                .validate()
                .map_err(anyhow::Error::from)
                .and_then(|()| eval::execute(&input, &config.eval, results.as_deref(), format))
        }

        Commands::Verify { input } => verify::execute(&input),

        Commands::Fmt { input, output } => fmt::execute(&input, output.as_deref()),

        Commands::Generate {
            program,
            qubits,
            pattern,
            output,
        } => generate::execute(program, qubits, pattern, output.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
