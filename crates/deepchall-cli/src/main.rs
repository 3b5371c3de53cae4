//! Deepchall CLI - benchmark sequence models against formal languages.
//!
//! Languages are defined by automata or grammars; models are trained on
//! samples drawn from them and scored on how many of their own outputs the
//! language accepts.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use deepchall_ops::Registry;
use tracing::Level;

mod commands;

use commands::{run, sample, show};

/// Deepchall CLI - formal-language challenges for sequence models.
///
/// Use `deepchall show langs` to see what can be sampled and
/// `deepchall run <config>` to benchmark nets against languages.
#[derive(Parser, Debug)]
#[command(
    name = "deepchall",
    author,
    version,
    about = "Deepchall: benchmark sequence models on formal languages",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered backends, languages or nets.
    #[command(subcommand)]
    Show(ShowCommands),

    /// Print samples generated by a language.
    Sample {
        /// Language preset name.
        lang: String,

        /// Number of samples to print.
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Skip samples longer than this.
        #[arg(long)]
        max_length: Option<usize>,

        /// Override a language parameter (can be specified multiple times).
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Print the backend as a Graphviz DOT graph instead of samples.
        #[arg(long)]
        dot: bool,
    },

    /// Run a benchmark described by a JSON configuration file.
    Run {
        /// Path to the run configuration.
        config: PathBuf,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// What to list.
#[derive(Subcommand, Debug)]
enum ShowCommands {
    /// Backend kinds.
    Backends,

    /// Language presets and their parameters.
    Langs,

    /// Nets and their parameters.
    Nets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN // Default to less noise
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = Registry::builtin();

    match cli.command {
        Commands::Show(what) => match what {
            ShowCommands::Backends => show::backends(&registry),
            ShowCommands::Langs => show::langs(&registry),
            ShowCommands::Nets => show::nets(&registry),
        },

        Commands::Sample {
            lang,
            count,
            max_length,
            set,
            dot,
        } => {
            let options = sample::SampleOptions {
                count,
                max_length,
                overrides: set,
                dot,
            };
            sample::execute(&registry, &lang, &options)?;
        }

        Commands::Run { config, json } => {
            run::execute(&registry, &config, json)?;
        }
    }

    Ok(())
}
