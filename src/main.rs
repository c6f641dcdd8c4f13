//! # Condense CLI (`condense`)
//!
//! Summarize long text from a file or stdin, inspect how it would be
//! chunked, or serve the same pipeline over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! condense --config ./config/condense.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `condense summarize [FILE]` | Summarize a file or stdin |
//! | `condense chunk [FILE]` | Show how the text would be chunked |
//! | `condense stats [FILE]` | Character/word counts and time estimate |
//! | `condense presets` | List density presets |
//! | `condense serve` | Start the HTTP server |
//! | `condense completions <SHELL>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # Summarize a report with the detailed preset
//! condense summarize report.txt --density detailed
//!
//! # Pipe text in, get the full report as JSON
//! pbpaste | condense summarize --json
//!
//! # Save the summary to a file
//! condense summarize report.txt --output summary.txt --header
//! ```

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use condense::config::{self, Config, Density};
use condense::progress::ProgressMode;
use condense::stats::{print_stats, TextStats};
use condense::summarize::SummaryService;
use condense::{export, server};
use condense_core::chunk::chunk_text;
use condense_core::SummarizeError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "./config/condense.toml";

/// Condense: summarize long documents with a bounded-input model.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/condense.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "condense",
    about = "Summarize long documents with a bounded-input model",
    version,
    long_about = "Condense splits long text into paragraph-preserving chunks, summarizes \
    each chunk in order with a text-generation model, and joins the partial summaries. \
    Short text is summarized in a single call."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/condense.toml`; built-in defaults are used when
    /// that file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress details to stderr (`RUST_LOG` takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a file, or stdin when FILE is omitted or `-`.
    Summarize {
        file: Option<PathBuf>,

        /// Summary length preset. Defaults to `[presets].default`.
        #[arg(long, value_enum)]
        density: Option<Density>,

        /// Also write the summary to this file.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Prefix the written file with model and density details.
        #[arg(long, requires = "output")]
        header: bool,

        /// Print the full report as JSON instead of the summary text.
        #[arg(long)]
        json: bool,

        /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,

        /// Print input statistics before the summary.
        #[arg(long)]
        stats: bool,
    },

    /// Show how a file (or stdin) would be chunked.
    Chunk {
        file: Option<PathBuf>,

        /// Override `[chunking].max_chunk_size`.
        #[arg(long)]
        max_chunk_size: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print character and word counts and a processing-time estimate.
    Stats { file: Option<PathBuf> },

    /// List the density presets.
    Presets,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "condense", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = match &cli.config {
        Some(path) => config::load_config_or_default(path, true)?,
        None => config::load_config_or_default(Path::new(DEFAULT_CONFIG_PATH), false)?,
    };

    match cli.command {
        Commands::Summarize {
            file,
            density,
            output,
            header,
            json,
            progress,
            stats,
        } => {
            let text = read_input(file.as_deref())?;
            if stats && !json {
                print_stats(&TextStats::of(&text), cfg.input.recommended_chars);
                println!();
            }
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            let code = run_summarize(cfg, &text, density, output, header, json, mode).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Chunk {
            file,
            max_chunk_size,
            json,
        } => {
            let text = read_input(file.as_deref())?;
            let max = max_chunk_size.unwrap_or(cfg.chunking.max_chunk_size);
            if max == 0 {
                bail!("--max-chunk-size must be > 0");
            }
            let chunks = chunk_text(&text, max);
            if json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
            } else {
                for chunk in &chunks {
                    println!("--- chunk {} ({} chars) ---", chunk.index, chunk.size());
                    println!("{}", chunk.text);
                }
                println!("{} chunk(s), max {} chars", chunks.len(), max);
            }
        }
        Commands::Stats { file } => {
            let text = read_input(file.as_deref())?;
            print_stats(&TextStats::of(&text), cfg.input.recommended_chars);
        }
        Commands::Presets => {
            for density in Density::ALL {
                let p = cfg.presets.params(density);
                let marker = if density == cfg.presets.default {
                    "  (default)"
                } else {
                    ""
                };
                println!(
                    "{:<10} max_length={:<4} min_length={}{}",
                    density.as_str(),
                    p.max_length,
                    p.min_length,
                    marker
                );
            }
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read FILE, or stdin when FILE is omitted or `-`.
fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Run one summarization. Returns the process exit code; summarization
/// failures are printed as plain text rather than propagated.
async fn run_summarize(
    cfg: Config,
    text: &str,
    density: Option<Density>,
    output: Option<PathBuf>,
    header: bool,
    json: bool,
    mode: ProgressMode,
) -> anyhow::Result<i32> {
    let service = SummaryService::new(cfg);

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&flag) {
                Interrupt::Cancel => {
                    eprintln!("cancelling after the current chunk (Ctrl-C again to quit)...")
                }
                Interrupt::Exit => std::process::exit(130),
            }
        }
    });

    let reporter = mode.reporter();
    let report = match service
        .summarize(text, density, reporter.as_ref(), Some(cancel.as_ref()))
        .await
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_code(&e));
        }
    };

    if let Some(path) = &output {
        export::write_summary(path, &report, header)?;
        eprintln!("Saved summary to {}", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary);
    }

    Ok(0)
}

fn exit_code(err: &SummarizeError) -> i32 {
    match err {
        SummarizeError::InvalidInput(_) => 2,
        SummarizeError::Cancelled { .. } => 130,
        _ => 1,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// First Ctrl-C: stop at the next chunk boundary.
    Cancel,
    /// Ctrl-C while already cancelling: a model call may never return.
    Exit,
}

fn on_interrupt(cancel: &AtomicBool) -> Interrupt {
    if cancel.swap(true, Ordering::SeqCst) {
        Interrupt::Exit
    } else {
        Interrupt::Cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_interrupt_exits() {
        let cancel = AtomicBool::new(false);
        assert_eq!(on_interrupt(&cancel), Interrupt::Cancel);
        assert!(cancel.load(Ordering::SeqCst));
        assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(&SummarizeError::Cancelled { completed: 1, total: 3 }), 130);
        assert_eq!(exit_code(&SummarizeError::AllChunksFailed { chunks: 2 }), 1);
    }
}
