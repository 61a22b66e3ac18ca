//! # CLI Module
//!
//! Command-line driver for the signer pipeline.
//!
//! ## Usage
//! ```bash
//! # Sign items given on the command line
//! signer sign 0 1 1 2 3 5 8
//!
//! # Sign the numbers 0..100 with a costly slow digest
//! signer sign --count 100 --slow-delay-ms 10
//!
//! # Items from a file, one per line, JSON output
//! signer sign --input items.txt --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use signer_pipeline::core::digest::DigestKind;
use signer_pipeline::core::signer::{SignatureReport, SignerConfig};
use signer_pipeline::error::{ConfigError, Result, SignerError};
use signer_pipeline::events::{Event, EventChannel, PipelineEvent, StageEvent};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Signer - hash items through a concurrent three-stage pipeline
#[derive(Parser, Debug)]
#[command(name = "signer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a set of items and print the combined result
    Sign {
        /// Items to sign
        items: Vec<String>,

        /// Read items from a file, one per line
        #[arg(short, long, conflicts_with = "count")]
        input: Option<PathBuf>,

        /// Sign the numbers 0..COUNT
        #[arg(short, long)]
        count: Option<u64>,

        /// Fast digest
        #[arg(long, default_value = "crc32")]
        fast: Digest,

        /// Slow (serialized) digest
        #[arg(long, default_value = "md5")]
        slow: Digest,

        /// Artificial cost of each fast call, in milliseconds
        #[arg(long, default_value = "0")]
        fast_delay_ms: u64,

        /// Artificial cost of each slow call, in milliseconds
        #[arg(long, default_value = "0")]
        slow_delay_ms: u64,

        /// Slot worker threads (default: one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output (stage timings, slow-call contention)
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Digest {
    /// CRC-32, printed as a decimal number
    Crc32,
    /// MD5, printed as hex
    Md5,
}

impl From<Digest> for DigestKind {
    fn from(digest: Digest) -> Self {
        match digest {
            Digest::Crc32 => DigestKind::Crc32,
            Digest::Md5 => DigestKind::Md5,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// The signature only
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sign {
            items,
            input,
            count,
            fast,
            slow,
            fast_delay_ms,
            slow_delay_ms,
            workers,
            output,
            verbose,
        } => {
            let items = collect_items(items, input.as_deref(), count)?;

            let mut config = SignerConfig::new()
                .fast(fast.into())
                .slow(slow.into())
                .fast_latency(Duration::from_millis(fast_delay_ms))
                .slow_latency(Duration::from_millis(slow_delay_ms))
                .probe_slow(verbose);
            if let Some(workers) = workers {
                config = config.worker_threads(workers);
            }

            run_sign(items, config, output, verbose)
        }
    }
}

/// Gather items from arguments, a file, or a numeric range
fn collect_items(
    args: Vec<String>,
    input: Option<&Path>,
    count: Option<u64>,
) -> Result<Vec<String>> {
    let mut items = args;

    if let Some(path) = input {
        let contents = std::fs::read_to_string(path).map_err(|source| SignerError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        items.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    if let Some(count) = count {
        items.extend((0..count).map(|n| n.to_string()));
    }

    if let Some(empty) = items.iter().find(|item| item.trim().is_empty()) {
        return Err(ConfigError::InvalidItem {
            value: empty.clone(),
        }
        .into());
    }

    Ok(items)
}

fn run_sign(
    items: Vec<String>,
    config: SignerConfig,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Signer").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let signer = config.build()?;
    let stage_count = signer.pipeline().stage_names().len();

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(stage_count as u64);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} stages {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Stage(StageEvent::Started { name, .. }) => {
                    pb.set_message(name);
                }
                Event::Stage(StageEvent::Completed(_)) => {
                    pb.inc(1);
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Failed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = signer.sign_with_events(&items, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let report = result?;

    match output {
        OutputFormat::Pretty => print_pretty_report(&term, &report, verbose),
        OutputFormat::Json => print_json_report(&report),
        OutputFormat::Minimal => println!("{}", report.signature),
    }

    Ok(())
}

fn print_pretty_report(term: &Term, report: &SignatureReport, verbose: bool) {
    term.write_line(&format!("{} Signing Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} items signed in {:.3}s",
        style(report.items_in).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();

    if verbose {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Stages:").bold().underlined()))
            .ok();
        for stage in &report.stages {
            term.write_line(&format!(
                "  {} {:<16} {} items, {}ms",
                style(format!("#{}", stage.index)).dim(),
                stage.name,
                style(stage.items_emitted).cyan(),
                stage.duration_ms
            ))
            .ok();
        }

        if let Some(probe) = report.probe {
            let peak = if probe.peak_concurrency <= 1 {
                style(probe.peak_concurrency).green()
            } else {
                style(probe.peak_concurrency).red()
            };
            term.write_line(&format!(
                "  slow calls: {}, peak concurrency: {}",
                style(probe.calls).cyan(),
                peak
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    println!("{}", report.signature);
}

fn print_json_report(report: &SignatureReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize report: {e}"),
    }
}
