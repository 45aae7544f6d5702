//! CLI entrypoint for `cmplist`.
//!
//! Parses command-line arguments, validates that both input files exist,
//! classifies every distinct line through the library engine, then prints the
//! sorted results in the requested format with optional statistics and timing.
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use cmplist::{
    config::{Config, default_workers},
    engine::Classifier,
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    report::{OutputFormat, render, render_stats},
    stats::Stats,
};
use log::{LevelFilter, error};

const AFTER_HELP: &str = "\
Output formats:
  csv   - Output in CSV format (default)
  table - Output in table format
  json  - Output in JSON format

Status codes (ungrouped csv, json):
  1  Only in FILE1
  2  In both files
  3  Only in FILE2

Examples:
  cmplist -1 list1.txt -2 list2.txt --stats
  cmplist -1 list1.txt -2 list2.txt --format table --group";

#[derive(Parser, Debug)]
#[command(
    name = "cmplist",
    version,
    about = "Compares two files and reports which lines are only in the first, in both, or only in the second",
    after_help = AFTER_HELP
)]
struct Args {
    /// First file to compare
    #[arg(short = '1', long = "file1")]
    file1: PathBuf,

    /// Second file to compare
    #[arg(short = '2', long = "file2")]
    file2: PathBuf,

    /// Enable color output (true/false)
    #[arg(
        long = "color",
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    color: bool,

    /// Show statistics
    #[arg(long = "stats")]
    stats: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// Group output by category
    #[arg(short = 'g', long = "group")]
    group: bool,

    /// Number of workers deduplicating each file
    #[arg(short = 'w', long = "workers", default_value_t = default_workers())]
    workers: usize,

    /// Show per-file progress and total processing time
    #[arg(short = 'p', long = "progress")]
    progress: bool,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Table,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            file1: self.file1,
            file2: self.file2,
            color: self.color,
            stats: self.stats,
            format: self.format.into(),
            group: self.group,
            progress: self.progress,
            workers: self.workers,
            mmap_threshold: self.mmap_threshold,
        }
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    let config = args.into_config();
    // Color stays automatic (terminal detection) unless explicitly disabled
    if !config.color {
        colored::control::set_override(false);
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(2);
    }

    let started = Instant::now();
    let mut classifier = Classifier::new();
    if let Err(e) = classifier.load_from_file_paths_with_options(
        &config.file1,
        &config.file2,
        &config.load_options(),
    ) {
        error!("{}", e);
        std::process::exit(3);
    }
    let elapsed = started.elapsed();

    let results = classifier.results();
    let stats = Stats::from_results(&results);
    let rendered = match render(&results, &stats, &config.render_options()) {
        Ok(out) => out,
        Err(e) => {
            error!("failed to render results: {}", e);
            std::process::exit(4);
        }
    };
    print!("{}", rendered);

    if config.stats {
        print!("{}", render_stats(&stats, config.color));
    }
    if config.progress {
        println!("\nProcessing time: {:?}", elapsed);
    }
}
