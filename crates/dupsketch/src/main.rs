//! dupsketch CLI - near-duplicate filtering for text datasets.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use dupsketch::{
    deduplicate_with_progress, read_documents, write_lines, Document, InputFormat,
    SimilarityConfig, SimilarityIndex,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// JSON output for dedup results.
#[derive(Serialize)]
struct JsonOutput {
    input: String,
    output: Option<String>,
    total_documents: usize,
    unique_documents: usize,
    duplicates: usize,
    duplicate_ratio: f64,
    comparisons: u64,
    elapsed_secs: f64,
    throughput_docs_s: f64,
}

/// File format for input.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Format {
    /// Auto-detect from file extension
    Auto,
    /// One document per line
    Lines,
    /// JSON Lines format
    Jsonl,
}

/// Near-duplicate document filtering with MinHash and LSH.
///
/// Keeps the first document of every group of near-duplicates.
/// Reads plain text (one document per line) or JSONL.
#[derive(Parser, Debug)]
#[command(name = "dupsketch")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (text or JSONL).
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file path. Kept documents are written in the input format.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// JSONL field containing the text to deduplicate.
    #[arg(short = 'f', long, default_value = "text")]
    field: String,

    /// Input format (auto-detect from file extension by default).
    #[arg(long, value_enum, default_value = "auto")]
    format: Format,

    /// TOML configuration file. Flags below override its values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Similarity threshold (0.0-1.0) [default: 0.8].
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Tokens per shingle [default: 5].
    #[arg(short = 'k', long)]
    tokens_in_word: Option<usize>,

    /// Number of hash functions; must equal bands * rows [default: 400].
    #[arg(short = 'n', long)]
    hash_functions: Option<usize>,

    /// Number of LSH bands [default: 20].
    #[arg(long)]
    bands: Option<usize>,

    /// Rows per band [default: 20].
    #[arg(long)]
    rows: Option<usize>,

    /// Seed for the hash functions [default: 42].
    #[arg(long)]
    seed: Option<u64>,

    /// Print statistics only, don't write output.
    #[arg(long)]
    stats_only: bool,

    /// Output results as JSON.
    #[arg(long)]
    json: bool,

    /// Show progress bar.
    #[arg(long)]
    progress: bool,

    /// Verbose output (debug logging unless RUST_LOG is set).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "dupsketch=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Create a progress bar for determinate progress.
fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb
}

/// Determine the effective format for a file path.
fn detect_format(path: &Path, explicit_format: Format) -> InputFormat {
    match explicit_format {
        Format::Auto => InputFormat::from_path(path),
        Format::Lines => InputFormat::Lines,
        Format::Jsonl => InputFormat::Jsonl,
    }
}

/// Merge the optional config file with explicit flags.
fn build_config(args: &Cli) -> Result<SimilarityConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SimilarityConfig::from_toml_file(path)?,
        None => SimilarityConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(tokens_in_word) = args.tokens_in_word {
        config.tokens_in_word = tokens_in_word;
    }
    if let Some(bands) = args.bands {
        config.bands = bands;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    match args.hash_functions {
        Some(n) => config.num_hash_functions = n,
        // A new band layout without an explicit sketch length implies bands * rows.
        None if args.bands.is_some() || args.rows.is_some() => {
            config.num_hash_functions = config.bands.saturating_mul(config.rows);
        }
        None => {}
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Cli) -> Result<(), Box<dyn Error>> {
    let input = args.input.as_ref().ok_or("Input file is required")?;

    let output = match (&args.output, args.stats_only) {
        (_, true) => None,
        (Some(path), false) => Some(path),
        (None, false) => {
            return Err("output file required (use -o/--output or --stats-only)".into());
        }
    };

    let config = build_config(args)?;
    let format = detect_format(input, args.format);

    if args.verbose && !args.json {
        eprintln!("Reading {} ({:?})...", input.display(), format);
        eprintln!(
            "  threshold={} tokens_in_word={} hash_functions={} bands={} rows={}",
            config.threshold,
            config.tokens_in_word,
            config.num_hash_functions,
            config.bands,
            config.rows
        );
    }

    let (docs, lines): (Vec<Document>, Vec<String>) =
        read_documents(input, format, &args.field)?.into_iter().unzip();

    let mut index = SimilarityIndex::from_config(&config)?;

    let pb = if args.progress && !args.json {
        Some(create_progress_bar(docs.len() as u64, "deduplicating"))
    } else {
        None
    };

    let result = deduplicate_with_progress(&mut index, &docs, |n| {
        if let Some(pb) = &pb {
            pb.set_position(n as u64);
        }
    });

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if let Some(path) = output {
        let kept: Vec<&String> = result.keep_indices.iter().map(|&i| &lines[i]).collect();
        write_lines(path, &kept)?;
    }

    let stats = &result.stats;
    if args.json {
        let report = JsonOutput {
            input: input.display().to_string(),
            output: output.map(|p| p.display().to_string()),
            total_documents: stats.total_documents,
            unique_documents: stats.unique_documents,
            duplicates: stats.duplicate_count,
            duplicate_ratio: stats.duplicate_ratio,
            comparisons: stats.comparisons,
            elapsed_secs: stats.elapsed_secs,
            throughput_docs_s: stats.throughput(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!();
        eprintln!("Deduplication Results:");
        eprintln!("  Total documents:   {}", stats.total_documents);
        eprintln!("  Unique documents:  {}", stats.unique_documents);
        eprintln!("  Duplicates found:  {}", stats.duplicate_count);
        eprintln!("  Duplicate ratio:   {:.2}%", stats.duplicate_ratio * 100.0);
        eprintln!("  Comparisons:       {}", stats.comparisons);
        eprintln!();
        eprintln!("Performance:");
        eprintln!("  Processing time:   {:.3}s", stats.elapsed_secs);
        eprintln!("  Throughput:        {:.0} docs/sec", stats.throughput());

        if let Some(path) = output {
            eprintln!();
            eprintln!(
                "Wrote {} documents to {}",
                stats.unique_documents,
                path.display()
            );
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        generate(shell, &mut Cli::command(), "dupsketch", &mut io::stdout());
        return;
    }

    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
