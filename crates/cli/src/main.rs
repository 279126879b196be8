mod echo;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use trailmark_core::{
    BatchConfig, BatchDriver, Document, FetchConfig, ListingRow, Pipeline, PipelineConfig, extract_listing,
    fetch_file, fetch_stdin, fetch_url, load_urls, prioritize, select_popular,
};
use url::Url;

use crate::echo::{format_size, print_banner, print_field, print_info, print_record_details, print_report, print_step, print_success};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Turn walking-route pages into normalized walk records
#[derive(Parser, Debug)]
#[command(name = "trailmark")]
#[command(version)]
#[command(about = "Turn walking-route pages into normalized walk records", long_about = None)]
struct Cli {
    /// Seed for coordinate jitter and sampled values
    #[arg(long, global = true, value_name = "N")]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract one walk page into a record
    Page {
        /// URL to fetch, local HTML file, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Source URL for file or stdin input; sets the region
        #[arg(long, value_name = "URL")]
        source_url: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// HTTP timeout in seconds
        #[arg(long, default_value = "15", value_name = "SECS")]
        timeout: u64,

        /// Custom User-Agent for HTTP requests
        #[arg(long, value_name = "UA")]
        user_agent: Option<String>,
    },

    /// Convert listing rows JSON into records
    Convert {
        /// Listing rows JSON file, or "-" for stdin
        #[arg(value_name = "ROWS")]
        rows: String,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Extract walk rows from a region listing page
    Listing {
        /// URL to fetch, local HTML file, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Source-site region key, e.g. skye
        #[arg(long, value_name = "KEY")]
        region: String,

        /// Keep only the N easiest, shortest walks
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Fetch and process walk pages in paced batches
    Crawl {
        /// Listing rows JSON file with source_url fields
        #[arg(value_name = "URLS")]
        urls: PathBuf,

        /// Fetch URLs matching priority keywords first
        #[arg(long)]
        priority: bool,

        /// Index of the first URL to process
        #[arg(long, default_value = "0", value_name = "N")]
        start: usize,

        /// URLs per checkpointed batch
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,

        /// Pause between requests in seconds
        #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
        delay: Option<f64>,

        /// Batch config JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Generate shell completion script
    Completions {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

fn parse_seconds(value: &str) -> Result<f64, String> {
    let secs: f64 = value.parse().map_err(|_| format!("`{}` is not a number", value))?;
    if secs.is_finite() && secs >= 0.0 {
        Ok(secs)
    } else {
        Err("must be a finite, non-negative number of seconds".to_string())
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn is_http(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Reads HTML from a URL, a file, or stdin ("-").
async fn read_input(input: &str, fetch: &FetchConfig, verbose: bool) -> anyhow::Result<String> {
    let content = if input == "-" {
        if verbose {
            print_step(1, 3, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else if is_http(input) {
        if verbose {
            print_step(1, 3, &format!("Fetching from {}", input.bright_white().underline()));
        }
        fetch_url(input, fetch).await.context("Failed to fetch URL")?
    } else {
        if verbose {
            print_step(1, 3, &format!("Reading from file {}", input.bright_white()));
        }
        fetch_file(input).with_context(|| format!("Failed to read file: {}", input))?
    };

    if verbose {
        print_field("Size", &format_size(content.len()));
        eprintln!();
    }
    Ok(content)
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    json.context("Failed to serialize JSON")
}

fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn pipeline_config(seed: Option<u64>) -> PipelineConfig {
    let builder = PipelineConfig::builder();
    match seed {
        Some(seed) => builder.seed(seed).build(),
        None => builder.build(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let mut pipeline = Pipeline::new(pipeline_config(cli.seed));

    match cli.command {
        Commands::Page { input, source_url, output, timeout, user_agent } => {
            let fetch = FetchConfig { timeout, user_agent: user_agent.unwrap_or_else(|| FetchConfig::default().user_agent) };
            let html = read_input(&input, &fetch, cli.verbose).await?;

            if cli.verbose {
                print_step(2, 3, "Extracting walk");
            }
            let source_url = source_url.unwrap_or_else(|| if is_http(&input) { input.clone() } else { String::new() });
            let doc = Document::parse(&html).context("Failed to parse HTML")?;
            let record = pipeline.process_page(&doc, &source_url);

            if cli.verbose {
                print_record_details(&record);
                print_step(3, 3, "Writing output");
            }
            write_output(output.as_deref(), &to_json(&record, cli.pretty)?)?;
        }
        Commands::Convert { rows, output } => {
            let raw = if rows == "-" {
                fetch_stdin().context("Failed to read from stdin")?
            } else {
                fetch_file(&rows).with_context(|| format!("Failed to read file: {}", rows))?
            };
            let rows: Vec<ListingRow> = serde_json::from_str(&raw).context("Failed to parse listing rows")?;

            if cli.verbose {
                print_step(1, 2, &format!("Converting {} rows", rows.len()));
            }
            let report = pipeline.process_rows(rows);
            print_report(&report);

            if cli.verbose {
                print_step(2, 2, "Writing output");
            }
            write_output(output.as_deref(), &to_json(&report.records, cli.pretty)?)?;
        }
        Commands::Listing { input, region, limit, output } => {
            let html = read_input(&input, &FetchConfig::default(), cli.verbose).await?;

            if cli.verbose {
                print_step(2, 3, &format!("Reading walks for region {}", region.bright_white()));
            }
            let doc = Document::parse(&html).context("Failed to parse HTML")?;
            let mut rows = extract_listing(&doc, &region);
            if let Some(limit) = limit {
                rows = select_popular(rows, limit);
            }

            if cli.verbose {
                print_field("Walks", &rows.len().to_string());
                print_step(3, 3, "Writing output");
            }
            write_output(output.as_deref(), &to_json(&rows, cli.pretty)?)?;
        }
        Commands::Crawl { urls, priority, start, batch_size, delay, config, output } => {
            let mut batch_config = match config {
                Some(path) => BatchConfig::load(&path).context("Failed to load batch config")?,
                None => BatchConfig::discover().context("Failed to load batch config")?,
            };
            if let Some(batch_size) = batch_size {
                batch_config.batch_size = batch_size.max(1);
            }
            if let Some(delay) = delay {
                batch_config.request_delay_secs = delay;
            }
            batch_config.validate().context("Invalid batch config")?;

            let mut urls = load_urls(&urls).context("Failed to read URL list")?;
            if priority {
                urls = prioritize(urls, &batch_config);
            }
            if cli.verbose {
                print_step(1, 2, &format!("Crawling {} URLs from index {}", urls.len(), start));
            }

            let mut driver = BatchDriver::new(batch_config, pipeline);
            let report = driver.run(&urls, start).await.context("Batch run failed")?;
            print_report(&report);

            if cli.verbose {
                print_step(2, 2, "Writing output");
            }
            write_output(output.as_deref(), &to_json(&report.records, cli.pretty)?)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "trailmark", &mut io::stdout());
        }
    }

    Ok(())
}
