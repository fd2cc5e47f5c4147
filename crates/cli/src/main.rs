use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use loctext_core::{Extraction, FetchConfig, FullTextFetcher, Record, ReqwestTransport};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetch the OCR full text of Library of Congress items
#[derive(Parser, Debug)]
#[command(name = "loctext")]
#[command(version)]
#[command(about = "Fetch the OCR full text of Library of Congress items", long_about = None)]
struct Args {
    /// Item URL, record JSON file, or "-" for a record on stdin
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<String>,

    /// Look item URLs up through the JSON item API instead of the item page
    #[arg(long)]
    api: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum pause before every request, in milliseconds
    #[arg(long, default_value = "300", value_name = "MS")]
    min_interval_ms: u64,

    /// Retries for throttled or failing requests
    #[arg(long, default_value = "3", value_name = "NUM")]
    max_retries: u32,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where the record or page to resolve comes from
#[derive(Debug)]
enum Input {
    Url(Url),
    Stdin,
    File(PathBuf),
}

impl Input {
    fn from_arg(arg: &str) -> Self {
        match Url::parse(arg) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ if arg == "-" => Self::Stdin,
            _ => Self::File(PathBuf::from(arg)),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "loctext_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn fetch_config(args: &Args) -> FetchConfig {
    let builder = FetchConfig::builder()
        .timeout(args.timeout)
        .min_interval(Duration::from_millis(args.min_interval_ms))
        .max_retries(args.max_retries);

    let builder = match &args.user_agent {
        Some(user_agent) => builder.user_agent(user_agent.clone()),
        None => builder,
    };
    builder.build()
}

fn read_record(input: &Input) -> anyhow::Result<Record> {
    let json = match input {
        Input::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
        Input::File(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?
        }
        Input::Url(url) => anyhow::bail!("{url} is not a record file"),
    };

    Record::from_json(&json).context("Failed to decode record")
}

async fn resolve(
    fetcher: &FullTextFetcher<ReqwestTransport>, input: &Input, api: bool,
) -> anyhow::Result<(String, Extraction)> {
    match input {
        Input::Url(url) if api => {
            let record = fetcher
                .record_from_item_url(url.as_str())
                .await
                .context("Failed to fetch item record")?;
            let report = fetcher
                .full_text_report(&record)
                .await
                .context("Failed to resolve full text")?;
            Ok((record.display_id().to_string(), report))
        }
        Input::Url(url) => {
            let report = fetcher
                .full_text_report_from_url(url.as_str())
                .await
                .context("Failed to resolve full text")?;
            Ok((url.to_string(), report))
        }
        Input::Stdin | Input::File(_) => {
            let record = read_record(input)?;
            let report = fetcher
                .full_text_report(&record)
                .await
                .context("Failed to resolve full text")?;
            Ok((record.display_id().to_string(), report))
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "loctext", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);

    let input = Input::from_arg(args.input.as_deref().context("INPUT is required")?);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
        echo::print_step(1, 3, "Building HTTP client");
    }

    let fetcher = FullTextFetcher::with_config(fetch_config(&args)).context("Failed to build HTTP client")?;

    if args.verbose {
        let source = match &input {
            Input::Url(url) => format!("Resolving {}", url.as_str().bright_white().underline()),
            Input::Stdin => "Resolving record from stdin".to_string(),
            Input::File(path) => format!("Resolving record from {}", path.display().bright_white()),
        };
        echo::print_step(2, 3, &source);
    }

    let (id, extraction) = resolve(&fetcher, &input, args.api).await?;

    if args.verbose {
        echo::print_extraction_details(&extraction);
        echo::print_step(3, 3, "Writing output");
    }

    let Some(text) = extraction.text else {
        echo::print_warning(&format!("No full text available for {id}"));
        return Ok(());
    };

    match args.output {
        Some(path) => {
            fs::write(&path, text).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", text.trim_end_matches('\n'));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(err) = run(args).await {
        echo::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
