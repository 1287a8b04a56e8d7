//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use postdate_core::{Analysis, Analyzer, BatchSummary};
use postdate_fetch::{Fetcher, validate_url};
use postdate_shared::{
    AppConfig, Document, PostdateError, init_config, load_config, load_config_from,
};
use tracing::{info, warn};

use crate::output;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// postdate: find out when a job posting went up.
#[derive(Parser)]
#[command(
    name = "postdate",
    version,
    about = "Resolve the posting date of a job listing and advise whether to apply.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.postdate/postdate.toml.
    #[arg(long, global = true, env = "POSTDATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Options shared by the single-document commands.
#[derive(clap::Args)]
pub(crate) struct AnalyzeArgs {
    /// Analysis time (RFC 3339); defaults to now.
    #[arg(long, value_parser = parse_analysis_time)]
    pub at: Option<DateTime<Utc>>,

    /// Print the full analysis as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also detect skills, title and company.
    #[arg(long)]
    pub skills: bool,

    /// Your skills (comma-separated), for a match percentage.
    #[arg(long, value_delimiter = ',')]
    pub my_skills: Vec<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch a posting URL and analyze it.
    Check {
        /// Posting URL (http or https).
        url: String,

        #[command(flatten)]
        args: AnalyzeArgs,
    },

    /// Analyze a saved HTML or PDF file.
    File {
        /// Path to the saved posting.
        path: PathBuf,

        /// Original URL of the posting, used for the company fallback.
        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        args: AnalyzeArgs,
    },

    /// Analyze every URL in a file (one per line, `#` starts a comment).
    Batch {
        /// File with one URL per line.
        file: PathBuf,

        /// Analysis time (RFC 3339); defaults to now.
        #[arg(long, value_parser = parse_analysis_time)]
        at: Option<DateTime<Utc>>,

        /// Print results and summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

fn parse_analysis_time(value: &str) -> postdate_shared::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            PostdateError::parse(format!(
                "expected an RFC 3339 timestamp such as 2025-08-04T10:30:00Z: {e}"
            ))
        })
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "postdate=warn",
        1 => "postdate=info",
        2 => "postdate=debug",
        _ => "postdate=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Check { url, args } => cmd_check(config_path, &url, &args).await,
        Command::File { path, url, args } => cmd_file(config_path, &path, url.as_deref(), &args),
        Command::Batch { file, at, json } => cmd_batch(config_path, &file, at, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn build_analyzer(config: &AppConfig, args: &AnalyzeArgs) -> Analyzer {
    let mut analyzer = Analyzer::new(config);
    if args.skills || !args.my_skills.is_empty() {
        analyzer = analyzer.with_skills(config);
    }
    if !args.my_skills.is_empty() {
        analyzer = analyzer.with_my_skills(args.my_skills.clone());
    }
    analyzer
}

fn print_analysis(analysis: &Analysis, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
    } else {
        print!("{}", output::render_analysis(analysis));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_check(config_path: Option<&Path>, url: &str, args: &AnalyzeArgs) -> Result<()> {
    let config = resolve_config(config_path)?;
    let url = validate_url(url)?;
    let analysis_time = args.at.unwrap_or_else(Utc::now);

    info!(%url, %analysis_time, "checking posting");

    let fetcher = Fetcher::new(&config.fetch)?;
    let document = fetcher.fetch(&url).await?;
    let analysis = build_analyzer(&config, args).analyze(&document, analysis_time);

    print_analysis(&analysis, args.json)
}

fn cmd_file(
    config_path: Option<&Path>,
    path: &Path,
    url: Option<&str>,
    args: &AnalyzeArgs,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let bytes = std::fs::read(path).map_err(|e| PostdateError::io(path, e))?;
    let analysis_time = args.at.unwrap_or_else(Utc::now);

    let location = path.to_string_lossy();
    let mut document = Document::classify(bytes, None, Some(location.as_ref()));
    if let Some(url) = url {
        document = document.with_source_url(validate_url(url)?.as_str());
    }

    info!(path = %path.display(), kind = %document.kind, "analyzing saved posting");

    let analysis = build_analyzer(&config, args).analyze(&document, analysis_time);
    print_analysis(&analysis, args.json)
}

async fn cmd_batch(
    config_path: Option<&Path>,
    file: &Path,
    at: Option<DateTime<Utc>>,
    json: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let content = std::fs::read_to_string(file).map_err(|e| PostdateError::io(file, e))?;
    let urls = read_url_list(&content);
    if urls.is_empty() {
        return Err(eyre!("no URLs found in '{}'", file.display()));
    }

    let analysis_time = at.unwrap_or_else(Utc::now);
    let fetcher = Fetcher::new(&config.fetch)?;
    let analyzer = Analyzer::new(&config);

    info!(count = urls.len(), %analysis_time, "starting batch");

    let progress = ProgressBar::new(urls.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid progress template")
            .progress_chars("=> "),
    );

    let mut results: Vec<(String, postdate_shared::Result<Analysis>)> =
        Vec::with_capacity(urls.len());
    for url in urls {
        progress.set_message(url.to_string());
        let result = analyze_url(&fetcher, &analyzer, url, analysis_time).await;
        if let Err(e) = &result {
            warn!(url, error = %e, "analysis failed");
        }
        results.push((url.to_string(), result));
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = BatchSummary::from_results(results.iter().map(|(_, result)| result));

    if json {
        println!("{}", serde_json::to_string_pretty(&output::batch_json(&results, &summary))?);
    } else {
        print!("{}", output::render_batch(&results, &summary));
    }
    Ok(())
}

async fn analyze_url(
    fetcher: &Fetcher,
    analyzer: &Analyzer,
    url: &str,
    analysis_time: DateTime<Utc>,
) -> postdate_shared::Result<Analysis> {
    let url = validate_url(url)?;
    let document = fetcher.fetch(&url).await?;
    Ok(analyzer.analyze(&document, analysis_time))
}

/// Non-empty lines that are not `#` comments, trimmed.
fn read_url_list(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
