use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use contributor_scores::config::{Preset, ScoringProfile};
use contributor_scores::credentials::Credentials;
use contributor_scores::github::{GitHubClient, DEFAULT_API_URL};
use contributor_scores::pagination::MAX_PER_PAGE;
use contributor_scores::pipeline::{self, LabelSource, RunOptions, RunOutcome};
use contributor_scores::report::{self, markdown};
use contributor_scores::Result;

use log::*;

use simplelog::*;

const DEFAULT_MARKDOWN_FILE: &str = "Contributor-data.md";
const DEFAULT_CSV_FILE: &str = "contributor_scores.csv";
const TOP_CONTRIBUTORS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
  Markdown,
  Csv,
}

#[derive(Parser, Debug)]
#[command(author, version, arg_required_else_help(true))]
struct Opts {
  /// Who owns the repository (user or organization)?
  #[arg(short = 'o', long)]
  owner: String,

  /// What is the name of the repository?
  #[arg(short = 'r', long)]
  repo: String,

  /// Where should the report go? Defaults depend on the format.
  #[arg(long)]
  output: Option<PathBuf>,

  /// Which report format would you like?
  #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
  format: OutputFormat,

  /// GitHub token. Falls back to the GITHUB_TOKEN environment variable.
  #[arg(long)]
  token: Option<String>,

  /// Would you like to look up contributors' full names? Costs one request per contributor.
  #[arg(long, default_value_t = false)]
  fetch_names: bool,

  /// Pause between name lookups, in milliseconds.
  #[arg(long, default_value_t = 100)]
  name_delay_ms: u64,

  /// Would you like an XLSX file next to the report as well?
  #[arg(short = 'x', long, default_value_t = false)]
  xlsx: bool,

  /// Built-in scoring scheme.
  #[arg(short = 'p', long, value_enum, default_value_t = Preset::Gated)]
  preset: Preset,

  /// Scoring profile in TOML, used instead of the preset.
  #[arg(long, conflicts_with = "preset")]
  profile: Option<PathBuf>,

  /// Abort instead of querying anonymously when no token is available.
  #[arg(long, default_value_t = false)]
  require_token: bool,

  /// Where labels are read from.
  #[arg(long, value_enum, default_value_t = LabelSource::Inline)]
  label_source: LabelSource,

  /// Would you like the contributor listing fetched as well?
  #[arg(long, default_value_t = false)]
  roster: bool,

  /// Heading of the markdown report.
  #[arg(long, default_value = markdown::DEFAULT_TITLE)]
  title: String,

  /// Would you like a "last updated" line in the markdown report?
  #[arg(long, default_value_t = false)]
  timestamp: bool,

  /// Items per page when paging through the API.
  #[arg(long, default_value_t = MAX_PER_PAGE, value_parser = clap::value_parser!(u8).range(1..=100))]
  per_page: u8,

  /// GitHub API base URL.
  #[arg(long, default_value = DEFAULT_API_URL)]
  api_url: String,

  /// Would you like to enable debug information?
  #[arg(short = 'd', long, default_value_t = false)]
  debug: bool,
}

impl Opts {
  fn output_path(&self) -> PathBuf {
    match (&self.output, self.format) {
      (Some(path), _) => path.clone(),
      (None, OutputFormat::Markdown) => PathBuf::from(DEFAULT_MARKDOWN_FILE),
      (None, OutputFormat::Csv) => PathBuf::from(DEFAULT_CSV_FILE),
    }
  }

  fn scoring_profile(&self) -> Result<ScoringProfile> {
    match &self.profile {
      Some(path) => ScoringProfile::load(path),
      None => Ok(ScoringProfile::preset(self.preset)),
    }
  }

  fn run_options(&self) -> RunOptions {
    RunOptions {
      per_page: self.per_page,
      label_source: self.label_source,
      fetch_names: self.fetch_names,
      name_lookup_delay: Duration::from_millis(self.name_delay_ms),
      include_roster: self.roster,
      ..RunOptions::new(&self.owner, &self.repo)
    }
  }
}

fn write_reports(opts: &Opts, outcome: &RunOutcome) -> Result<()> {
  let path = opts.output_path();

  match opts.format {
    OutputFormat::Markdown => {
      let options = markdown::MarkdownOptions {
        title: opts.title.clone(),
        generated_at: opts.timestamp.then(chrono::Utc::now),
      };
      fs::write(&path, markdown::render(&outcome.board, &options))?;
    }
    OutputFormat::Csv => report::csv::write_file(&outcome.board, &path)?,
  }
  info!("Wrote {}: {}", format_name(opts.format), path.display());

  if opts.xlsx {
    let xlsx_path = path.with_extension("xlsx");
    report::xlsx::write_file(&outcome.board, &xlsx_path)?;
    info!("Wrote XLSX: {}", xlsx_path.display());
  }

  Ok(())
}

fn format_name(format: OutputFormat) -> &'static str {
  match format {
    OutputFormat::Markdown => "markdown",
    OutputFormat::Csv => "CSV",
  }
}

fn log_summary(outcome: &RunOutcome) {
  let board = &outcome.board;

  if let Some(roster) = &outcome.roster {
    info!("Contributors listed: {}", roster.len());
  }
  info!(
    "Summary: contributors={}, counted PRs={}, total score={}",
    board.len(),
    board.total_pull_requests(),
    board.total_score()
  );

  if board.is_empty() {
    return;
  }

  info!("Top contributors:");
  for record in report::ranked(board).into_iter().take(TOP_CONTRIBUTORS) {
    info!(
      " - {} ({}): {} PRs, {} points{}",
      record.display_name,
      record.handle,
      record.pr_count,
      record.score,
      tier_breakdown(&record.tier_counts)
    );
  }
}

/// " [level 1: 2, level 3: 1]", or nothing when no tiers were counted.
fn tier_breakdown(counts: &BTreeMap<String, u32>) -> String {
  if counts.is_empty() {
    return String::new();
  }
  let parts: Vec<String> = counts
    .iter()
    .map(|(tier, count)| format!("{tier}: {count}"))
    .collect();
  format!(" [{}]", parts.join(", "))
}

async fn run(opts: &Opts) -> Result<()> {
  let profile = opts.scoring_profile()?;

  let mut credentials = Credentials::resolve(opts.token.as_deref());
  if profile.require_token || opts.require_token {
    credentials = credentials.require()?;
  }

  let gh = GitHubClient::new(&credentials, Some(opts.api_url.as_str()))?;

  let outcome = pipeline::run(&gh, &profile, &opts.run_options()).await?;

  write_reports(opts, &outcome)?;
  log_summary(&outcome);

  Ok(())
}

fn log_error_chain(err: &dyn std::error::Error) {
  error!("{}", err);
  let mut source = err.source();
  while let Some(cause) = source {
    error!("  caused by: {}", cause);
    source = cause.source();
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  let opts = Opts::parse();

  let log_level = if opts.debug {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };

  if let Err(e) = TermLogger::init(
    log_level,
    Config::default(),
    TerminalMode::Mixed,
    ColorChoice::Auto,
  ) {
    eprintln!("Failed to initialize logger: {:?}", e);
    return ExitCode::FAILURE;
  }

  debug!("DEBUG ENABLED");

  match run(&opts).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      log_error_chain(&err);
      ExitCode::FAILURE
    }
  }
}
