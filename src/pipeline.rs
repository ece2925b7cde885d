use std::time::Duration;

use clap::ValueEnum;
use log::{debug, info, warn};

use crate::config::ScoringProfile;
use crate::error::Result;
use crate::github::{check_repository_access, fetch_user_display_name};
use crate::models::{ApiContributor, ApiLabel, ApiPullRequest, Contributor, PullRequest};
use crate::pagination::{ApiSource, Endpoint, Paginator, MAX_PER_PAGE};
use crate::scoring::{aggregate, ScoreBoard};

/// Pause between `/users/{login}` lookups.
pub const DEFAULT_NAME_LOOKUP_DELAY: Duration = Duration::from_millis(100);

/// Where pull request labels are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LabelSource {
  /// The labels embedded in the pull request listing.
  Inline,
  /// One `/issues/{number}/labels` request per merged pull request.
  Issues,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
  pub owner: String,
  pub repo: String,
  pub per_page: u8,
  pub label_source: LabelSource,
  pub fetch_names: bool,
  pub name_lookup_delay: Duration,
  pub include_roster: bool,
}

impl RunOptions {
  pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
    RunOptions {
      owner: owner.into(),
      repo: repo.into(),
      per_page: MAX_PER_PAGE,
      label_source: LabelSource::Inline,
      fetch_names: false,
      name_lookup_delay: DEFAULT_NAME_LOOKUP_DELAY,
      include_roster: false,
    }
  }
}

#[derive(Debug)]
pub struct RunOutcome {
  pub board: ScoreBoard,
  /// The contributor listing, when it was requested.
  pub roster: Option<Vec<Contributor>>,
  /// Closed pull requests returned by the API.
  pub fetched: usize,
  /// How many of those were merged.
  pub merged: usize,
}

/// Fetch, classify and aggregate one repository.
pub async fn run<S: ApiSource + ?Sized>(
  api: &S,
  profile: &ScoringProfile,
  options: &RunOptions,
) -> Result<RunOutcome> {
  check_repository_access(api, &options.owner, &options.repo).await?;

  let roster = if options.include_roster {
    Some(fetch_roster(api, options).await?)
  } else {
    None
  };

  info!(
    "Fetching closed pull requests for {}/{} (token={})...",
    options.owner,
    options.repo,
    if api.has_credentials() { "YES" } else { "NO" }
  );
  let pulls: Vec<ApiPullRequest> = Paginator::new(
    api,
    Endpoint::ClosedPullRequests {
      owner: options.owner.clone(),
      repo: options.repo.clone(),
    },
    options.per_page,
  )
  .collect_all()
  .await?;
  let fetched = pulls.len();

  let mut merged: Vec<PullRequest> = pulls
    .into_iter()
    .map(PullRequest::from)
    .filter(PullRequest::is_merged)
    .collect();
  info!(
    "Total closed pull requests fetched: {}, merged: {}.",
    fetched,
    merged.len()
  );

  if options.label_source == LabelSource::Issues {
    refresh_labels(api, options, &mut merged).await?;
  }

  let mut board = aggregate(&merged, &profile.policy);

  if options.fetch_names {
    if api.has_credentials() {
      enrich_display_names(api, &mut board, options.name_lookup_delay).await;
    } else {
      warn!("Skipping name lookups, they need a token.");
    }
  }

  if let Some(contributors) = &roster {
    for contributor in contributors {
      if !board.contains(&contributor.handle) {
        debug!(
          "Contributor {} ({} commits) has no qualifying pull requests.",
          contributor.handle, contributor.contributions
        );
      }
    }
  }

  Ok(RunOutcome {
    board,
    roster,
    fetched,
    merged: merged.len(),
  })
}

async fn fetch_roster<S: ApiSource + ?Sized>(
  api: &S,
  options: &RunOptions,
) -> Result<Vec<Contributor>> {
  info!("Fetching contributors...");
  let listing: Vec<ApiContributor> = Paginator::new(
    api,
    Endpoint::Contributors {
      owner: options.owner.clone(),
      repo: options.repo.clone(),
    },
    options.per_page,
  )
  .collect_all()
  .await?;

  let contributors: Vec<Contributor> = listing
    .into_iter()
    .filter_map(Contributor::from_api)
    .collect();
  info!("Found {} contributors.", contributors.len());
  Ok(contributors)
}

/// Replace inline labels with the ones from the issue labels endpoint.
async fn refresh_labels<S: ApiSource + ?Sized>(
  api: &S,
  options: &RunOptions,
  pull_requests: &mut [PullRequest],
) -> Result<()> {
  info!(
    "Fetching labels for {} merged pull requests...",
    pull_requests.len()
  );

  for pr in pull_requests.iter_mut() {
    let labels: Vec<ApiLabel> = Paginator::new(
      api,
      Endpoint::IssueLabels {
        owner: options.owner.clone(),
        repo: options.repo.clone(),
        number: pr.number,
      },
      options.per_page,
    )
    .collect_all()
    .await?;

    pr.labels = labels.into_iter().map(|l| l.name).collect();
  }

  Ok(())
}

async fn enrich_display_names<S: ApiSource + ?Sized>(
  api: &S,
  board: &mut ScoreBoard,
  delay: Duration,
) {
  let handles: Vec<String> = board.handles().map(str::to_string).collect();
  info!(
    "Fetching full names for {} contributors (one request each)...",
    handles.len()
  );

  for (idx, handle) in handles.iter().enumerate() {
    if idx > 0 && !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }

    if let Some(name) = fetch_user_display_name(api, handle).await {
      board.set_display_name(handle, name);
    }
  }
}
