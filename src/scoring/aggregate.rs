use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::{Classification, ClassificationPolicy, ScoreValue, TotalScore};
use crate::models::PullRequest;

/// A pull request as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
  pub number: u64,
  pub html_url: Option<String>,
}

/// Everything we know about one contributor after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
  pub handle: String,
  pub display_name: String,
  pub avatar_url: Option<String>,
  pub pr_count: u32,
  pub score: TotalScore,
  /// Qualifying pull requests per tier label. Empty under a flat policy.
  pub tier_counts: BTreeMap<String, u32>,
  pub pull_requests: Vec<PullRequestRef>,
}

impl ScoreRecord {
  fn new(handle: &str, avatar_url: Option<String>) -> Self {
    ScoreRecord {
      handle: handle.to_string(),
      display_name: handle.to_string(),
      avatar_url,
      pr_count: 0,
      score: 0,
      tier_counts: BTreeMap::new(),
      pull_requests: Vec::new(),
    }
  }
}

/// Per-contributor aggregate keyed by handle. Only contributors with at least one qualifying
/// pull request ever get an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBoard {
  records: BTreeMap<String, ScoreRecord>,
}

impl ScoreBoard {
  pub fn new() -> Self {
    Self::default()
  }

  /// Credit `pr` to its author under `tier`. The first name and avatar seen for a handle stick.
  pub fn record(&mut self, pr: &PullRequest, tier: Option<&str>, score: ScoreValue) {
    let entry = self
      .records
      .entry(pr.author.clone())
      .or_insert_with(|| ScoreRecord::new(&pr.author, pr.author_avatar.clone()));

    if entry.avatar_url.is_none() {
      entry.avatar_url = pr.author_avatar.clone();
    }
    entry.pr_count += 1;
    entry.score += TotalScore::from(score);
    if let Some(tier) = tier {
      *entry.tier_counts.entry(tier.to_string()).or_default() += 1;
    }
    entry.pull_requests.push(PullRequestRef {
      number: pr.number,
      html_url: pr.html_url.clone(),
    });
  }

  /// Replace a display name with one looked up from the user's profile.
  pub fn set_display_name(&mut self, handle: &str, name: impl Into<String>) -> bool {
    match self.records.get_mut(handle) {
      Some(record) => {
        record.display_name = name.into();
        true
      }
      None => false,
    }
  }

  pub fn get(&self, handle: &str) -> Option<&ScoreRecord> {
    self.records.get(handle)
  }

  pub fn contains(&self, handle: &str) -> bool {
    self.records.contains_key(handle)
  }

  pub fn handles(&self) -> impl Iterator<Item = &str> {
    self.records.keys().map(String::as_str)
  }

  /// Records in handle order. Use [`crate::report::ranked`] for report order.
  pub fn records(&self) -> impl Iterator<Item = &ScoreRecord> {
    self.records.values()
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn total_score(&self) -> TotalScore {
    self.records.values().map(|r| r.score).sum()
  }

  /// Every tier label credited to at least one contributor, sorted.
  pub fn tier_labels(&self) -> BTreeSet<&str> {
    self
      .records
      .values()
      .flat_map(|r| r.tier_counts.keys().map(String::as_str))
      .collect()
  }

  pub fn total_pull_requests(&self) -> u64 {
    self.records.values().map(|r| u64::from(r.pr_count)).sum()
  }
}

/// Fold pull requests into a fresh board under `policy`. Unmerged pull requests are dropped
/// before classification, as are ones the policy rejects.
pub fn aggregate<'a, I>(pull_requests: I, policy: &ClassificationPolicy) -> ScoreBoard
where
  I: IntoIterator<Item = &'a PullRequest>,
{
  let mut board = ScoreBoard::new();

  for pr in pull_requests {
    if !pr.is_merged() {
      continue;
    }

    match policy.classify(&pr.labels) {
      Classification::Qualifies { tier, score } => board.record(pr, tier, score),
      Classification::Ambiguous { matched } => {
        debug!(
          "Skipping #{}: {} tier labels present, exactly one is required.",
          pr.number, matched
        );
      }
      Classification::MissingGate | Classification::NoTier => {
        debug!("Skipping #{}: no qualifying labels.", pr.number);
      }
    }
  }

  board
}
