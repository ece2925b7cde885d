use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Author handle used when GitHub returns a pull request without a user (deleted accounts).
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// A user object as embedded in pull requests and contributor listings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
  pub login: String,
  #[serde(default)]
  pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLabel {
  pub name: String,
}

/// The handful of pull request fields we read from `/repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPullRequest {
  pub id: u64,
  pub number: u64,
  #[serde(default)]
  pub html_url: Option<String>,
  #[serde(default)]
  pub merged_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub user: Option<ApiUser>,
  #[serde(default)]
  pub labels: Vec<ApiLabel>,
}

/// An entry from `/repos/{owner}/{repo}/contributors`. Anonymous contributors have no login.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiContributor {
  #[serde(default)]
  pub login: Option<String>,
  #[serde(default)]
  pub contributions: u32,
}

/// Body of a GitHub error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
  pub message: String,
}

/// The part of `/users/{login}` we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUserProfile {
  #[serde(default)]
  pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
  pub handle: String,
  /// Commits GitHub attributes to this login.
  pub contributions: u32,
}

impl Contributor {
  /// Contributors without a login cannot be attributed and are dropped.
  pub fn from_api(api: ApiContributor) -> Option<Contributor> {
    Some(Contributor {
      handle: api.login?,
      contributions: api.contributions,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
  pub id: u64,
  pub number: u64,
  pub html_url: Option<String>,
  pub author: String,
  pub author_avatar: Option<String>,
  pub merged_at: Option<DateTime<Utc>>,
  pub labels: BTreeSet<String>,
}

impl PullRequest {
  pub fn is_merged(&self) -> bool {
    self.merged_at.is_some()
  }

  pub fn has_label(&self, label: &str) -> bool {
    self.labels.contains(label)
  }
}

impl From<ApiPullRequest> for PullRequest {
  fn from(api: ApiPullRequest) -> Self {
    let (author, author_avatar) = match api.user {
      Some(user) => (user.login, user.avatar_url),
      None => (UNKNOWN_AUTHOR.to_string(), None),
    };

    PullRequest {
      id: api.id,
      number: api.number,
      html_url: api.html_url,
      author,
      author_avatar,
      merged_at: api.merged_at,
      labels: api.labels.into_iter().map(|l| l.name).collect(),
    }
  }
}
