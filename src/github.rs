use async_trait::async_trait;
use log::{debug, warn};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::credentials::Credentials;
use crate::error::{Result, ScoreError};
use crate::models::{ApiErrorBody, ApiUserProfile};
use crate::pagination::{get_resource, ApiSource, AuthMode, PageQuery};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// This function returns a live Octocrab instance, authenticated when a token is given.
pub fn octocrab_handle(token: Option<&str>, base_uri: Option<&str>) -> Result<Octocrab> {
  let client_error = |e: octocrab::Error| ScoreError::Client(Box::new(e));

  let mut builder = Octocrab::builder();
  if let Some(uri) = base_uri {
    builder = builder.base_uri(uri).map_err(client_error)?;
  }
  if let Some(t) = token {
    builder = builder.personal_token(t.to_string());
  }

  builder.build().map_err(client_error)
}

/// GitHub REST access through octocrab. Holds an anonymous handle next to the authenticated one
/// so a rejected token can be retried without credentials.
#[derive(Debug)]
pub struct GitHubClient {
  authenticated: Option<Octocrab>,
  anonymous: Octocrab,
}

impl GitHubClient {
  pub fn new(credentials: &Credentials, base_uri: Option<&str>) -> Result<Self> {
    let authenticated = match credentials.token() {
      Some(token) => Some(octocrab_handle(Some(token), base_uri)?),
      None => None,
    };

    Ok(GitHubClient {
      authenticated,
      anonymous: octocrab_handle(None, base_uri)?,
    })
  }

  fn handle(&self, auth: AuthMode) -> &Octocrab {
    match (auth, &self.authenticated) {
      (AuthMode::Token, Some(gh)) => gh,
      _ => &self.anonymous,
    }
  }
}

/// GET `uri` and sort the response by its status line before looking at the body, so error
/// pages that are not GitHub JSON still report their status.
async fn fetch_json<R: DeserializeOwned>(gh: &Octocrab, route: &str, uri: String) -> Result<R> {
  let transport = |e: octocrab::Error| ScoreError::Transport {
    endpoint: route.to_string(),
    source: Box::new(e),
  };

  let response = gh._get(uri).await.map_err(transport)?;
  let status = response.status();
  let body = gh.body_to_string(response).await.map_err(transport)?;

  if !status.is_success() {
    return Err(ScoreError::Api {
      endpoint: route.to_string(),
      status: status.as_u16(),
      message: error_message(&body),
    });
  }

  serde_json::from_str(&body).map_err(|source| ScoreError::Decode {
    endpoint: route.to_string(),
    source,
  })
}

/// GitHub's `message` field when the body has one, the raw text otherwise.
fn error_message(body: &str) -> String {
  serde_json::from_str::<ApiErrorBody>(body)
    .map(|e| e.message)
    .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl ApiSource for GitHubClient {
  fn has_credentials(&self) -> bool {
    self.authenticated.is_some()
  }

  async fn get_page(&self, route: &str, query: &PageQuery, auth: AuthMode) -> Result<Vec<Value>> {
    let uri = format!("{route}?{}", query.to_query_string());
    fetch_json(self.handle(auth), route, uri).await
  }

  async fn get_resource(&self, route: &str, auth: AuthMode) -> Result<Value> {
    fetch_json(self.handle(auth), route, route.to_string()).await
  }
}

/// Make sure the repository is reachable before paging through it.
pub async fn check_repository_access<S: ApiSource + ?Sized>(
  api: &S,
  owner: &str,
  repo: &str,
) -> Result<()> {
  let route = format!("/repos/{owner}/{repo}");
  get_resource(api, &route).await?;
  debug!("Repository {}/{} is accessible.", owner, repo);
  Ok(())
}

/// Look up a user's full name. Failures are logged and yield `None`, a missing name never
/// aborts a run.
pub async fn fetch_user_display_name<S: ApiSource + ?Sized>(api: &S, login: &str) -> Option<String> {
  let route = format!("/users/{login}");

  let value = match get_resource(api, &route).await {
    Ok(value) => value,
    Err(err) => {
      warn!("Failed to fetch name for {}: {}", login, err);
      return None;
    }
  };

  match serde_json::from_value::<ApiUserProfile>(value) {
    Ok(profile) => profile.name.filter(|n| !n.trim().is_empty()),
    Err(err) => {
      warn!("Unexpected profile shape for {}: {}", login, err);
      None
    }
  }
}
