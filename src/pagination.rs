//! Page-number pagination over GitHub collection endpoints.
//!
//! GitHub collections are walked with `page` and `per_page` query parameters. We keep asking for
//! the next page until one comes back empty; a full page is never taken as proof that more
//! pages exist, nor a short one as proof that none do.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, ScoreError};

/// GitHub numbers pages from one.
pub const FIRST_PAGE: u32 = 1;
/// Largest page GitHub will serve.
pub const MAX_PER_PAGE: u8 = 100;

/// Whether a request carries the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
  Token,
  Anonymous,
}

/// Collection endpoints walked by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
  Contributors { owner: String, repo: String },
  ClosedPullRequests { owner: String, repo: String },
  IssueLabels { owner: String, repo: String, number: u64 },
}

impl Endpoint {
  pub fn route(&self) -> String {
    match self {
      Endpoint::Contributors { owner, repo } => format!("/repos/{owner}/{repo}/contributors"),
      Endpoint::ClosedPullRequests { owner, repo } => format!("/repos/{owner}/{repo}/pulls"),
      Endpoint::IssueLabels {
        owner,
        repo,
        number,
      } => format!("/repos/{owner}/{repo}/issues/{number}/labels"),
    }
  }

  fn state(&self) -> Option<&'static str> {
    match self {
      Endpoint::ClosedPullRequests { .. } => Some("closed"),
      _ => None,
    }
  }

  pub fn query(&self, page: u32, per_page: u8) -> PageQuery {
    PageQuery {
      state: self.state(),
      per_page,
      page,
    }
  }
}

/// Query string sent with every page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
  pub state: Option<&'static str>,
  pub per_page: u8,
  pub page: u32,
}

impl PageQuery {
  /// Encoded form, `state` first when present.
  pub fn to_query_string(&self) -> String {
    let paging = format!("per_page={}&page={}", self.per_page, self.page);
    match self.state {
      Some(state) => format!("state={state}&{paging}"),
      None => paging,
    }
  }
}

/// The HTTP seam. Implemented over octocrab in [`crate::github`] and by in-memory fakes in tests.
#[async_trait]
pub trait ApiSource: Send + Sync {
  /// Whether a token is available at all.
  fn has_credentials(&self) -> bool;

  /// One page of a collection. Non-2xx responses come back as [`ScoreError::Api`].
  async fn get_page(&self, route: &str, query: &PageQuery, auth: AuthMode) -> Result<Vec<Value>>;

  /// A single resource.
  async fn get_resource(&self, route: &str, auth: AuthMode) -> Result<Value>;
}

/// Run `attempt` with the token, and if the token is rejected run it once more anonymously.
///
/// Without credentials there is only the anonymous attempt. Any error from the second attempt,
/// or any non-auth error from the first, is returned as-is.
pub async fn with_credential_downgrade<T, F, Fut>(
  has_credentials: bool,
  endpoint: &str,
  mut attempt: F,
) -> Result<T>
where
  F: FnMut(AuthMode) -> Fut,
  Fut: Future<Output = Result<T>>,
{
  if !has_credentials {
    return attempt(AuthMode::Anonymous).await;
  }

  match attempt(AuthMode::Token).await {
    Err(err) if err.is_auth_rejection() => {
      warn!(
        "Token rejected for {}, retrying without credentials.",
        endpoint
      );
      attempt(AuthMode::Anonymous).await
    }
    other => other,
  }
}

/// Fetch a single resource through the downgrade strategy.
pub async fn get_resource<S: ApiSource + ?Sized>(api: &S, route: &str) -> Result<Value> {
  with_credential_downgrade(api.has_credentials(), route, |auth| {
    api.get_resource(route, auth)
  })
  .await
}

/// Walks every page of an endpoint, decoding items as `T`.
///
/// Nothing is requested until the stream is polled, and each call to [`Paginator::items`]
/// starts again from the first page.
pub struct Paginator<'a, S: ?Sized, T> {
  api: &'a S,
  endpoint: Endpoint,
  per_page: u8,
  _item: PhantomData<fn() -> T>,
}

impl<'a, S, T> Paginator<'a, S, T>
where
  S: ApiSource + ?Sized,
  T: DeserializeOwned + Send + 'a,
{
  pub fn new(api: &'a S, endpoint: Endpoint, per_page: u8) -> Self {
    Paginator {
      api,
      endpoint,
      per_page: per_page.clamp(1, MAX_PER_PAGE),
      _item: PhantomData,
    }
  }

  /// Fetch and decode one page.
  pub async fn fetch_page(&self, page: u32) -> Result<Vec<T>> {
    let route = self.endpoint.route();
    let query = self.endpoint.query(page, self.per_page);

    let raw = with_credential_downgrade(self.api.has_credentials(), &route, |auth| {
      self.api.get_page(&route, &query, auth)
    })
    .await?;

    raw
      .into_iter()
      .map(|value| {
        serde_json::from_value(value).map_err(|source| ScoreError::Decode {
          endpoint: route.clone(),
          source,
        })
      })
      .collect()
  }

  /// Lazily yield every item across all pages.
  pub fn items<'s>(&'s self) -> impl Stream<Item = Result<T>> + use<'s, 'a, S, T> {
    stream::try_unfold(FIRST_PAGE, move |page| async move {
      let items = self.fetch_page(page).await?;

      // Stop looking if we're not getting any more items
      let next = if items.is_empty() {
        debug!(
          "Finished paging through {} after {} page(s).",
          self.endpoint.route(),
          page - FIRST_PAGE
        );
        None
      } else {
        debug!(
          "Fetched page {} of {} ({} items).",
          page,
          self.endpoint.route(),
          items.len()
        );
        Some((items, page + 1))
      };

      Ok::<_, ScoreError>(next)
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, ScoreError>)))
    .try_flatten()
  }

  /// Drain [`Paginator::items`] into a vector.
  pub async fn collect_all(&self) -> Result<Vec<T>> {
    self.items().try_collect().await
  }
}

impl<S: ?Sized, T> std::fmt::Debug for Paginator<'_, S, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Paginator")
      .field("endpoint", &self.endpoint)
      .field("per_page", &self.per_page)
      .finish()
  }
}
