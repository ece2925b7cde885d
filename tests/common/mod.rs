#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use contributor_scores::pagination::{ApiSource, AuthMode, PageQuery};
use contributor_scores::{Result, ScoreError};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub route: String,
  pub page: Option<u32>,
  pub auth: AuthMode,
}

/// In-memory GitHub. Pages are served by position, anything past the last page is empty.
#[derive(Default)]
pub struct FakeApi {
  credentials: bool,
  reject_token: bool,
  pages: HashMap<String, Vec<Vec<Value>>>,
  resources: HashMap<String, Value>,
  failures: HashMap<(String, u32), u16>,
  calls: Mutex<Vec<Call>>,
}

impl FakeApi {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_credentials(mut self) -> Self {
    self.credentials = true;
    self
  }

  /// Every request made with the token gets a 401.
  pub fn rejecting_token(mut self) -> Self {
    self.reject_token = true;
    self
  }

  pub fn with_pages(mut self, route: &str, pages: Vec<Vec<Value>>) -> Self {
    self.pages.insert(route.to_string(), pages);
    self
  }

  pub fn with_resource(mut self, route: &str, value: Value) -> Self {
    self.resources.insert(route.to_string(), value);
    self
  }

  pub fn failing(mut self, route: &str, page: u32, status: u16) -> Self {
    self.failures.insert((route.to_string(), page), status);
    self
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn calls_to(&self, route: &str) -> Vec<Call> {
    self
      .calls()
      .into_iter()
      .filter(|c| c.route == route)
      .collect()
  }

  fn log(&self, route: &str, page: Option<u32>, auth: AuthMode) {
    self.calls.lock().unwrap().push(Call {
      route: route.to_string(),
      page,
      auth,
    });
  }
}

fn api_error(route: &str, status: u16) -> ScoreError {
  ScoreError::Api {
    endpoint: route.to_string(),
    status,
    message: "fake".to_string(),
  }
}

#[async_trait]
impl ApiSource for FakeApi {
  fn has_credentials(&self) -> bool {
    self.credentials
  }

  async fn get_page(&self, route: &str, query: &PageQuery, auth: AuthMode) -> Result<Vec<Value>> {
    self.log(route, Some(query.page), auth);

    if auth == AuthMode::Token && self.reject_token {
      return Err(api_error(route, 401));
    }
    if let Some(status) = self.failures.get(&(route.to_string(), query.page)) {
      return Err(api_error(route, *status));
    }

    Ok(
      self
        .pages
        .get(route)
        .and_then(|pages| pages.get(query.page as usize - 1))
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn get_resource(&self, route: &str, auth: AuthMode) -> Result<Value> {
    self.log(route, None, auth);

    if auth == AuthMode::Token && self.reject_token {
      return Err(api_error(route, 401));
    }

    self
      .resources
      .get(route)
      .cloned()
      .ok_or_else(|| api_error(route, 404))
  }
}

pub fn label(name: &str) -> Value {
  json!({ "name": name })
}

pub fn pull(number: u64, author: &str, merged: bool, labels: &[&str]) -> Value {
  json!({
    "id": 1000 + number,
    "number": number,
    "html_url": format!("https://github.com/acme/widgets/pull/{number}"),
    "merged_at": if merged { Value::from("2024-05-01T12:00:00Z") } else { Value::Null },
    "user": {
      "login": author,
      "avatar_url": format!("https://avatars.example/{author}"),
    },
    "labels": labels.iter().map(|l| label(l)).collect::<Vec<_>>(),
  })
}
