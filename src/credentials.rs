use std::env;

use log::debug;

use crate::error::{Result, ScoreError};

/// Environment variable the token is read from.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// An optional personal access token. `None` means we talk to GitHub anonymously.
#[derive(Clone, Default)]
pub struct Credentials {
  token: Option<String>,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("token", &self.token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

impl Credentials {
  pub fn anonymous() -> Self {
    Credentials { token: None }
  }

  pub fn with_token(token: impl Into<String>) -> Self {
    Credentials {
      token: Some(token.into()),
    }
  }

  /// Resolve the token from the command line override, falling back to the environment.
  pub fn resolve(override_token: Option<&str>) -> Self {
    let from_env = env::var(TOKEN_ENV_VAR).ok();
    Self::resolve_from(override_token, from_env.as_deref())
  }

  /// Same as [`Credentials::resolve`] with the environment value passed in. Blank values count
  /// as absent.
  pub fn resolve_from(override_token: Option<&str>, env_token: Option<&str>) -> Self {
    let token = non_blank(override_token)
      .or(non_blank(env_token))
      .map(str::to_string);

    if token.is_none() {
      debug!("No token found, GitHub will be queried anonymously.");
    }

    Credentials { token }
  }

  /// Fail when a token is mandatory and none was resolved.
  pub fn require(self) -> Result<Self> {
    if self.token.is_none() {
      return Err(ScoreError::MissingToken { var: TOKEN_ENV_VAR });
    }
    Ok(self)
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub fn is_present(&self) -> bool {
    self.token.is_some()
  }
}

fn non_blank(token: Option<&str>) -> Option<&str> {
  token.map(str::trim).filter(|t| !t.is_empty())
}
