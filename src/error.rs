use std::path::PathBuf;

use thiserror::Error;

/// HTTP status GitHub answers with when a token is rejected.
pub const AUTH_REJECTED_STATUS: u16 = 401;

#[derive(Debug, Error)]
pub enum ScoreError {
  #[error("{var} must be set for this run")]
  MissingToken { var: &'static str },

  #[error("GitHub API error on {endpoint}: HTTP {status} ({message})")]
  Api {
    endpoint: String,
    status: u16,
    message: String,
  },

  #[error("request to {endpoint} failed")]
  Transport {
    endpoint: String,
    #[source]
    source: Box<octocrab::Error>,
  },

  #[error("unexpected response shape from {endpoint}")]
  Decode {
    endpoint: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("unable to load scoring profile «{}»", path.display())]
  Profile {
    path: PathBuf,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("invalid scoring profile: {0}")]
  InvalidProfile(String),

  #[error("failed to build GitHub client")]
  Client(#[source] Box<octocrab::Error>),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Csv(#[from] csv::Error),

  #[error(transparent)]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl ScoreError {
  /// True when the server refused the credentials we sent.
  pub fn is_auth_rejection(&self) -> bool {
    matches!(self, ScoreError::Api { status, .. } if *status == AUTH_REJECTED_STATUS)
  }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
