pub mod config;
pub mod credentials;
pub mod error;
pub mod github;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod report;
pub mod scoring;

pub use error::{Result, ScoreError};
