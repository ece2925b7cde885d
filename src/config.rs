//! Scoring profiles: which classification policy applies and whether a token is mandatory.
//!
//! A profile is either one of the built-in presets or a TOML file such as
//!
//! ```toml
//! require_token = false
//!
//! [policy]
//! kind = "gated-exact-one"
//! gate = "gssoc25"
//! tiers = [
//!   { label = "level 1", score = 3 },
//!   { label = "level 2", score = 7 },
//! ]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};
use crate::scoring::{
  ClassificationPolicy, LabelRule, FLAT_SCORE, GATED_LEVEL_1_SCORE, GATED_LEVEL_2_SCORE,
  GATED_LEVEL_3_SCORE, TIERED_LEVEL_1_SCORE, TIERED_LEVEL_2_SCORE, TIERED_LEVEL_3_SCORE,
};

pub const GSSOC_GATE_LABEL: &str = "gssoc25";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
  /// "Level 3" > "Level 2" > "Level 1", first match wins.
  Tiered,
  /// "gssoc25" plus exactly one of "level 1", "level 2", "level 3".
  Gated,
  /// One point per merged pull request.
  Flat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringProfile {
  #[serde(default)]
  pub require_token: bool,
  pub policy: ClassificationPolicy,
}

impl ScoringProfile {
  pub fn preset(preset: Preset) -> Self {
    let policy = match preset {
      // Highest tier is tested first.
      Preset::Tiered => ClassificationPolicy::TieredExclusive {
        tiers: vec![
          LabelRule::new("Level 3", TIERED_LEVEL_3_SCORE),
          LabelRule::new("Level 2", TIERED_LEVEL_2_SCORE),
          LabelRule::new("Level 1", TIERED_LEVEL_1_SCORE),
        ],
      },
      Preset::Gated => ClassificationPolicy::GatedExactOne {
        gate: GSSOC_GATE_LABEL.to_string(),
        tiers: vec![
          LabelRule::new("level 1", GATED_LEVEL_1_SCORE),
          LabelRule::new("level 2", GATED_LEVEL_2_SCORE),
          LabelRule::new("level 3", GATED_LEVEL_3_SCORE),
        ],
      },
      Preset::Flat => ClassificationPolicy::Flat { score: FLAT_SCORE },
    };

    ScoringProfile {
      require_token: false,
      policy,
    }
  }

  pub fn from_toml_str(text: &str) -> Result<Self> {
    let profile: ScoringProfile =
      toml::from_str(text).map_err(|e| ScoreError::InvalidProfile(e.to_string()))?;
    profile.validate()?;
    Ok(profile)
  }

  pub fn load(path: &Path) -> Result<Self> {
    let wrap = |source: Box<dyn std::error::Error + Send + Sync>| ScoreError::Profile {
      path: path.to_path_buf(),
      source,
    };

    let text = fs::read_to_string(path).map_err(|e| wrap(Box::new(e)))?;
    let profile: ScoringProfile = toml::from_str(&text).map_err(|e| wrap(Box::new(e)))?;
    profile.validate()?;
    Ok(profile)
  }

  pub fn validate(&self) -> Result<()> {
    let tiers = match &self.policy {
      ClassificationPolicy::Flat { .. } => return Ok(()),
      ClassificationPolicy::TieredExclusive { tiers } => tiers,
      ClassificationPolicy::GatedExactOne { gate, tiers } => {
        if gate.trim().is_empty() {
          return Err(ScoreError::InvalidProfile("gate label is empty".into()));
        }
        if tiers.iter().any(|t| &t.label == gate) {
          return Err(ScoreError::InvalidProfile(format!(
            "gate label «{gate}» is also a tier label"
          )));
        }
        tiers
      }
    };

    if tiers.is_empty() {
      return Err(ScoreError::InvalidProfile("no tiers defined".into()));
    }

    let mut seen = HashSet::new();
    for tier in tiers {
      if !seen.insert(tier.label.as_str()) {
        return Err(ScoreError::InvalidProfile(format!(
          "tier label «{}» is listed twice",
          tier.label
        )));
      }
    }

    Ok(())
  }
}
