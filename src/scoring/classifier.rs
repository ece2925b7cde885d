use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ScoreValue;

/// A label and the points it is worth. Labels match exactly, case included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
  pub label: String,
  pub score: ScoreValue,
}

impl LabelRule {
  pub fn new(label: impl Into<String>, score: ScoreValue) -> Self {
    LabelRule {
      label: label.into(),
      score,
    }
  }
}

/// How a pull request's labels turn into a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClassificationPolicy {
  /// Tiers are tried in list order and the first one present wins.
  TieredExclusive { tiers: Vec<LabelRule> },

  /// The gate label must be present along with exactly one tier label.
  GatedExactOne { gate: String, tiers: Vec<LabelRule> },

  /// Every pull request is worth the same, labels are ignored.
  Flat { score: ScoreValue },
}

/// Outcome of classifying one pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'p> {
  Qualifies { tier: Option<&'p str>, score: ScoreValue },
  NoTier,
  MissingGate,
  Ambiguous { matched: usize },
}

impl Classification<'_> {
  pub fn score(&self) -> Option<ScoreValue> {
    match self {
      Classification::Qualifies { score, .. } => Some(*score),
      _ => None,
    }
  }
}

impl ClassificationPolicy {
  pub fn tiers(&self) -> &[LabelRule] {
    match self {
      ClassificationPolicy::TieredExclusive { tiers }
      | ClassificationPolicy::GatedExactOne { tiers, .. } => tiers,
      ClassificationPolicy::Flat { .. } => &[],
    }
  }

  pub fn classify<'p>(&'p self, labels: &BTreeSet<String>) -> Classification<'p> {
    match self {
      ClassificationPolicy::TieredExclusive { tiers } => tiers
        .iter()
        .find(|rule| labels.contains(&rule.label))
        .map_or(Classification::NoTier, |rule| Classification::Qualifies {
          tier: Some(rule.label.as_str()),
          score: rule.score,
        }),

      ClassificationPolicy::GatedExactOne { gate, tiers } => {
        if !labels.contains(gate) {
          return Classification::MissingGate;
        }

        let mut present = tiers.iter().filter(|rule| labels.contains(&rule.label));
        match (present.next(), present.count()) {
          (None, _) => Classification::NoTier,
          (Some(rule), 0) => Classification::Qualifies {
            tier: Some(rule.label.as_str()),
            score: rule.score,
          },
          (Some(_), extra) => Classification::Ambiguous { matched: extra + 1 },
        }
      }

      ClassificationPolicy::Flat { score } => Classification::Qualifies {
        tier: None,
        score: *score,
      },
    }
  }
}
