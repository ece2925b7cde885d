pub mod aggregate;
pub mod classifier;

pub use aggregate::{aggregate, PullRequestRef, ScoreBoard, ScoreRecord};
pub use classifier::{Classification, ClassificationPolicy, LabelRule};

pub type ScoreValue = u32;

/// Per-contributor sums are kept wide so no run of `ScoreValue`s can overflow them.
pub type TotalScore = u64;

pub const NO_SCORE: ScoreValue = 0;
pub const FLAT_SCORE: ScoreValue = 1;

// Tier values for the "Level N" labelling scheme, tiered-exclusive.
pub const TIERED_LEVEL_1_SCORE: ScoreValue = 10;
pub const TIERED_LEVEL_2_SCORE: ScoreValue = 25;
pub const TIERED_LEVEL_3_SCORE: ScoreValue = 45;

// Tier values for the gssoc25 scheme, gated-exact-one.
pub const GATED_LEVEL_1_SCORE: ScoreValue = 3;
pub const GATED_LEVEL_2_SCORE: ScoreValue = 7;
pub const GATED_LEVEL_3_SCORE: ScoreValue = 10;
