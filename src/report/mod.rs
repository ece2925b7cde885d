//! Report rendering. Every renderer walks the board in [`ranked`] order so identical input
//! always produces identical bytes.

pub mod csv;
pub mod markdown;
pub mod xlsx;

use std::cmp::Reverse;

use crate::scoring::{ScoreBoard, ScoreRecord};

/// Records ordered by descending score, then descending pull request count, then handle.
pub fn ranked(board: &ScoreBoard) -> Vec<&ScoreRecord> {
  let mut rows: Vec<&ScoreRecord> = board.records().collect();
  rows.sort_by(|a, b| {
    (Reverse(a.score), Reverse(a.pr_count), &a.handle).cmp(&(
      Reverse(b.score),
      Reverse(b.pr_count),
      &b.handle,
    ))
  });
  rows
}
