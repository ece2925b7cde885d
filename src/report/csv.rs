use std::fs::File;
use std::io;
use std::path::Path;

use super::ranked;
use crate::error::Result;
use crate::scoring::ScoreBoard;

pub const HEADER: [&str; 4] = ["Name", "GitHub ID", "PR Count", "Total Score"];

pub fn write<W: io::Write>(board: &ScoreBoard, writer: W) -> Result<()> {
  let mut csv_writer = csv::Writer::from_writer(writer);

  csv_writer.write_record(HEADER)?;
  for record in ranked(board) {
    csv_writer.write_record([
      record.display_name.as_str(),
      record.handle.as_str(),
      record.pr_count.to_string().as_str(),
      record.score.to_string().as_str(),
    ])?;
  }

  csv_writer.flush()?;
  Ok(())
}

/// Render to an in-memory string.
pub fn render(board: &ScoreBoard) -> Result<String> {
  let mut buf = Vec::new();
  write(board, &mut buf)?;
  Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write to `path`, replacing whatever was there.
pub fn write_file(board: &ScoreBoard, path: &Path) -> Result<()> {
  write(board, File::create(path)?)
}
