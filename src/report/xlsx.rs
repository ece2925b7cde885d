use std::path::Path;

use rust_xlsxwriter::{DocProperties, Format, Workbook};

use super::{csv::HEADER, ranked};
use crate::error::Result;
use crate::scoring::ScoreBoard;

pub const SHEET_NAME: &str = "Scores";
pub const AVATAR_COLUMN: &str = "Avatar";

/// Header row: the CSV columns, the avatar, then the tier labels credited on `board`.
pub fn column_titles(board: &ScoreBoard) -> Vec<&str> {
  let mut titles: Vec<&str> = HEADER.to_vec();
  titles.push(AVATAR_COLUMN);
  titles.extend(board.tier_labels());
  titles
}

/// Build the workbook in memory. Same leading columns and row order as the CSV report, followed
/// by the avatar and one pull request count per tier label.
pub fn render(board: &ScoreBoard) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  workbook.set_properties(&DocProperties::new().set_author("contributor-scores"));

  {
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;
    let bold_format = Format::new().set_bold();

    let titles = column_titles(board);
    for (col, title) in titles.iter().enumerate() {
      worksheet.write_string_with_format(0, col as u16, *title, &bold_format)?;
    }
    let first_tier_col = HEADER.len() + 1;
    let tiers = &titles[first_tier_col..];
    worksheet.set_freeze_panes(1, 0)?;

    for (idx, record) in ranked(board).into_iter().enumerate() {
      let row = (idx + 1) as u32;
      worksheet.write_string(row, 0, &record.display_name)?;
      worksheet.write_string(row, 1, &record.handle)?;
      worksheet.write_number(row, 2, record.pr_count)?;
      worksheet.write_number(row, 3, record.score as f64)?;
      if let Some(avatar) = &record.avatar_url {
        worksheet.write_string(row, 4, avatar)?;
      }
      for (offset, tier) in tiers.iter().enumerate() {
        let count = record.tier_counts.get(*tier).copied().unwrap_or(0);
        worksheet.write_number(row, (first_tier_col + offset) as u16, count)?;
      }
    }

    worksheet.autofit();
  }

  Ok(workbook.save_to_buffer()?)
}

/// Write to `path`, replacing whatever was there.
pub fn write_file(board: &ScoreBoard, path: &Path) -> Result<()> {
  std::fs::write(path, render(board)?)?;
  Ok(())
}
