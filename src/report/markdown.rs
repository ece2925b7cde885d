use chrono::{DateTime, Utc};

use super::ranked;
use crate::scoring::{PullRequestRef, ScoreBoard};

pub const DEFAULT_TITLE: &str = "Contributors";

const TABLE_HEADER: &str = "| Name | GitHub Handle | PR Link | Score |\n|------|---------------|---------|-------|\n";

#[derive(Debug, Clone)]
pub struct MarkdownOptions {
  pub title: String,
  /// Printed under the title when set. Leave unset for reproducible output.
  pub generated_at: Option<DateTime<Utc>>,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    MarkdownOptions {
      title: DEFAULT_TITLE.to_string(),
      generated_at: None,
    }
  }
}

/// Pipes would split a table cell.
fn escape_cell(text: &str) -> String {
  text.replace('|', "\\|").replace('\n', " ")
}

fn pr_links(pull_requests: &[PullRequestRef]) -> String {
  let mut sorted: Vec<&PullRequestRef> = pull_requests.iter().collect();
  sorted.sort_by_key(|pr| pr.number);

  let links: Vec<String> = sorted
    .into_iter()
    .map(|pr| match &pr.html_url {
      Some(url) => format!("[#{}]({})", pr.number, url),
      None => format!("#{}", pr.number),
    })
    .collect();

  if links.is_empty() {
    "-".to_string()
  } else {
    links.join(", ")
  }
}

pub fn render(board: &ScoreBoard, options: &MarkdownOptions) -> String {
  let mut out = format!("# {}\n\n", options.title);

  if let Some(at) = options.generated_at {
    out.push_str(&format!(
      "_Last updated: {}_\n\n",
      at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
  }

  out.push_str(TABLE_HEADER);
  for record in ranked(board) {
    out.push_str(&format!(
      "| {} | @{} | {} | {} |\n",
      escape_cell(&record.display_name),
      record.handle,
      pr_links(&record.pull_requests),
      record.score
    ));
  }

  out
}
