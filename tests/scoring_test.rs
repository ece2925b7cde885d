use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use contributor_scores::config::{Preset, ScoringProfile};
use contributor_scores::models::PullRequest;
use contributor_scores::scoring::{aggregate, Classification, ClassificationPolicy, LabelRule};

fn labels(names: &[&str]) -> BTreeSet<String> {
  names.iter().map(|n| n.to_string()).collect()
}

fn pr(number: u64, author: &str, merged: bool, names: &[&str]) -> PullRequest {
  PullRequest {
    id: 1000 + number,
    number,
    html_url: Some(format!("https://github.com/acme/widgets/pull/{number}")),
    author: author.to_string(),
    author_avatar: None,
    merged_at: merged.then(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
    labels: labels(names),
  }
}

fn tiered() -> ClassificationPolicy {
  ScoringProfile::preset(Preset::Tiered).policy
}

fn gated() -> ClassificationPolicy {
  ScoringProfile::preset(Preset::Gated).policy
}

#[test]
fn test_tiered_highest_tier_wins() {
  let policy = tiered();
  assert_eq!(policy.classify(&labels(&["Level 1", "Level 3"])).score(), Some(45));
  assert_eq!(policy.classify(&labels(&["Level 2", "Level 1"])).score(), Some(25));
  assert_eq!(policy.classify(&labels(&["Level 1"])).score(), Some(10));
}

#[test]
fn test_tier_order_is_list_order() {
  let policy = ClassificationPolicy::TieredExclusive {
    tiers: vec![LabelRule::new("small", 1), LabelRule::new("large", 9)],
  };
  assert_eq!(policy.classify(&labels(&["large", "small"])).score(), Some(1));
}

#[test]
fn test_unrecognized_labels_score_nothing() {
  let unrecognized = [
    labels(&[]),
    labels(&["bug"]),
    labels(&["documentation", "good first issue"]),
    labels(&["level 1"]),
    labels(&["Level 4", "gssoc25"]),
  ];

  for set in &unrecognized {
    assert_eq!(tiered().classify(set).score(), None, "{set:?}");
  }

  let prs: Vec<PullRequest> = unrecognized
    .iter()
    .enumerate()
    .map(|(i, set)| PullRequest {
      labels: set.clone(),
      ..pr(i as u64, "alice", true, &[])
    })
    .collect();
  let board = aggregate(&prs, &tiered());
  assert!(board.is_empty());
  assert_eq!(board.total_score(), 0);
}

#[test]
fn test_gated_requires_the_gate() {
  assert_eq!(
    gated().classify(&labels(&["level 2"])),
    Classification::MissingGate
  );
  assert_eq!(gated().classify(&labels(&["gssoc25", "level 2"])).score(), Some(7));
}

#[test]
fn test_gated_excludes_zero_or_several_tiers() {
  let policy = gated();
  assert_eq!(policy.classify(&labels(&["gssoc25"])), Classification::NoTier);

  for set in [
    labels(&["gssoc25", "level 1", "level 2"]),
    labels(&["gssoc25", "level 1", "level 3"]),
    labels(&["gssoc25", "level 1", "level 2", "level 3"]),
  ] {
    let outcome = policy.classify(&set);
    assert!(matches!(outcome, Classification::Ambiguous { .. }), "{set:?}");
    assert_eq!(outcome.score(), None);
  }

  assert_eq!(
    gated().classify(&labels(&["gssoc25", "level 1", "level 2", "level 3"])),
    Classification::Ambiguous { matched: 3 }
  );
}

#[test]
fn test_unmerged_pull_requests_are_excluded() {
  let prs = vec![
    pr(1, "alice", false, &["gssoc25", "level 3"]),
    pr(2, "bob", true, &["gssoc25", "level 1"]),
  ];
  let board = aggregate(&prs, &gated());

  assert!(!board.contains("alice"));
  assert_eq!(board.get("bob").unwrap().score, 3);
}

#[test]
fn test_flat_counts_every_merged_pull_request() {
  let prs = vec![
    pr(1, "alice", true, &[]),
    pr(2, "alice", true, &["bug"]),
    pr(3, "alice", false, &[]),
  ];
  let board = aggregate(&prs, &ScoringProfile::preset(Preset::Flat).policy);

  let alice = board.get("alice").unwrap();
  assert_eq!(alice.pr_count, 2);
  assert_eq!(alice.score, 2);
}

#[test]
fn test_board_total_equals_sum_of_qualifying_tiers() {
  let prs = vec![
    pr(1, "alice", true, &["gssoc25", "level 1"]),
    pr(2, "alice", true, &["gssoc25", "level 3"]),
    pr(3, "bob", true, &["gssoc25", "level 2"]),
    pr(4, "bob", true, &["gssoc25", "level 1", "level 2"]),
    pr(5, "carol", true, &["level 3"]),
    pr(6, "dave", false, &["gssoc25", "level 3"]),
  ];
  let policy = gated();
  let board = aggregate(&prs, &policy);

  let expected: u64 = prs
    .iter()
    .filter(|p| p.is_merged())
    .filter_map(|p| policy.classify(&p.labels).score())
    .map(u64::from)
    .sum();

  assert_eq!(expected, 20);
  assert_eq!(board.total_score(), expected);
  assert_eq!(board.total_pull_requests(), 3);

  let alice = board.get("alice").unwrap();
  assert_eq!((alice.pr_count, alice.score), (2, 13));
  let bob = board.get("bob").unwrap();
  assert_eq!((bob.pr_count, bob.score), (1, 7));
  assert!(!board.contains("carol"));
  assert!(!board.contains("dave"));
}

#[test]
fn test_first_avatar_and_name_stick() {
  let mut first = pr(1, "alice", true, &["Level 1"]);
  first.author_avatar = Some("https://avatars.example/first".into());
  let mut second = pr(2, "alice", true, &["Level 2"]);
  second.author_avatar = Some("https://avatars.example/second".into());

  let mut board = aggregate(&[first, second], &tiered());
  let alice = board.get("alice").unwrap();
  assert_eq!(alice.display_name, "alice");
  assert_eq!(alice.avatar_url.as_deref(), Some("https://avatars.example/first"));
  assert_eq!(alice.pull_requests.len(), 2);

  assert!(board.set_display_name("alice", "Alice Liddell"));
  assert!(!board.set_display_name("nobody", "Nobody"));
  assert_eq!(board.get("alice").unwrap().display_name, "Alice Liddell");
}

#[test]
fn test_large_tier_values_do_not_overflow() {
  let policy = ClassificationPolicy::Flat {
    score: 3_000_000_000,
  };
  let prs = [pr(1, "alice", true, &[]), pr(2, "alice", true, &[])];

  let board = aggregate(&prs, &policy);
  assert_eq!(board.get("alice").unwrap().score, 6_000_000_000);
  assert_eq!(board.total_score(), 6_000_000_000);
}

#[test]
fn test_tier_counts_follow_the_winning_tier() {
  let prs = [
    pr(1, "alice", true, &["gssoc25", "level 1"]),
    pr(2, "alice", true, &["gssoc25", "level 3"]),
    pr(3, "alice", true, &["gssoc25", "level 3"]),
    pr(4, "alice", true, &["gssoc25", "level 1", "level 2"]),
    pr(5, "bob", true, &["gssoc25", "level 2"]),
  ];

  let board = aggregate(&prs, &gated());
  let alice = board.get("alice").unwrap();
  assert_eq!(alice.tier_counts.get("level 1"), Some(&1));
  assert_eq!(alice.tier_counts.get("level 3"), Some(&2));
  assert_eq!(alice.tier_counts.get("level 2"), None);
  assert_eq!(
    alice.tier_counts.values().sum::<u32>(),
    alice.pr_count
  );
  assert_eq!(
    board.tier_labels().into_iter().collect::<Vec<_>>(),
    vec!["level 1", "level 2", "level 3"]
  );

  let flat = aggregate(&prs, &ClassificationPolicy::Flat { score: 1 });
  assert!(flat.get("alice").unwrap().tier_counts.is_empty());
  assert!(flat.tier_labels().is_empty());
}
