//! Tests for `ResolutionStatus` and `ResolutionOutcome`.

use super::{ResolutionOutcome, ResolutionStatus};

#[test]
fn display() {
  assert_eq!(ResolutionStatus::NotStarted.to_string(), "not_started");
  assert_eq!(ResolutionStatus::InProgress.to_string(), "in_progress");
  assert_eq!(ResolutionStatus::Succeeded.to_string(), "succeeded");
  assert_eq!(ResolutionStatus::Failed.to_string(), "failed");
  assert_eq!(ResolutionStatus::Skipped.to_string(), "skipped");
}

#[test]
fn terminal_states() {
  assert!(!ResolutionStatus::NotStarted.is_terminal());
  assert!(!ResolutionStatus::InProgress.is_terminal());
  assert!(ResolutionStatus::Succeeded.is_terminal());
  assert!(ResolutionStatus::Failed.is_terminal());
  assert!(ResolutionStatus::Skipped.is_terminal());
}

#[test]
fn outcome_status() {
  assert_eq!(
    ResolutionOutcome::InProgress.status(),
    ResolutionStatus::InProgress
  );
  assert_eq!(
    ResolutionOutcome::Failed {
      reason: "boom".to_string()
    }
    .status(),
    ResolutionStatus::Failed
  );
  assert_eq!(ResolutionOutcome::Skipped.status(), ResolutionStatus::Skipped);
}
