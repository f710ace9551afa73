//! Per-request state of one plugin in the work context.

use std::fmt;

use crate::plugins::ResolvedPlugin;

/// Status of a plugin within one resolution request.
///
/// `NotStarted -> InProgress -> {Succeeded, Failed, Skipped}`; terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
  NotStarted,
  InProgress,
  Succeeded,
  Failed,
  Skipped,
}

impl ResolutionStatus {
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      ResolutionStatus::Succeeded | ResolutionStatus::Failed | ResolutionStatus::Skipped
    )
  }
}

impl fmt::Display for ResolutionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ResolutionStatus::NotStarted => write!(f, "not_started"),
      ResolutionStatus::InProgress => write!(f, "in_progress"),
      ResolutionStatus::Succeeded => write!(f, "succeeded"),
      ResolutionStatus::Failed => write!(f, "failed"),
      ResolutionStatus::Skipped => write!(f, "skipped"),
    }
  }
}

/// Recorded outcome of a plugin within one resolution request.
#[derive(Debug, Clone)]
pub enum ResolutionOutcome {
  InProgress,
  Succeeded(ResolvedPlugin),
  /// Resolution was attempted and failed; the failure may have been swallowed.
  Failed { reason: String },
  /// Activation condition was not met.
  Skipped,
}

impl ResolutionOutcome {
  pub fn status(&self) -> ResolutionStatus {
    match self {
      ResolutionOutcome::InProgress => ResolutionStatus::InProgress,
      ResolutionOutcome::Succeeded(_) => ResolutionStatus::Succeeded,
      ResolutionOutcome::Failed { .. } => ResolutionStatus::Failed,
      ResolutionOutcome::Skipped => ResolutionStatus::Skipped,
    }
  }
}
