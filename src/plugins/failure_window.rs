//! Circuit-breaker state of a data connector, shared by every request.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Last failure time of a connector plus how long to suppress retries after it.
///
/// A zero delay disables suppression.
#[derive(Debug, Default)]
pub struct FailureWindow {
  last_fail: Mutex<Option<DateTime<Utc>>>,
  no_retry_delay: Duration,
}

impl FailureWindow {
  pub fn new(no_retry_delay: Duration) -> Self {
    Self {
      last_fail: Mutex::new(None),
      no_retry_delay,
    }
  }

  pub fn no_retry_delay(&self) -> Duration {
    self.no_retry_delay
  }

  pub(crate) fn set_no_retry_delay(&mut self, delay: Duration) {
    self.no_retry_delay = delay;
  }

  pub fn last_fail(&self) -> Option<DateTime<Utc>> {
    *self.last_fail.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn record_failure(&self, at: DateTime<Utc>) {
    *self.last_fail.lock().unwrap_or_else(|e| e.into_inner()) = Some(at);
  }

  pub fn clear(&self) {
    *self.last_fail.lock().unwrap_or_else(|e| e.into_inner()) = None;
  }

  /// True while `now` is still inside the retry delay following the last failure.
  pub fn is_suppressed(&self, now: DateTime<Utc>) -> bool {
    if self.no_retry_delay.is_zero() {
      return false;
    }
    let Some(last) = self.last_fail() else {
      return false;
    };
    match TimeDelta::from_std(self.no_retry_delay) {
      Ok(delay) => last.checked_add_signed(delay).is_none_or(|until| now < until),
      Err(_) => true,
    }
  }
}
