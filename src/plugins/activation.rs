//! Activation predicates deciding whether a plugin takes part in a request.

use std::fmt;
use std::sync::Arc;

use crate::types::ResolutionContext;

/// Predicate over the request; when it returns false the plugin is skipped for that request.
#[derive(Clone)]
pub struct ActivationCondition(Arc<dyn Fn(&ResolutionContext) -> bool + Send + Sync>);

impl ActivationCondition {
  pub fn new<F>(predicate: F) -> Self
  where
    F: Fn(&ResolutionContext) -> bool + Send + Sync + 'static,
  {
    Self(Arc::new(predicate))
  }

  pub fn never() -> Self {
    Self::new(|_| false)
  }

  /// Active only when the request's relying party is one of `recipients`.
  pub fn for_recipients<I, S>(recipients: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let recipients: Vec<String> = recipients.into_iter().map(Into::into).collect();
    Self::new(move |ctx| {
      ctx
        .attribute_recipient_id
        .as_deref()
        .is_some_and(|r| recipients.iter().any(|x| x == r))
    })
  }

  pub fn is_met(&self, context: &ResolutionContext) -> bool {
    (self.0)(context)
  }
}

impl fmt::Debug for ActivationCondition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ActivationCondition(..)")
  }
}
