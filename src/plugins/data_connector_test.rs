//! Tests for `DataConnector`.

use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::{TimeDelta, Utc};

use super::{ActivationCondition, Plugin, Resolution};
use crate::error::{PluginError, ResolutionError};
use crate::test_support::{counting_connector, failing_connector, static_connector};
use crate::types::{Attribute, ResolutionContext, WorkContext};

#[tokio::test]
async fn produces_attribute_map() {
  let (mut c, calls) = counting_connector("ldap", vec![Attribute::with_values("uid", ["alice"])]);
  c.initialize().unwrap();
  let map = c
    .resolve(&ResolutionContext::new("alice"), &WorkContext::new())
    .await
    .unwrap()
    .into_value()
    .unwrap();
  assert!(map.contains_key("uid"));
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert!(c.last_fail().is_none());
}

#[tokio::test]
async fn inactive_connector_skipped() {
  let (mut c, calls) = counting_connector("ldap", vec![Attribute::with_values("uid", ["alice"])]);
  c.set_activation_condition(ActivationCondition::never())
    .unwrap();
  c.initialize().unwrap();
  let r = c
    .resolve(&ResolutionContext::new("alice"), &WorkContext::new())
    .await
    .unwrap();
  assert!(matches!(r, Resolution::Skipped));
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failure_records_last_fail() {
  let (mut c, _) = failing_connector("ldap", PluginError::failed("connection refused"));
  c.set_no_retry_delay(Duration::from_secs(300)).unwrap();
  c.initialize().unwrap();
  let before = Utc::now();
  let err = c
    .resolve(&ResolutionContext::new("alice"), &WorkContext::new())
    .await
    .unwrap_err();
  assert!(matches!(err, ResolutionError::Plugin { .. }));
  let last = c.last_fail().unwrap();
  assert!(last >= before);
  assert!(c.is_suppressed(last + TimeDelta::seconds(10)));
  assert!(!c.is_suppressed(last + TimeDelta::seconds(301)));
}

#[tokio::test]
async fn expected_failures_do_not_trip_breaker() {
  for error in [PluginError::NoResult, PluginError::MultipleResults] {
    let (mut c, _) = failing_connector("ldap", error);
    c.set_no_retry_delay(Duration::from_secs(300)).unwrap();
    c.initialize().unwrap();
    let r = c
      .resolve(&ResolutionContext::new("alice"), &WorkContext::new())
      .await;
    assert!(r.is_err());
    assert!(c.last_fail().is_none());
  }
}

#[tokio::test]
async fn swallowed_failure_still_trips_breaker() {
  let (mut c, _) = failing_connector("ldap", PluginError::failed("down"));
  c.set_propagate_errors(false).unwrap();
  c.initialize().unwrap();
  let r = c
    .resolve(&ResolutionContext::new("alice"), &WorkContext::new())
    .await
    .unwrap();
  assert!(matches!(r, Resolution::Failed(_)));
  assert!(c.last_fail().is_some());
}

#[test]
fn failover_configuration() {
  let mut c = static_connector("ldap", vec![Attribute::with_values("uid", ["alice"])]);
  c.set_failover_connector_id("  ").unwrap();
  assert_eq!(c.failover_connector_id(), None);
  c.set_failover_connector_id(" backup ").unwrap();
  assert_eq!(c.failover_connector_id(), Some("backup"));
  c.initialize().unwrap();
  assert!(c.set_failover_connector_id("other").is_err());
  assert!(c.set_no_retry_delay(Duration::from_secs(1)).is_err());
}

#[test]
fn own_failover_rejected() {
  let mut c = static_connector("ldap", vec![Attribute::with_values("uid", ["alice"])]);
  c.set_failover_connector_id("ldap").unwrap();
  assert!(matches!(
    c.initialize(),
    Err(ResolutionError::InvalidConfiguration { .. })
  ));
}

#[test]
fn destroy_is_idempotent() {
  let mut c = static_connector("ldap", vec![Attribute::with_values("uid", ["alice"])]);
  c.initialize().unwrap();
  c.destroy();
  c.destroy();
  assert!(c.is_destroyed());
  assert!(!c.is_initialized());
  assert!(c.activation_condition().is_some());
}
