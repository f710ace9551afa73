//! Tests for `StaticDataConnector`.

use super::StaticDataConnector;
use crate::error::ResolutionError;
use crate::plugins::DataConnector;
use crate::types::{Attribute, ResolutionContext, WorkContext};

#[tokio::test]
async fn returns_configured_attributes_every_time() {
  let mut c = DataConnector::new(
    "static",
    StaticDataConnector::new([
      Attribute::with_values("eduPersonAffiliation", ["member", "staff"]),
      Attribute::with_values("o", ["Example"]),
    ]),
  );
  c.initialize().unwrap();
  let ctx = ResolutionContext::new("alice");
  for _ in 0..2 {
    let map = c
      .resolve(&ctx, &WorkContext::new())
      .await
      .unwrap()
      .into_value()
      .unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["eduPersonAffiliation"].values.len(), 2);
  }
  assert_eq!(c.kind(), "static");
}

#[test]
fn empty_configuration_fails_initialize() {
  let mut c = DataConnector::new("static", StaticDataConnector::default());
  assert!(matches!(
    c.initialize(),
    Err(ResolutionError::InvalidConfiguration { .. })
  ));
}
