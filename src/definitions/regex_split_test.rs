//! Tests for `RegexSplitDefinition`.

use super::RegexSplitDefinition;
use crate::error::ResolutionError;
use crate::test_support::{run_definition, work_with_connector};
use crate::types::{Attribute, AttributeValue, EmptyValue, PluginDependency};

#[tokio::test]
async fn extracts_first_group_of_full_matches() {
  let mut mail = Attribute::with_values("mail", ["alice@example.org", "not-an-address"]);
  mail.values.push(AttributeValue::empty(EmptyValue::Null));
  let work = work_with_connector("ldap", vec![mail]);
  let a = run_definition(
    RegexSplitDefinition::new("([^@]+)@.*").unwrap(),
    vec![PluginDependency::on_attribute("ldap", "mail")],
    &work,
  )
  .await
  .unwrap()
  .unwrap();
  assert_eq!(a.values, vec![AttributeValue::string("alice")]);
}

#[tokio::test]
async fn partial_match_is_not_enough() {
  let work = work_with_connector("ldap", vec![Attribute::with_values("uid", ["xalice"])]);
  let a = run_definition(
    RegexSplitDefinition::new("(alice)").unwrap(),
    vec![PluginDependency::on_plugin("ldap")],
    &work,
  )
  .await
  .unwrap()
  .unwrap();
  assert!(a.values.is_empty());
}

#[tokio::test]
async fn pattern_without_group_fails_initialize() {
  let work = work_with_connector("ldap", vec![Attribute::with_values("uid", ["alice"])]);
  let r = run_definition(
    RegexSplitDefinition::new("alice").unwrap(),
    vec![PluginDependency::on_plugin("ldap")],
    &work,
  )
  .await;
  assert!(matches!(r, Err(ResolutionError::InvalidConfiguration { .. })));
}

#[test]
fn invalid_pattern_rejected() {
  assert!(RegexSplitDefinition::new("(unclosed").is_err());
}
