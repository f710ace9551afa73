//! Tests for building resolvers from JSON configuration.

use std::time::Duration;

use serde_json::json;

use crate::config::{ConnectorKind, DefinitionKind, ResolverConfig, SourceValueConfig};
use crate::error::ResolutionError;
use crate::plugins::Plugin;
use crate::types::{AttributeValue, PluginDependency, ResolutionContext};

fn directory_config() -> serde_json::Value {
  json!({
    "id": "idp",
    "connectors": [
      {
        "id": "directory",
        "type": "static",
        "failover": "backup",
        "no_retry_delay_ms": 30000,
        "attributes": {
          "uid": ["alice"],
          "affiliation": ["employee", "stu", "guest"],
          "eppn": ["alice@example.org"],
          "givenName": ["Alice"],
          "sn": ["Smith"]
        }
      },
      {
        "id": "backup",
        "type": "static",
        "propagate_errors": false,
        "attributes": { "uid": ["alice"] }
      }
    ],
    "definitions": [
      {
        "id": "uid",
        "type": "simple",
        "dependencies": [{ "plugin": "directory", "attribute": "uid" }],
        "display_names": { "en": "User ID" },
        "encoders": [{ "protocol": "saml2", "name": "urn:oid:0.9.2342.19200300.100.1.1" }]
      },
      {
        "id": "scopedUid",
        "type": "scoped",
        "scope": "example.org",
        "dependencies": [{ "plugin": "uid" }]
      },
      {
        "id": "eppn",
        "type": "prescoped",
        "dependencies": [{ "plugin": "directory", "attribute": "eppn" }]
      },
      {
        "id": "affiliation",
        "type": "mapped",
        "dependencies": [{ "plugin": "directory", "attribute": "affiliation" }],
        "default_value": "affiliate",
        "value_maps": [
          { "return_value": "staff", "source_values": [{ "pattern": "emp.*" }] },
          { "return_value": "student", "source_values": [{ "partial": "stu" }] }
        ]
      },
      {
        "id": "localPart",
        "type": "regex_split",
        "regex": "([^@]+)@.*",
        "dependencies": [{ "plugin": "directory", "attribute": "eppn" }]
      },
      {
        "id": "displayName",
        "type": "template",
        "template": "${givenName} ${sn}",
        "dependencies": [{ "plugin": "directory" }]
      },
      {
        "id": "principal",
        "type": "principal_name",
        "dependency_only": true,
        "active_for_recipients": ["https://sp.example.org"]
      }
    ]
  })
}

#[test]
fn parses_every_plugin_kind() {
  let config: ResolverConfig = serde_json::from_value(directory_config()).unwrap();
  assert_eq!(config.id, "idp");
  assert_eq!(config.connectors.len(), 2);
  assert_eq!(config.connectors[0].failover.as_deref(), Some("backup"));
  assert!(config.connectors[0].settings.propagate_errors);
  assert!(!config.connectors[1].settings.propagate_errors);
  assert!(matches!(&config.connectors[0].kind, ConnectorKind::Static { attributes } if attributes.len() == 5));

  let kinds: Vec<&DefinitionKind> = config.definitions.iter().map(|d| &d.kind).collect();
  assert!(matches!(kinds[0], DefinitionKind::Simple));
  assert!(matches!(kinds[1], DefinitionKind::Scoped { scope } if scope == "example.org"));
  assert!(matches!(kinds[2], DefinitionKind::Prescoped { delimiter: None }));
  match kinds[3] {
    DefinitionKind::Mapped { value_maps, .. } => {
      assert_eq!(value_maps[0].source_values, [SourceValueConfig::Pattern("emp.*".into())]);
      assert_eq!(value_maps[1].source_values, [SourceValueConfig::Partial("stu".into())]);
    }
    other => panic!("expected mapped definition, got {:?}", other),
  }
  assert!(matches!(kinds[4], DefinitionKind::RegexSplit { .. }));
  assert!(matches!(kinds[5], DefinitionKind::Template { template: Some(_), .. }));
  assert!(matches!(kinds[6], DefinitionKind::PrincipalName));
  assert_eq!(
    config.definitions[0].settings.dependencies,
    [PluginDependency::on_attribute("directory", "uid")]
  );
}

#[test]
fn defaults_apply() {
  let config: ResolverConfig = serde_json::from_value(json!({})).unwrap();
  assert_eq!(config.id, "resolver");
  assert!(config.connectors.is_empty());
  assert!(config.build().unwrap().evaluation_order().is_empty());
}

#[test]
fn builds_configured_plugins() {
  let config: ResolverConfig = serde_json::from_value(directory_config()).unwrap();
  let resolver = config.build().unwrap();
  assert_eq!(resolver.id(), "idp");

  let directory = resolver.data_connector("directory").unwrap();
  assert_eq!(directory.failover_connector_id(), Some("backup"));
  assert_eq!(directory.no_retry_delay(), Duration::from_secs(30));
  assert!(directory.is_initialized());

  let uid = resolver.attribute_definition("uid").unwrap();
  assert_eq!(uid.kind(), "simple");
  assert_eq!(uid.display_names()["en"], "User ID");
  assert_eq!(uid.encoders().len(), 1);

  let principal = resolver.attribute_definition("principal").unwrap();
  assert!(principal.is_dependency_only());
  assert!(principal.activation_condition().is_some());
}

#[tokio::test]
async fn built_resolver_resolves() {
  let config: ResolverConfig = serde_json::from_value(directory_config()).unwrap();
  let resolver = config.build().unwrap();
  let mut context = ResolutionContext::new("alice").with_recipient("https://sp.example.org");
  resolver.resolve_attributes(&mut context).await.unwrap();
  let released = &context.resolved_attributes;

  assert_eq!(
    released["scopedUid"].values,
    vec![AttributeValue::scoped("alice", "example.org")]
  );
  assert_eq!(
    released["eppn"].values,
    vec![AttributeValue::scoped("alice", "example.org")]
  );
  assert_eq!(
    released["affiliation"].values,
    vec![
      AttributeValue::string("staff"),
      AttributeValue::string("student"),
      AttributeValue::string("affiliate"),
    ]
  );
  assert_eq!(released["localPart"].values, vec![AttributeValue::string("alice")]);
  assert_eq!(
    released["displayName"].values,
    vec![AttributeValue::string("Alice Smith")]
  );
  assert_eq!(released["uid"].display_names["en"], "User ID");
  assert!(!released.contains_key("principal"));
}

#[test]
fn save_then_load() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("resolver.json");
  let config: ResolverConfig = serde_json::from_value(directory_config()).unwrap();
  config.save(&path).unwrap();
  assert_eq!(ResolverConfig::load(&path).unwrap(), config);
}

#[test]
fn load_errors() {
  let dir = tempfile::tempdir().unwrap();
  let missing = ResolverConfig::load(dir.path().join("absent.json")).unwrap_err();
  assert!(matches!(missing, ResolutionError::Io(_)));
  assert!(!missing.is_configuration_error());

  let path = dir.path().join("broken.json");
  std::fs::write(&path, "{ \"definitions\": [ { \"id\": \"x\" } ] }").unwrap();
  let broken = ResolverConfig::load(&path).unwrap_err();
  assert!(matches!(broken, ResolutionError::Config(_)));
  assert!(broken.is_configuration_error());
}

#[test]
fn invalid_regex_is_a_configuration_error() {
  let config: ResolverConfig = serde_json::from_value(json!({
    "connectors": [{ "id": "c", "type": "static", "attributes": { "a": ["1"] } }],
    "definitions": [{
      "id": "split",
      "type": "regex_split",
      "regex": "(unclosed",
      "dependencies": [{ "plugin": "c" }]
    }]
  }))
  .unwrap();
  let err = config.build().unwrap_err();
  assert!(matches!(&err, ResolutionError::InvalidConfiguration { plugin_id, .. } if plugin_id == "split"));
  assert!(err.is_configuration_error());
}

#[test]
fn graph_errors_surface_from_build() {
  let config: ResolverConfig = serde_json::from_value(json!({
    "definitions": [
      { "id": "a", "type": "simple", "dependencies": [{ "plugin": "b" }] },
      { "id": "b", "type": "simple", "dependencies": [{ "plugin": "a" }] }
    ]
  }))
  .unwrap();
  assert!(matches!(
    config.build(),
    Err(ResolutionError::CircularDependency { .. })
  ));

  let config: ResolverConfig = serde_json::from_value(json!({
    "connectors": [{ "id": "c", "type": "static", "attributes": {}, "failover": "nowhere" }]
  }))
  .unwrap();
  let err = config.build().unwrap_err();
  assert!(err.is_configuration_error());
}
