//! Tests for dependency graph validation and ordering.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::definitions::SimpleDefinition;
use crate::error::ResolutionError;
use crate::graph_validation::DependencyGraph;
use crate::plugins::{AttributeDefinition, ResolverPlugin};
use crate::test_support::static_connector;
use crate::types::{Attribute, PluginDependency};

fn definition(id: &str, deps: &[&str]) -> ResolverPlugin {
  let mut d = AttributeDefinition::new(id, SimpleDefinition);
  d.set_dependencies(deps.iter().map(|dep| PluginDependency::on_plugin(*dep)))
    .unwrap();
  ResolverPlugin::Definition(Arc::new(d))
}

fn connector(id: &str, failover: Option<&str>) -> ResolverPlugin {
  let mut c = static_connector(id, vec![Attribute::with_values("uid", ["alice"])]);
  if let Some(failover) = failover {
    c.set_failover_connector_id(failover).unwrap();
  }
  ResolverPlugin::Connector(Arc::new(c))
}

fn plugins(list: Vec<ResolverPlugin>) -> BTreeMap<String, ResolverPlugin> {
  list
    .into_iter()
    .map(|p| (p.as_plugin().id().to_string(), p))
    .collect()
}

fn position(order: &[String], id: &str) -> usize {
  order.iter().position(|o| o == id).unwrap()
}

#[test]
fn orders_dependencies_first() {
  let graph = DependencyGraph::from_plugins(&plugins(vec![
    definition("a", &["b"]),
    definition("b", &["c"]),
    definition("c", &["ldap"]),
    connector("ldap", None),
  ]))
  .unwrap();
  assert_eq!(graph.len(), 4);
  let order = graph.topological_order().unwrap();
  assert!(position(&order, "ldap") < position(&order, "c"));
  assert!(position(&order, "c") < position(&order, "b"));
  assert!(position(&order, "b") < position(&order, "a"));
}

#[test]
fn diamond_lists_each_node_once() {
  let mut graph = DependencyGraph::new();
  graph.add_edge("top", "left");
  graph.add_edge("top", "right");
  graph.add_edge("left", "base");
  graph.add_edge("right", "base");
  graph.add_edge("right", "base");
  let order = graph.topological_order().unwrap();
  assert_eq!(order.len(), 4);
  assert_eq!(order.first().map(String::as_str), Some("base"));
  assert_eq!(order.last().map(String::as_str), Some("top"));
}

#[test]
fn self_dependency_is_a_cycle() {
  let graph = DependencyGraph::from_plugins(&plugins(vec![definition("a", &["a"])])).unwrap();
  match graph.topological_order() {
    Err(ResolutionError::CircularDependency { cycle }) => assert_eq!(cycle, ["a", "a"]),
    other => panic!("expected a cycle, got {:?}", other),
  }
}

#[test]
fn reports_cycle_path() {
  let graph = DependencyGraph::from_plugins(&plugins(vec![
    definition("a", &["b"]),
    definition("b", &["c"]),
    definition("c", &["b"]),
  ]))
  .unwrap();
  let err = graph.topological_order().unwrap_err();
  match &err {
    ResolutionError::CircularDependency { cycle } => assert_eq!(cycle, &["b", "c", "b"]),
    other => panic!("expected a cycle, got {:?}", other),
  }
  assert!(err.to_string().contains("b -> c -> b"));
}

#[test]
fn failover_loop_is_a_cycle() {
  let graph = DependencyGraph::from_plugins(&plugins(vec![
    connector("primary", Some("secondary")),
    connector("secondary", Some("primary")),
  ]))
  .unwrap();
  assert!(matches!(
    graph.topological_order(),
    Err(ResolutionError::CircularDependency { .. })
  ));
}

#[test]
fn rejects_missing_dependency() {
  let err = DependencyGraph::from_plugins(&plugins(vec![definition("a", &["nowhere"])])).unwrap_err();
  match err {
    ResolutionError::MissingDependency {
      plugin_id,
      dependency_id,
    } => {
      assert_eq!(plugin_id, "a");
      assert_eq!(dependency_id, "nowhere");
    }
    other => panic!("expected a missing dependency, got {:?}", other),
  }
}

#[test]
fn failover_must_be_a_connector() {
  let err = DependencyGraph::from_plugins(&plugins(vec![
    connector("ldap", Some("a")),
    definition("a", &[]),
  ]))
  .unwrap_err();
  assert!(matches!(err, ResolutionError::UnknownFailover { .. }));
  assert!(err.is_configuration_error());

  let err =
    DependencyGraph::from_plugins(&plugins(vec![connector("ldap", Some("missing"))])).unwrap_err();
  assert!(matches!(err, ResolutionError::UnknownFailover { .. }));
}

#[test]
fn empty_graph_has_empty_order() {
  let graph = DependencyGraph::new();
  assert!(graph.is_empty());
  assert!(graph.topological_order().unwrap().is_empty());
}
