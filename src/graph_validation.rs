//! Load-time validation of the plugin dependency graph.

use std::collections::{BTreeMap, HashMap};

use tracing::{instrument, trace};

use crate::error::ResolutionError;
use crate::plugins::ResolverPlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
  Visiting,
  Done,
}

/// Directed graph of plugin ids. An edge `a -> b` means `a` needs `b` resolved first.
///
/// Failover edges count as dependencies, so a failover chain looping back on itself is a cycle.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
  edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds the graph of `plugins`, rejecting dangling dependencies and failovers
  /// that do not name a data connector.
  #[instrument(level = "trace", skip(plugins))]
  pub fn from_plugins(plugins: &BTreeMap<String, ResolverPlugin>) -> Result<Self, ResolutionError> {
    let mut graph = Self::new();
    for (id, plugin) in plugins {
      graph.add_node(id);
      for dependency in plugin.as_plugin().dependencies() {
        if !plugins.contains_key(&dependency.plugin_id) {
          return Err(ResolutionError::MissingDependency {
            plugin_id: id.clone(),
            dependency_id: dependency.plugin_id.clone(),
          });
        }
        graph.add_edge(id, &dependency.plugin_id);
      }
      let failover = match plugin {
        ResolverPlugin::Connector(connector) => connector.failover_connector_id(),
        ResolverPlugin::Definition(_) => None,
      };
      if let Some(failover_id) = failover {
        match plugins.get(failover_id) {
          Some(ResolverPlugin::Connector(_)) => graph.add_edge(id, failover_id),
          _ => {
            return Err(ResolutionError::UnknownFailover {
              plugin_id: id.clone(),
              failover_id: failover_id.to_string(),
            });
          }
        }
      }
    }
    Ok(graph)
  }

  pub fn add_node(&mut self, id: &str) {
    self.edges.entry(id.to_string()).or_default();
  }

  pub fn add_edge(&mut self, from: &str, to: &str) {
    self.add_node(to);
    let targets = self.edges.entry(from.to_string()).or_default();
    if !targets.iter().any(|t| t == to) {
      targets.push(to.to_string());
    }
  }

  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }

  /// Every node ordered so that each comes after everything it depends on.
  ///
  /// Fails with [`ResolutionError::CircularDependency`] naming the first cycle found.
  pub fn topological_order(&self) -> Result<Vec<String>, ResolutionError> {
    let mut colors: HashMap<&str, Color> = HashMap::with_capacity(self.edges.len());
    let mut path: Vec<&str> = Vec::new();
    let mut order = Vec::with_capacity(self.edges.len());
    for id in self.edges.keys() {
      self.visit(id, &mut colors, &mut path, &mut order)?;
    }
    trace!(nodes = order.len(), "dependency graph is acyclic");
    Ok(order)
  }

  fn visit<'a>(
    &'a self,
    id: &'a str,
    colors: &mut HashMap<&'a str, Color>,
    path: &mut Vec<&'a str>,
    order: &mut Vec<String>,
  ) -> Result<(), ResolutionError> {
    match colors.get(id) {
      Some(Color::Done) => return Ok(()),
      Some(Color::Visiting) => {
        let start = path.iter().position(|p| *p == id).unwrap_or(0);
        let mut cycle: Vec<String> = path[start..].iter().map(|p| p.to_string()).collect();
        cycle.push(id.to_string());
        return Err(ResolutionError::CircularDependency { cycle });
      }
      None => {}
    }

    colors.insert(id, Color::Visiting);
    path.push(id);
    for next in self.edges.get(id).into_iter().flatten() {
      self.visit(next, colors, path, order)?;
    }
    path.pop();
    colors.insert(id, Color::Done);
    order.push(id.to_string());
    Ok(())
  }
}
