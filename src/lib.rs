//! # attribute-resolver
//!
//! Identity attribute resolution over a dependency graph of pluggable nodes.
//!
//! ## Architecture
//!
//! Two kinds of plugins make up the graph (see `plugins`):
//!
//! - **Data connectors** fetch maps of raw attributes from external sources, with an
//!   optional failover connector and a circuit breaker shared across requests.
//! - **Attribute definitions** compute one attribute each from the outputs of other plugins.
//!
//! The [`AttributeResolver`] validates the graph once at initialization (dangling
//! dependencies, cycles) and then, per request, walks it depth-first from the requested
//! attributes, running each plugin at most once and memoizing outcomes in a
//! [`WorkContext`]. Built-in plugin logic lives in `definitions` and `connectors`;
//! `config` builds a resolver from JSON.

pub mod config;
#[cfg(test)]
mod config_test;
pub mod connectors;
pub mod definitions;
pub mod error;
pub mod graph_validation;
#[cfg(test)]
mod graph_validation_test;
pub mod plugins;
pub mod resolver;
#[cfg(test)]
mod test_support;
pub mod types;

pub use config::ResolverConfig;
pub use error::{PluginError, ResolutionError};
pub use plugins::{
  ActivationCondition, AttributeDefinition, AttributeDefinitionLogic, DataConnector,
  DataConnectorLogic, Plugin, ResolutionScope, ResolvedAttributeDefinition,
};
pub use resolver::AttributeResolver;
pub use types::{
  Attribute, AttributeMap, AttributeValue, PluginDependency, RequestedAttributes,
  ResolutionContext, WorkContext,
};
