//! Resolver plugins: attribute definitions, data connectors and their shared lifecycle.

mod activation;
mod attribute_definition;
mod data_connector;
#[cfg(test)]
mod data_connector_test;
mod failure_window;
mod lifecycle;
mod plugin;
mod resolved;
mod scope;

pub use activation::ActivationCondition;
pub use attribute_definition::{AttributeDefinition, AttributeDefinitionLogic};
pub use data_connector::{DataConnector, DataConnectorLogic};
pub use failure_window::FailureWindow;
pub use lifecycle::{ComponentState, PluginCore};
pub use plugin::{Plugin, PluginResult, Resolution, ResolverPlugin};
pub use resolved::{ResolvedAttributeDefinition, ResolvedDataConnector, ResolvedPlugin};
pub use scope::ResolutionScope;
