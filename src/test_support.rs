//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::connectors::{FnDataConnector, StaticDataConnector};
use crate::definitions::FnAttributeDefinition;
use crate::error::{PluginError, ResolutionError};
use crate::plugins::{AttributeDefinition, AttributeDefinitionLogic, DataConnector};
use crate::types::{Attribute, AttributeMap, PluginDependency, ResolutionContext, WorkContext};

pub(crate) fn static_connector(id: &str, attributes: Vec<Attribute>) -> DataConnector {
  DataConnector::new(id, StaticDataConnector::new(attributes))
}

pub(crate) fn attribute_map(attributes: Vec<Attribute>) -> AttributeMap {
  attributes.into_iter().map(|a| (a.id.clone(), a)).collect()
}

/// Connector counting its invocations and returning `attributes`.
pub(crate) fn counting_connector(
  id: &str,
  attributes: Vec<Attribute>,
) -> (DataConnector, Arc<AtomicUsize>) {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  let map = attribute_map(attributes);
  let connector = DataConnector::new(
    id,
    FnDataConnector::new(move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(Some(map.clone()))
    }),
  );
  (connector, calls)
}

/// Connector counting its invocations and always failing with `error`.
pub(crate) fn failing_connector(id: &str, error: PluginError) -> (DataConnector, Arc<AtomicUsize>) {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  let connector = DataConnector::new(
    id,
    FnDataConnector::new(move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
      Err(error.clone())
    }),
  );
  (connector, calls)
}

/// Definition counting its invocations and releasing the given values.
pub(crate) fn counting_definition(
  id: &str,
  values: Vec<&'static str>,
) -> (AttributeDefinition, Arc<AtomicUsize>) {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  let definition = AttributeDefinition::new(
    id,
    FnAttributeDefinition::new(move |scope| {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(Some(Attribute::with_values(scope.plugin_id, values.clone())))
    }),
  );
  (definition, calls)
}

/// Work context holding the recorded output of an initialized static connector.
pub(crate) fn work_with_connector(id: &str, attributes: Vec<Attribute>) -> WorkContext {
  let mut connector = static_connector(id, attributes.clone());
  connector.initialize().unwrap();
  let mut work = WorkContext::new();
  work
    .record_data_connector(Arc::new(connector), Some(attribute_map(attributes)))
    .unwrap();
  work
}

/// Initializes a definition named `out` over `logic` and resolves it against `work`.
pub(crate) async fn run_definition(
  logic: impl AttributeDefinitionLogic,
  dependencies: Vec<PluginDependency>,
  work: &WorkContext,
) -> Result<Option<Attribute>, ResolutionError> {
  let mut definition = AttributeDefinition::new("out", logic);
  definition.set_dependencies(dependencies)?;
  definition.initialize()?;
  let context = ResolutionContext::new("alice");
  Ok(definition.resolve(&context, work).await?.into_value())
}
