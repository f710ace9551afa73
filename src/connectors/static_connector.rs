//! Data connector returning a fixed set of attributes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::trace;

use crate::error::PluginError;
use crate::plugins::{DataConnectorLogic, ResolutionScope};
use crate::types::{Attribute, AttributeMap, PluginDependency};

/// Returns the same configured attributes on every request.
#[derive(Debug, Clone, Default)]
pub struct StaticDataConnector {
  attributes: AttributeMap,
}

impl StaticDataConnector {
  pub fn new<I>(attributes: I) -> Self
  where
    I: IntoIterator<Item = Attribute>,
  {
    Self {
      attributes: attributes.into_iter().map(|a| (a.id.clone(), a)).collect(),
    }
  }

  pub fn attributes(&self) -> &AttributeMap {
    &self.attributes
  }
}

#[async_trait]
impl DataConnectorLogic for StaticDataConnector {
  fn kind(&self) -> &'static str {
    "static"
  }

  async fn resolve_connector(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<AttributeMap>, PluginError> {
    trace!(plugin_id = %scope.plugin_id, attributes = self.attributes.len(), "returning static attributes");
    Ok(Some(self.attributes.clone()))
  }

  fn validate(&self, _dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    if self.attributes.is_empty() {
      return Err("no static attributes were configured".to_string());
    }
    Ok(())
  }
}
