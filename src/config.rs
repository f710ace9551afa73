//! JSON description of a resolver built from the built-in plugin kinds.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::connectors::StaticDataConnector;
use crate::definitions::{
  MappedDefinition, PrescopedDefinition, PrincipalNameDefinition, RegexSplitDefinition,
  ScopedDefinition, SimpleDefinition, SourceValue, TemplateDefinition, ValueMap,
};
use crate::error::ResolutionError;
use crate::plugins::{ActivationCondition, AttributeDefinition, DataConnector};
use crate::resolver::AttributeResolver;
use crate::types::{Attribute, AttributeEncoder, LocalizedStrings, PluginDependency};

fn default_resolver_id() -> String {
  "resolver".to_string()
}

fn default_true() -> bool {
  true
}

/// Top-level resolver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
  #[serde(default = "default_resolver_id")]
  pub id: String,
  #[serde(default)]
  pub connectors: Vec<ConnectorConfig>,
  #[serde(default)]
  pub definitions: Vec<DefinitionConfig>,
}

/// Settings shared by every plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
  pub id: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub dependencies: Vec<PluginDependency>,
  #[serde(default = "default_true")]
  pub propagate_errors: bool,
  /// When non-empty, the plugin is only active for these relying parties.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub active_for_recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
  #[serde(flatten)]
  pub settings: PluginSettings,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub failover: Option<String>,
  #[serde(default)]
  pub no_retry_delay_ms: u64,
  #[serde(flatten)]
  pub kind: ConnectorKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectorKind {
  Static {
    attributes: BTreeMap<String, Vec<String>>,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionConfig {
  #[serde(flatten)]
  pub settings: PluginSettings,
  #[serde(default)]
  pub dependency_only: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_attribute: Option<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub display_names: LocalizedStrings,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub display_descriptions: LocalizedStrings,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub encoders: Vec<AttributeEncoder>,
  #[serde(flatten)]
  pub kind: DefinitionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DefinitionKind {
  Simple,
  Scoped {
    scope: String,
  },
  Prescoped {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delimiter: Option<String>,
  },
  Mapped {
    value_maps: Vec<ValueMapConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(default)]
    pass_thru: bool,
  },
  RegexSplit {
    regex: String,
  },
  Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    source_attributes: Vec<String>,
  },
  PrincipalName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMapConfig {
  pub return_value: String,
  pub source_values: Vec<SourceValueConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceValueConfig {
  /// Full-match regular expression.
  Pattern(String),
  /// Substring match.
  Partial(String),
}

impl ResolverConfig {
  /// Loads a configuration from a JSON file.
  #[instrument(level = "trace", skip(path))]
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ResolutionError> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  /// Writes the configuration to `path` as pretty JSON, creating parent directories.
  #[instrument(level = "trace", skip(self, path))]
  pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ResolutionError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(self)?;
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
  }

  /// Builds every plugin and returns an initialized resolver.
  #[instrument(level = "trace", skip(self), fields(resolver_id = %self.id))]
  pub fn build(&self) -> Result<AttributeResolver, ResolutionError> {
    let connectors = self
      .connectors
      .iter()
      .map(ConnectorConfig::build)
      .collect::<Result<Vec<_>, _>>()?;
    let definitions = self
      .definitions
      .iter()
      .map(DefinitionConfig::build)
      .collect::<Result<Vec<_>, _>>()?;
    let mut resolver = AttributeResolver::new(self.id.clone(), definitions, connectors)?;
    resolver.initialize()?;
    Ok(resolver)
  }
}

impl PluginSettings {
  fn activation_condition(&self) -> Option<ActivationCondition> {
    (!self.active_for_recipients.is_empty())
      .then(|| ActivationCondition::for_recipients(self.active_for_recipients.iter().cloned()))
  }
}

impl ConnectorConfig {
  pub fn build(&self) -> Result<DataConnector, ResolutionError> {
    let settings = &self.settings;
    let mut connector = match &self.kind {
      ConnectorKind::Static { attributes } => DataConnector::new(
        settings.id.as_str(),
        StaticDataConnector::new(
          attributes
            .iter()
            .map(|(id, values)| Attribute::with_values(id.as_str(), values.iter().map(String::as_str))),
        ),
      ),
    };
    connector.set_dependencies(settings.dependencies.iter().cloned())?;
    connector.set_propagate_errors(settings.propagate_errors)?;
    if let Some(condition) = settings.activation_condition() {
      connector.set_activation_condition(condition)?;
    }
    if let Some(failover) = &self.failover {
      connector.set_failover_connector_id(failover.as_str())?;
    }
    connector.set_no_retry_delay(Duration::from_millis(self.no_retry_delay_ms))?;
    Ok(connector)
  }
}

impl DefinitionConfig {
  pub fn build(&self) -> Result<AttributeDefinition, ResolutionError> {
    let settings = &self.settings;
    let id = settings.id.as_str();
    let mut definition = match &self.kind {
      DefinitionKind::Simple => AttributeDefinition::new(id, SimpleDefinition),
      DefinitionKind::Scoped { scope } => {
        AttributeDefinition::new(id, ScopedDefinition::new(scope.as_str()))
      }
      DefinitionKind::Prescoped { delimiter } => AttributeDefinition::new(
        id,
        delimiter
          .as_deref()
          .map(|d| PrescopedDefinition::new(d))
          .unwrap_or_default(),
      ),
      DefinitionKind::Mapped {
        value_maps,
        default_value,
        pass_thru,
      } => {
        let maps = value_maps
          .iter()
          .map(|m| m.build(id))
          .collect::<Result<Vec<_>, _>>()?;
        let mut mapped = MappedDefinition::new(maps).with_pass_thru(*pass_thru);
        if let Some(default_value) = default_value {
          mapped = mapped.with_default_value(default_value.as_str());
        }
        AttributeDefinition::new(id, mapped)
      }
      DefinitionKind::RegexSplit { regex } => AttributeDefinition::new(
        id,
        RegexSplitDefinition::new(regex).map_err(|e| ResolutionError::invalid(id, e.to_string()))?,
      ),
      DefinitionKind::Template {
        template,
        source_attributes,
      } => {
        let logic = match template {
          Some(text) if source_attributes.is_empty() => TemplateDefinition::new(text.as_str()),
          Some(text) => TemplateDefinition::new(text.as_str())
            .with_source_attributes(source_attributes.iter().cloned()),
          None => TemplateDefinition::from_source_attributes(source_attributes.iter().cloned()),
        };
        AttributeDefinition::new(id, logic)
      }
      DefinitionKind::PrincipalName => AttributeDefinition::new(id, PrincipalNameDefinition),
    };
    definition.set_dependencies(settings.dependencies.iter().cloned())?;
    definition.set_propagate_errors(settings.propagate_errors)?;
    if let Some(condition) = settings.activation_condition() {
      definition.set_activation_condition(condition)?;
    }
    definition.set_dependency_only(self.dependency_only)?;
    if let Some(source) = &self.source_attribute {
      definition.set_source_attribute_id(source.as_str())?;
    }
    definition.set_display_names(self.display_names.clone())?;
    definition.set_display_descriptions(self.display_descriptions.clone())?;
    definition.set_encoders(self.encoders.iter().cloned())?;
    Ok(definition)
  }
}

impl ValueMapConfig {
  fn build(&self, plugin_id: &str) -> Result<ValueMap, ResolutionError> {
    let sources = self
      .source_values
      .iter()
      .map(|source| match source {
        SourceValueConfig::Pattern(pattern) => SourceValue::pattern(pattern)
          .map_err(|e| ResolutionError::invalid(plugin_id, e.to_string())),
        SourceValueConfig::Partial(substring) => Ok(SourceValue::partial(substring.as_str())),
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(ValueMap::new(self.return_value.as_str(), sources))
  }
}
