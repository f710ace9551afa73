//! Attribute definitions: plugins producing at most one attribute.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use super::{
  ActivationCondition, ComponentState, Plugin, PluginCore, PluginResult, Resolution,
  ResolutionScope,
};
use crate::error::{PluginError, ResolutionError};
use crate::types::{
  Attribute, AttributeEncoder, LocalizedStrings, PluginDependency, ResolutionContext, WorkContext,
};

/// Value-producing logic of an attribute definition.
///
/// Implementations only compute values. Display names, descriptions and encoders are
/// attached by [`AttributeDefinition::resolve`] and anything set here is overwritten.
#[async_trait]
pub trait AttributeDefinitionLogic: Send + Sync + 'static {
  /// Short name of the definition type, used in logs.
  fn kind(&self) -> &'static str;

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError>;

  /// Checks the definition's own configuration once its dependencies are final.
  fn validate(&self, _dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    Ok(())
  }
}

/// A plugin producing zero or one attribute, decorated with display metadata and encoders.
pub struct AttributeDefinition {
  core: PluginCore,
  dependency_only: bool,
  source_attribute_id: Option<String>,
  display_names: LocalizedStrings,
  display_descriptions: LocalizedStrings,
  encoders: BTreeSet<AttributeEncoder>,
  logic: Box<dyn AttributeDefinitionLogic>,
}

fn trimmed(strings: LocalizedStrings) -> LocalizedStrings {
  strings
    .into_iter()
    .filter_map(|(locale, text)| {
      let text = text.trim();
      (!text.is_empty()).then(|| (locale.trim().to_string(), text.to_string()))
    })
    .collect()
}

impl AttributeDefinition {
  pub fn new(id: impl Into<String>, logic: impl AttributeDefinitionLogic) -> Self {
    Self {
      core: PluginCore::new(id),
      dependency_only: false,
      source_attribute_id: None,
      display_names: LocalizedStrings::new(),
      display_descriptions: LocalizedStrings::new(),
      encoders: BTreeSet::new(),
      logic: Box::new(logic),
    }
  }

  pub fn kind(&self) -> &'static str {
    self.logic.kind()
  }

  pub fn is_dependency_only(&self) -> bool {
    self.dependency_only
  }

  pub fn source_attribute_id(&self) -> Option<&str> {
    self.source_attribute_id.as_deref()
  }

  pub fn display_names(&self) -> &LocalizedStrings {
    &self.display_names
  }

  pub fn display_descriptions(&self) -> &LocalizedStrings {
    &self.display_descriptions
  }

  pub fn encoders(&self) -> &BTreeSet<AttributeEncoder> {
    &self.encoders
  }

  pub fn set_dependencies<I>(&mut self, dependencies: I) -> Result<(), ResolutionError>
  where
    I: IntoIterator<Item = PluginDependency>,
  {
    self.core.set_dependencies(dependencies)
  }

  pub fn add_dependency(&mut self, dependency: PluginDependency) -> Result<(), ResolutionError> {
    self.core.add_dependency(dependency)
  }

  pub fn set_activation_condition(
    &mut self,
    condition: ActivationCondition,
  ) -> Result<(), ResolutionError> {
    self.core.set_activation_condition(condition)
  }

  pub fn set_propagate_errors(&mut self, propagate: bool) -> Result<(), ResolutionError> {
    self.core.set_propagate_errors(propagate)
  }

  pub fn set_dependency_only(&mut self, dependency_only: bool) -> Result<(), ResolutionError> {
    self.core.ensure_configurable()?;
    self.dependency_only = dependency_only;
    Ok(())
  }

  /// Selects which attribute of each dependency this definition consumes.
  pub fn set_source_attribute_id(
    &mut self,
    attribute_id: impl Into<String>,
  ) -> Result<(), ResolutionError> {
    self.core.ensure_configurable()?;
    let attribute_id = attribute_id.into().trim().to_string();
    self.source_attribute_id = (!attribute_id.is_empty()).then_some(attribute_id);
    Ok(())
  }

  pub fn set_display_names(&mut self, names: LocalizedStrings) -> Result<(), ResolutionError> {
    self.core.ensure_configurable()?;
    self.display_names = trimmed(names);
    Ok(())
  }

  pub fn set_display_descriptions(
    &mut self,
    descriptions: LocalizedStrings,
  ) -> Result<(), ResolutionError> {
    self.core.ensure_configurable()?;
    self.display_descriptions = trimmed(descriptions);
    Ok(())
  }

  pub fn set_encoders<I>(&mut self, encoders: I) -> Result<(), ResolutionError>
  where
    I: IntoIterator<Item = AttributeEncoder>,
  {
    self.core.ensure_configurable()?;
    self.encoders = encoders.into_iter().collect();
    Ok(())
  }

  /// Binds the source attribute id into every dependency, then freezes configuration.
  ///
  /// The rebinding must happen first: once the core is initialized the dependency set is immutable.
  pub fn initialize(&mut self) -> Result<(), ResolutionError> {
    if self.core.state() == ComponentState::Initialized {
      return Ok(());
    }
    if let Some(source) = self.source_attribute_id.clone() {
      self.core.rebind_dependencies(&source)?;
    }
    self
      .logic
      .validate(self.core.dependencies())
      .map_err(|reason| ResolutionError::invalid(self.core.id(), reason))?;
    self.core.initialize()
  }

  pub fn destroy(&mut self) {
    self.core.destroy();
  }

  /// Resolves this definition for one request.
  ///
  /// The caller records the outcome in the work context.
  #[instrument(level = "trace", skip(self, context, work), fields(plugin_id = %self.core.id()))]
  pub async fn resolve(
    &self,
    context: &ResolutionContext,
    work: &WorkContext,
  ) -> PluginResult<Attribute> {
    self.core.ensure_usable()?;
    if !self.core.is_active(context) {
      debug!(plugin_id = %self.id(), "activation condition not met, skipping attribute definition");
      return Ok(Resolution::Skipped);
    }

    let scope = ResolutionScope::new(self.id(), self.core.dependencies(), context, work);
    match self.logic.resolve_attribute(&scope).await {
      Ok(Some(mut attribute)) => {
        attribute.display_names = self.display_names.clone();
        attribute.display_descriptions = self.display_descriptions.clone();
        attribute.encoders = self.encoders.clone();
        trace!(
          plugin_id = %self.id(),
          values = attribute.values.len(),
          "attribute definition produced attribute"
        );
        Ok(Resolution::Produced(Some(attribute)))
      }
      Ok(None) => {
        debug!(plugin_id = %self.id(), "attribute definition produced no attribute");
        Ok(Resolution::Produced(None))
      }
      Err(source) => {
        let error = ResolutionError::plugin(self.id(), source);
        if self.core.propagate_errors() {
          return Err(error);
        }
        debug!(plugin_id = %self.id(), error = %error, "ignoring attribute definition failure");
        Ok(Resolution::Failed(error))
      }
    }
  }
}

impl Plugin for AttributeDefinition {
  fn id(&self) -> &str {
    self.core.id()
  }

  fn dependencies(&self) -> &BTreeSet<PluginDependency> {
    self.core.dependencies()
  }

  fn activation_condition(&self) -> Option<&ActivationCondition> {
    self.core.activation_condition()
  }

  fn propagate_errors(&self) -> bool {
    self.core.propagate_errors()
  }

  fn state(&self) -> ComponentState {
    self.core.state()
  }
}

impl fmt::Debug for AttributeDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AttributeDefinition")
      .field("id", &self.core.id())
      .field("kind", &self.logic.kind())
      .field("state", &self.core.state())
      .field("dependencies", self.core.dependencies())
      .field("dependency_only", &self.dependency_only)
      .finish_non_exhaustive()
  }
}

impl PartialEq for AttributeDefinition {
  fn eq(&self, other: &Self) -> bool {
    self.id() == other.id()
  }
}

impl Eq for AttributeDefinition {}

impl Hash for AttributeDefinition {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id().hash(state);
  }
}
