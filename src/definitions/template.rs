//! Definition rendering a `${name}` template over source attribute values.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tracing::trace;

use super::{require_dependencies, unsupported};
use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::{Attribute, AttributeValue, EmptyValue, PluginDependency};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
  Literal(String),
  Reference(String),
}

fn parse(text: &str) -> Vec<Segment> {
  let mut segments = Vec::new();
  let mut rest = text;
  while let Some(start) = rest.find("${") {
    let Some(len) = rest[start + 2..].find('}') else {
      break;
    };
    if start > 0 {
      segments.push(Segment::Literal(rest[..start].to_string()));
    }
    let name = &rest[start + 2..start + 2 + len];
    segments.push(Segment::Reference(name.trim().to_string()));
    rest = &rest[start + 3 + len..];
  }
  if !rest.is_empty() {
    segments.push(Segment::Literal(rest.to_string()));
  }
  segments
}

/// Renders one value per position across the source attributes' value lists.
///
/// Every source attribute must have the same number of values. A reference to a
/// null value is rendered as the literal reference text.
#[derive(Debug, Clone)]
pub struct TemplateDefinition {
  text: String,
  segments: Vec<Segment>,
  source_attributes: Vec<String>,
}

impl TemplateDefinition {
  /// Template whose source attributes are the names it references.
  pub fn new(text: impl Into<String>) -> Self {
    let text = text.into().trim().to_string();
    let segments = parse(&text);
    let mut source_attributes: Vec<String> = Vec::new();
    for segment in &segments {
      match segment {
        Segment::Reference(name) if !source_attributes.contains(name) => {
          source_attributes.push(name.clone())
        }
        _ => {}
      }
    }
    Self {
      text,
      segments,
      source_attributes,
    }
  }

  /// Template joining the given source attributes with spaces.
  pub fn from_source_attributes<I, S>(source_attributes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let ids: Vec<String> = source_attributes.into_iter().map(Into::into).collect();
    let text = ids
      .iter()
      .map(|id| format!("${{{}}}", id))
      .collect::<Vec<_>>()
      .join(" ");
    Self::new(text).with_source_attributes(ids)
  }

  pub fn with_source_attributes<I, S>(mut self, source_attributes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.source_attributes = source_attributes
      .into_iter()
      .map(|s| s.into().trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();
    self
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn source_attributes(&self) -> &[String] {
    &self.source_attributes
  }

  fn render(&self, bindings: &BTreeMap<&str, Option<&str>>) -> String {
    let mut out = String::with_capacity(self.text.len());
    for segment in &self.segments {
      match segment {
        Segment::Literal(text) => out.push_str(text),
        Segment::Reference(name) => match bindings.get(name.as_str()) {
          Some(Some(value)) => out.push_str(value),
          _ => {
            out.push_str("${");
            out.push_str(name);
            out.push('}');
          }
        },
      }
    }
    out
  }
}

fn template_input(value: &AttributeValue) -> Result<Option<&str>, PluginError> {
  match value {
    AttributeValue::String { value } => Ok(Some(value.as_str())),
    AttributeValue::Empty {
      kind: EmptyValue::ZeroLength,
    } => Ok(Some("")),
    AttributeValue::Empty {
      kind: EmptyValue::Null,
    } => Ok(None),
    other => Err(unsupported(other)),
  }
}

#[async_trait]
impl AttributeDefinitionLogic for TemplateDefinition {
  fn kind(&self) -> &'static str {
    "template"
  }

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError> {
    let all = scope.all_values();
    let mut count: Option<usize> = None;
    let mut sources: Vec<(&str, &[AttributeValue])> = Vec::with_capacity(self.source_attributes.len());
    for id in &self.source_attributes {
      let values = all.get(id).map(Vec::as_slice).unwrap_or(&[]);
      match count {
        None => count = Some(values.len()),
        Some(n) if n != values.len() => {
          return Err(PluginError::failed(format!(
            "all source attributes must have the same number of values: '{}'",
            id
          )));
        }
        Some(_) => {}
      }
      sources.push((id.as_str(), values));
    }

    let mut attribute = Attribute::new(scope.plugin_id);
    for i in 0..count.unwrap_or(0) {
      let mut bindings = BTreeMap::new();
      for (id, values) in &sources {
        bindings.insert(*id, template_input(&values[i])?);
      }
      let rendered = self.render(&bindings);
      trace!(plugin_id = %scope.plugin_id, value = %rendered, "rendered template");
      attribute.values.push(AttributeValue::string(rendered));
    }
    Ok(Some(attribute))
  }

  fn validate(&self, dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    require_dependencies(dependencies)?;
    if self.text.is_empty() {
      return Err("no template and no source attributes were configured".to_string());
    }
    if self.source_attributes.is_empty() {
      return Err("no source attributes were configured".to_string());
    }
    Ok(())
  }
}
