//! An identity attribute: id, values and display metadata.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::AttributeValue;

/// Handle to a protocol encoder attached to an attribute (e.g. a SAML2 string encoder).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeEncoder {
  pub protocol: String,
  pub name: String,
}

impl AttributeEncoder {
  pub fn new(protocol: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      protocol: protocol.into(),
      name: name.into(),
    }
  }
}

/// Localized strings keyed by language tag (e.g. `en`, `de-CH`).
pub type LocalizedStrings = BTreeMap<String, String>;

/// An identity attribute produced by an attribute definition or a data connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
  pub id: String,
  pub values: Vec<AttributeValue>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub display_names: LocalizedStrings,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub display_descriptions: LocalizedStrings,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub encoders: BTreeSet<AttributeEncoder>,
}

impl Attribute {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      values: vec![],
      display_names: BTreeMap::new(),
      display_descriptions: BTreeMap::new(),
      encoders: BTreeSet::new(),
    }
  }

  pub fn with_values<I, V>(id: impl Into<String>, values: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<AttributeValue>,
  {
    let mut attribute = Self::new(id);
    attribute.values = values.into_iter().map(Into::into).collect();
    attribute
  }

  /// Removes repeated values, keeping the first occurrence of each. Returns the number removed.
  pub fn dedup_values(&mut self) -> usize {
    let before = self.values.len();
    let mut seen = HashSet::with_capacity(before);
    self.values.retain(|v| seen.insert(v.clone()));
    before - self.values.len()
  }
}

/// Attributes keyed by attribute id, as produced by a data connector or released to a caller.
pub type AttributeMap = BTreeMap<String, Attribute>;
