//! Typed values carried by an identity attribute.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of an empty attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyValue {
  /// The source held a null.
  Null,
  /// The source held a zero-length string.
  ZeroLength,
}

/// A value whose type is not one of the built-in kinds, identified by a type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedValue {
  pub tag: String,
  pub display: String,
}

/// One value of an identity attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeValue {
  String { value: String },
  ScopedString { value: String, scope: String },
  Bytes { value: Vec<u8> },
  Xml { value: String },
  Empty { kind: EmptyValue },
  Tagged(TaggedValue),
}

impl AttributeValue {
  pub fn string(value: impl Into<String>) -> Self {
    AttributeValue::String {
      value: value.into(),
    }
  }

  pub fn scoped(value: impl Into<String>, scope: impl Into<String>) -> Self {
    AttributeValue::ScopedString {
      value: value.into(),
      scope: scope.into(),
    }
  }

  pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
    AttributeValue::Bytes {
      value: value.into(),
    }
  }

  pub fn xml(value: impl Into<String>) -> Self {
    AttributeValue::Xml {
      value: value.into(),
    }
  }

  pub fn empty(kind: EmptyValue) -> Self {
    AttributeValue::Empty { kind }
  }

  pub fn tagged(tag: impl Into<String>, display: impl Into<String>) -> Self {
    AttributeValue::Tagged(TaggedValue {
      tag: tag.into(),
      display: display.into(),
    })
  }

  /// Returns the string content for plain string values only.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      AttributeValue::String { value } => Some(value),
      _ => None,
    }
  }

  pub fn is_empty_value(&self) -> bool {
    matches!(self, AttributeValue::Empty { .. })
  }

  /// Short type name used in logs and in unsupported-type errors.
  pub fn type_name(&self) -> &'static str {
    match self {
      AttributeValue::String { .. } => "string",
      AttributeValue::ScopedString { .. } => "scoped_string",
      AttributeValue::Bytes { .. } => "bytes",
      AttributeValue::Xml { .. } => "xml",
      AttributeValue::Empty { .. } => "empty",
      AttributeValue::Tagged(_) => "tagged",
    }
  }
}

impl fmt::Display for AttributeValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AttributeValue::String { value } | AttributeValue::Xml { value } => write!(f, "{}", value),
      AttributeValue::ScopedString { value, scope } => write!(f, "{}@{}", value, scope),
      AttributeValue::Bytes { value } => {
        for b in value {
          write!(f, "{:02x}", b)?;
        }
        Ok(())
      }
      AttributeValue::Empty { kind } => match kind {
        EmptyValue::Null => write!(f, "(null)"),
        EmptyValue::ZeroLength => write!(f, "(empty)"),
      },
      AttributeValue::Tagged(t) => write!(f, "{}", t.display),
    }
  }
}

impl From<&str> for AttributeValue {
  fn from(value: &str) -> Self {
    AttributeValue::string(value)
  }
}

impl From<String> for AttributeValue {
  fn from(value: String) -> Self {
    AttributeValue::string(value)
  }
}
