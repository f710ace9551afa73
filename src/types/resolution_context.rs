//! Per-request input and output of attribute resolution.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::AttributeMap;

/// Which attribute definitions a request asks for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestedAttributes {
  /// Every attribute definition that is not dependency-only.
  #[default]
  All,
  /// Exactly these attribute ids.
  Only(BTreeSet<String>),
}

impl RequestedAttributes {
  /// Builds a restriction from attribute ids; an empty list means [`RequestedAttributes::All`].
  pub fn from_ids<I, S>(ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let ids: BTreeSet<String> = ids
      .into_iter()
      .map(Into::into)
      .map(|s: String| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();
    if ids.is_empty() {
      RequestedAttributes::All
    } else {
      RequestedAttributes::Only(ids)
    }
  }

  pub fn contains(&self, attribute_id: &str) -> bool {
    match self {
      RequestedAttributes::All => true,
      RequestedAttributes::Only(ids) => ids.contains(attribute_id),
    }
  }
}

/// State of one attribute resolution request. Created per request, never shared.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
  /// Correlates log events of one request.
  pub request_id: Uuid,
  /// Subject whose attributes are resolved. `None` for anonymous requests.
  pub principal: Option<String>,
  /// Entity asserting the attributes (the identity provider).
  pub attribute_issuer_id: Option<String>,
  /// Relying party the attributes are released to.
  pub attribute_recipient_id: Option<String>,
  /// How the principal authenticated.
  pub principal_authentication_method: Option<String>,
  /// Attribute ids the caller asks for.
  pub requested: RequestedAttributes,
  /// Filled by the resolver with the released attributes.
  pub resolved_attributes: AttributeMap,
}

impl ResolutionContext {
  /// Request for `principal` asking for every attribute.
  pub fn new(principal: impl Into<String>) -> Self {
    Self {
      request_id: Uuid::new_v4(),
      principal: Some(principal.into()),
      attribute_issuer_id: None,
      attribute_recipient_id: None,
      principal_authentication_method: None,
      requested: RequestedAttributes::All,
      resolved_attributes: AttributeMap::new(),
    }
  }

  /// Request without a principal.
  pub fn anonymous() -> Self {
    Self {
      principal: None,
      ..Self::new(String::new())
    }
  }

  /// Sets the issuing entity id.
  pub fn with_issuer(mut self, issuer_id: impl Into<String>) -> Self {
    self.attribute_issuer_id = Some(issuer_id.into());
    self
  }

  /// Sets the relying party entity id.
  pub fn with_recipient(mut self, recipient_id: impl Into<String>) -> Self {
    self.attribute_recipient_id = Some(recipient_id.into());
    self
  }

  /// Sets the authentication method.
  pub fn with_authentication_method(mut self, method: impl Into<String>) -> Self {
    self.principal_authentication_method = Some(method.into());
    self
  }

  /// Restricts the request to `ids`; an empty list asks for everything.
  pub fn with_requested_attributes<I, S>(mut self, ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.requested = RequestedAttributes::from_ids(ids);
    self
  }
}
