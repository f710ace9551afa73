//! Data types flowing through attribute resolution.

mod attribute;
mod attribute_value;
mod plugin_dependency;
mod resolution_context;
mod resolution_outcome;
#[cfg(test)]
mod resolution_outcome_test;
mod work_context;

pub use attribute::{Attribute, AttributeEncoder, AttributeMap, LocalizedStrings};
pub use attribute_value::{AttributeValue, EmptyValue, TaggedValue};
pub use plugin_dependency::PluginDependency;
pub use resolution_context::{RequestedAttributes, ResolutionContext};
pub use resolution_outcome::{ResolutionOutcome, ResolutionStatus};
pub use work_context::WorkContext;
