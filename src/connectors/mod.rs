//! Built-in data connector logic.

mod fn_connector;
mod static_connector;
#[cfg(test)]
mod static_connector_test;

pub use fn_connector::FnDataConnector;
pub use static_connector::StaticDataConnector;
