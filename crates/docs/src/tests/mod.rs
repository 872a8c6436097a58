//! Cross-module tests for the documents crate.

mod context_properties;
