//! Source parsing.
//!
//! Wraps the swc TypeScript parser and lowers its AST into the
//! [`crate::syntax::Node`] tree the extractors consume.

pub mod js;
