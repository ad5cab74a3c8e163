//! Transcat - translatable message extraction for JS/TS projects
//!
//! Transcat is a CLI tool and library that extracts translatable messages
//! from JavaScript and TypeScript sources and writes them as XLIFF 1.2
//! catalogues. It recognizes translation and violation calls, honors
//! `@Trans*` comment annotations on literals, and merges translator-added
//! attributes from previously generated catalogues.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (extract and init commands)
//! - `config`: Configuration file loading and parsing
//! - `directives`: Comment directive parsing (`@Desc`, `@Ignore`, ...)
//! - `dump`: Catalogue serialization (XLIFF 1.2)
//! - `extract`: The extraction engine and its two extractors
//! - `model`: Message and catalogue data model
//! - `parsers`: swc-based parsing and AST lowering
//! - `scan`: Source file discovery
//! - `syntax`: The lowered syntax-node tree the extractors consume

pub mod cli;
pub mod config;
pub mod directives;
pub mod dump;
pub mod extract;
pub mod model;
pub mod parsers;
pub mod scan;
pub mod syntax;
