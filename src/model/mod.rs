//! Message and catalogue data model.
//!
//! These types are populated by the extractors and consumed by the dumpers.
//! The catalogue is single-writer-then-single-reader: all extractors finish
//! before any dumper reads it, so nothing here locks.

mod catalogue;
mod message;

pub use catalogue::{Catalogue, Domain};
pub use message::{FileSource, Message, Note, Source, State};

/// Domain used when a call or directive does not name one.
pub const DEFAULT_DOMAIN: &str = "messages";

/// Domain used for violation-style calls.
pub const VALIDATORS_DOMAIN: &str = "validators";
