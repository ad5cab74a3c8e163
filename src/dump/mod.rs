//! Catalogue dumpers.
//!
//! XLIFF 1.2 is the interchange format translators and translation
//! management tools consume; its dumper is the only one shipped.

mod xliff;

pub use xliff::{DumpError, XliffDumper};
