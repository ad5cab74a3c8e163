//! Extraction engine.
//!
//! Two independent extractors populate a shared [`Catalogue`]:
//! [`CallExtractor`] recognizes calls to the fixed translation function set,
//! [`AnnotationExtractor`] recognizes `@Trans*`-annotated literals. Each
//! extraction attempt resolves to an explicit [`Outcome`] instead of
//! throwing; the per-extractor driver then applies the failure policy: an
//! `@Ignore` directive skips silently, a configured logger collaborator
//! downgrades the error to a logged skip, and with neither the error is
//! fatal for the run.

mod annotations;
mod calls;

pub use annotations::AnnotationExtractor;
pub use calls::{CallExtractor, RECOGNIZED_FUNCTIONS};

use std::path::Path;

use thiserror::Error;

use crate::directives::Directive;
use crate::model::Catalogue;
use crate::model::Message;
use crate::syntax::Node;

/// An extraction-argument error: a call site where a literal was required
/// but something else was written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error(
        "can only extract the translation id from a string literal, but got {found} \
         (in {file} on line {line}); refactor the code to make it extractable, or \
         annotate it with @Ignore"
    )]
    NonLiteralId {
        found: String,
        file: String,
        line: u32,
    },

    #[error(
        "can only extract the translation domain from a string literal, but got {found} \
         (in {file} on line {line}); refactor the code to make it extractable, or \
         annotate it with @Ignore"
    )]
    NonLiteralDomain {
        found: String,
        file: String,
        line: u32,
    },
}

/// Result of one extraction attempt at one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Message),
    Skipped,
    Failed(ExtractError),
}

/// Logger collaborator. When configured on an extractor, extraction-argument
/// errors are reported here and the occurrence is skipped instead of
/// aborting the run.
pub trait ExtractionLogger {
    fn error(&self, message: &str);
}

/// Forwards extraction errors to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl ExtractionLogger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// A file-level extractor mutating the shared catalogue.
pub trait Extractor {
    fn extract(
        &self,
        file: &Path,
        roots: &[Node],
        catalogue: &mut Catalogue,
    ) -> Result<(), ExtractError>;
}

/// Apply the failure policy to one outcome.
fn settle(
    outcome: Outcome,
    logger: Option<&dyn ExtractionLogger>,
    catalogue: &mut Catalogue,
) -> Result<(), ExtractError> {
    match outcome {
        Outcome::Added(message) => {
            catalogue.add(message);
            Ok(())
        }
        Outcome::Skipped => Ok(()),
        Outcome::Failed(err) => match logger {
            Some(logger) => {
                logger.error(&err.to_string());
                Ok(())
            }
            None => Err(err),
        },
    }
}

/// The metadata directives resolved from one comment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CommentDirectives {
    ignore: bool,
    desc: Option<String>,
    meaning: Option<String>,
    alt_trans: Vec<(String, String)>,
}

impl CommentDirectives {
    /// Collect Ignore/Desc/Meaning/AltTrans from a comment, if any. Later
    /// directives of the same kind overwrite earlier ones.
    fn from_comment(comment: Option<&str>) -> Self {
        let mut resolved = Self::default();
        let Some(text) = comment else {
            return resolved;
        };
        for directive in Directive::parse_all(text) {
            match directive {
                Directive::Ignore => resolved.ignore = true,
                Directive::Desc(text) => resolved.desc = Some(text),
                Directive::Meaning(text) => resolved.meaning = Some(text),
                Directive::AltTrans { locale, text } => {
                    resolved.alt_trans.push((locale, text));
                }
                _ => {}
            }
        }
        resolved
    }
}
