//! Annotation-based extraction.
//!
//! Triggers on nodes whose attached comment carries a `@Trans*` directive
//! and resolves the string or array literal underneath them.

use std::path::Path;

use super::{CommentDirectives, ExtractError, Extractor};
use crate::directives::{ANNOTATION_MARKER, Directive};
use crate::model::{Catalogue, FileSource, Message, Source};
use crate::syntax::{Node, NodeKind, flatten};

/// Which half of an array literal's entries become message ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayTarget {
    Keys,
    Values,
}

/// Extracts messages from `@TransString`, `@TransArrayKeys` and
/// `@TransArrayValues` annotations.
///
/// Unlike the call-based extractor this one has no failure mode: a node
/// without a matching literal underneath simply contributes nothing, so no
/// logger collaborator is needed.
#[derive(Debug, Default)]
pub struct AnnotationExtractor;

impl AnnotationExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a string literal found at depth 1 under `node`.
    ///
    /// Metadata directives are re-resolved from the string node's own
    /// comment, falling back to the triggering node's and finally to the
    /// inherited array-entry comment.
    fn extract_string(
        &self,
        file: &Path,
        node: &Node,
        inherited_comment: Option<&str>,
        domain: &str,
        catalogue: &mut Catalogue,
    ) {
        let Some(string_node) = find_sub_node(node, |kind| matches!(kind, NodeKind::Str(_)))
        else {
            return;
        };
        let Some(id) = string_node.as_str() else {
            return;
        };

        let comment = string_node
            .comment()
            .or_else(|| node.comment())
            .or(inherited_comment);
        let directives = CommentDirectives::from_comment(comment);

        let mut message = Message::new(id, domain);
        message.set_desc(directives.desc);
        message.set_meaning(directives.meaning);
        for (locale, text) in directives.alt_trans {
            message.add_alternative_translation(locale, text);
        }
        message.add_source(Source::File(FileSource::new(
            file.display().to_string(),
            string_node.line(),
        )));
        catalogue.add(message);
    }

    /// Extract from an array literal found at depth 1 under `node`, one
    /// message per entry. A target node that is not a string literal is
    /// skipped, mirroring the no-match semantics of the sub-node lookup.
    fn extract_array(
        &self,
        file: &Path,
        node: &Node,
        domain: &str,
        target: ArrayTarget,
        catalogue: &mut Catalogue,
    ) {
        let Some(array_node) = find_sub_node(node, |kind| matches!(kind, NodeKind::Array(_)))
        else {
            return;
        };
        let NodeKind::Array(entries) = array_node.kind() else {
            return;
        };

        for entry in entries {
            let target_node = match target {
                ArrayTarget::Keys => entry.key.as_ref(),
                ArrayTarget::Values => Some(&entry.value),
            };
            let Some(target_node) = target_node else {
                continue;
            };
            if target_node.as_str().is_none() {
                continue;
            }
            // The entry's comment stands in when the key/value node has
            // none of its own, so individual entries can be annotated.
            self.extract_string(
                file,
                target_node,
                entry.comment.as_deref(),
                domain,
                catalogue,
            );
        }
    }
}

impl Extractor for AnnotationExtractor {
    fn extract(
        &self,
        file: &Path,
        roots: &[Node],
        catalogue: &mut Catalogue,
    ) -> Result<(), ExtractError> {
        for node in flatten(roots) {
            let Some(comment) = node.comment() else {
                continue;
            };
            if !comment.contains(ANNOTATION_MARKER) {
                continue;
            }
            for directive in Directive::parse_all(comment) {
                match directive {
                    Directive::TransString { domain } => {
                        self.extract_string(file, node, None, &domain, catalogue);
                    }
                    Directive::TransArrayKeys { domain } => {
                        self.extract_array(file, node, &domain, ArrayTarget::Keys, catalogue);
                    }
                    Directive::TransArrayValues { domain } => {
                        self.extract_array(file, node, &domain, ArrayTarget::Values, catalogue);
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

/// Depth-1 lookup: the node itself, or a wrapped expression child, or a
/// wrapped value child, whichever matches first.
fn find_sub_node(node: &Node, matches: impl Fn(&NodeKind) -> bool) -> Option<&Node> {
    if matches(node.kind()) {
        return Some(node);
    }
    if let NodeKind::Expr(inner) | NodeKind::Value(inner) = node.kind()
        && matches(inner.kind())
    {
        return Some(inner);
    }
    None
}
