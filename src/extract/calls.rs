//! Call-based extraction.
//!
//! Walks a lowered file looking for calls to the fixed translation function
//! set and resolves id, domain and placeholder arguments positionally.

use std::path::Path;

use super::{CommentDirectives, ExtractError, ExtractionLogger, Extractor, Outcome, settle};
use crate::model::{Catalogue, DEFAULT_DOMAIN, FileSource, Message, Source, VALIDATORS_DOMAIN};
use crate::syntax::{Node, NodeKind, flatten};

/// Method names recognized by the call-based extractor, matched
/// case-insensitively.
pub const RECOGNIZED_FUNCTIONS: [&str; 5] = [
    "trans",
    "transchoice",
    "addviolation",
    "addviolationat",
    "buildviolation",
];

/// Extracts messages from `trans`-family and violation-family calls.
#[derive(Default)]
pub struct CallExtractor {
    logger: Option<Box<dyn ExtractionLogger>>,
}

impl CallExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Box<dyn ExtractionLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn set_logger(&mut self, logger: Box<dyn ExtractionLogger>) {
        self.logger = Some(logger);
    }
}

impl Extractor for CallExtractor {
    fn extract(
        &self,
        file: &Path,
        roots: &[Node],
        catalogue: &mut Catalogue,
    ) -> Result<(), ExtractError> {
        let mut previous: Option<&Node> = None;
        for node in flatten(roots) {
            match match_call(file, node, previous) {
                // Non-qualifying nodes become the predecessor used for
                // comment lookup; qualifying calls do not.
                None => previous = Some(node),
                Some(outcome) => settle(outcome, self.logger.as_deref(), catalogue)?,
            }
        }
        Ok(())
    }
}

/// Decide whether `node` is a qualifying call and, if so, attempt
/// extraction. Pure: all state is in the arguments.
fn match_call(file: &Path, node: &Node, previous: Option<&Node>) -> Option<Outcome> {
    let NodeKind::Call { name, args, .. } = node.kind() else {
        return None;
    };
    let name = name.to_ascii_lowercase();
    if !RECOGNIZED_FUNCTIONS.contains(&name.as_str()) || args.is_empty() {
        return None;
    }

    // Comment resolution order: first argument, the call itself, then the
    // node encountered immediately before the call.
    let comment = args[0]
        .comment()
        .or_else(|| node.comment())
        .or_else(|| previous.and_then(Node::comment));
    let directives = CommentDirectives::from_comment(comment);

    Some(if name.starts_with("trans") {
        extract_trans(file, node, &name, args, &directives)
    } else {
        extract_violation(file, node, &name, args, &directives)
    })
}

/// `trans` / `transchoice`: id at argument 0, domain at 2 resp. 3,
/// placeholders from the array argument right before the domain.
fn extract_trans(
    file: &Path,
    node: &Node,
    name: &str,
    args: &[Node],
    directives: &CommentDirectives,
) -> Outcome {
    let id_node = &args[0];
    let Some(id) = id_node.as_str() else {
        return fail_or_skip(
            directives.ignore,
            ExtractError::NonLiteralId {
                found: id_node.construct_name().to_string(),
                file: file.display().to_string(),
                line: id_node.line(),
            },
        );
    };

    let domain_index = if name == "trans" { 2 } else { 3 };
    let domain = match args.get(domain_index) {
        Some(arg) if !arg.is_null() => match arg.as_str() {
            Some(domain) => domain.to_string(),
            None => {
                return fail_or_skip(
                    directives.ignore,
                    ExtractError::NonLiteralDomain {
                        found: arg.construct_name().to_string(),
                        file: file.display().to_string(),
                        line: arg.line(),
                    },
                );
            }
        },
        _ => DEFAULT_DOMAIN.to_string(),
    };

    let mut message = new_message(file, node, id, &domain, directives);
    add_placeholders(&mut message, args.get(domain_index - 1));
    Outcome::Added(message)
}

/// `addviolation` / `addviolationat` / `buildviolation`: domain is fixed,
/// id at argument 1 for `addviolationat` else 0, placeholders from the
/// argument right after the id.
fn extract_violation(
    file: &Path,
    node: &Node,
    name: &str,
    args: &[Node],
    directives: &CommentDirectives,
) -> Outcome {
    let id_index = if name == "addviolationat" { 1 } else { 0 };
    let id = match args.get(id_index) {
        Some(id_node) => match id_node.as_str() {
            Some(id) => id,
            None => {
                return fail_or_skip(
                    directives.ignore,
                    ExtractError::NonLiteralId {
                        found: id_node.construct_name().to_string(),
                        file: file.display().to_string(),
                        line: id_node.line(),
                    },
                );
            }
        },
        None => {
            return fail_or_skip(
                directives.ignore,
                ExtractError::NonLiteralId {
                    found: "missing argument".to_string(),
                    file: file.display().to_string(),
                    line: node.line(),
                },
            );
        }
    };

    let mut message = new_message(file, node, id, VALIDATORS_DOMAIN, directives);
    add_placeholders(&mut message, args.get(id_index + 1));
    Outcome::Added(message)
}

fn new_message(
    file: &Path,
    node: &Node,
    id: &str,
    domain: &str,
    directives: &CommentDirectives,
) -> Message {
    let mut message = Message::new(id, domain);
    message.set_desc(directives.desc.clone());
    message.set_meaning(directives.meaning.clone());
    message.add_source(Source::File(FileSource::new(
        file.display().to_string(),
        node.line(),
    )));
    message
}

/// One placeholder per keyed entry of a literal array/object argument. Any
/// other argument kind contributes nothing.
fn add_placeholders(message: &mut Message, arg: Option<&Node>) {
    let Some(node) = arg else { return };
    let NodeKind::Array(entries) = node.kind() else {
        return;
    };
    for entry in entries {
        if let Some(name) = entry.key.as_ref().and_then(Node::as_str) {
            message.add_placeholder(name);
        }
    }
}

fn fail_or_skip(ignore: bool, err: ExtractError) -> Outcome {
    if ignore {
        Outcome::Skipped
    } else {
        Outcome::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::extract::test_support::RecordingLogger;
    use crate::syntax::ArrayEntry;

    fn extract(roots: &[Node]) -> Result<Catalogue, ExtractError> {
        let mut catalogue = Catalogue::new("en");
        CallExtractor::new().extract(Path::new("app.ts"), roots, &mut catalogue)?;
        Ok(catalogue)
    }

    fn keyed_array(pairs: &[(&str, &str)], line: u32) -> Node {
        Node::array(
            pairs
                .iter()
                .map(|(k, v)| {
                    ArrayEntry::new(Some(Node::string(*k, line)), Node::string(*v, line))
                })
                .collect(),
            line,
        )
    }

    #[test]
    fn test_trans_with_only_id() {
        let roots = vec![Node::call("trans", vec![Node::string("a.b", 3)], 3)];
        let catalogue = extract(&roots).unwrap();

        let message = catalogue.get("messages", "a.b").unwrap();
        assert_eq!(message.domain(), "messages");
        assert_eq!(message.sources().len(), 1);
        assert_eq!(
            message.sources()[0],
            Source::File(FileSource::new("app.ts", 3))
        );
        assert_eq!(message.placeholders().count(), 0);
    }

    #[test]
    fn test_trans_with_explicit_domain_at_index_2() {
        let roots = vec![Node::call(
            "trans",
            vec![
                Node::string("a.b", 1),
                Node::array(Vec::new(), 1),
                Node::string("custom", 1),
            ],
            1,
        )];
        let catalogue = extract(&roots).unwrap();

        let message = catalogue.get("custom", "a.b").unwrap();
        assert_eq!(message.placeholders().count(), 0);
    }

    #[test]
    fn test_trans_null_domain_defaults() {
        let roots = vec![Node::call(
            "trans",
            vec![
                Node::string("a.b", 1),
                Node::array(Vec::new(), 1),
                Node::null(1),
            ],
            1,
        )];
        let catalogue = extract(&roots).unwrap();
        assert!(catalogue.get("messages", "a.b").is_some());
    }

    #[test]
    fn test_trans_placeholders_from_keyed_array() {
        let roots = vec![Node::call(
            "trans",
            vec![
                Node::string("greeting", 1),
                keyed_array(&[("name", "x"), ("count", "y")], 1),
                Node::string("custom", 1),
            ],
            1,
        )];
        let catalogue = extract(&roots).unwrap();

        let message = catalogue.get("custom", "greeting").unwrap();
        let placeholders: Vec<&str> = message.placeholders().collect();
        assert_eq!(placeholders, vec!["count", "name"]);
    }

    #[test]
    fn test_transchoice_domain_at_index_3() {
        let roots = vec![Node::call(
            "transChoice",
            vec![
                Node::string("apples", 1),
                Node::other("number literal", Vec::new(), 1),
                keyed_array(&[("count", "n")], 1),
                Node::string("fruit", 1),
            ],
            1,
        )];
        let catalogue = extract(&roots).unwrap();

        let message = catalogue.get("fruit", "apples").unwrap();
        assert_eq!(message.placeholders().collect::<Vec<_>>(), vec!["count"]);
    }

    #[test]
    fn test_violation_family_uses_validators_domain() {
        let roots = vec![
            Node::call("addViolation", vec![Node::string("too.short", 2)], 2),
            Node::call(
                "buildViolation",
                vec![
                    Node::string("too.long", 3),
                    keyed_array(&[("limit", "x")], 3),
                ],
                3,
            ),
        ];
        let catalogue = extract(&roots).unwrap();

        assert!(catalogue.get("validators", "too.short").is_some());
        let message = catalogue.get("validators", "too.long").unwrap();
        assert_eq!(message.placeholders().collect::<Vec<_>>(), vec!["limit"]);
    }

    #[test]
    fn test_addviolationat_id_at_index_1() {
        let roots = vec![Node::call(
            "addViolationAt",
            vec![
                Node::string("field", 4),
                Node::string("invalid.value", 4),
                keyed_array(&[("value", "v")], 4),
            ],
            4,
        )];
        let catalogue = extract(&roots).unwrap();

        let message = catalogue.get("validators", "invalid.value").unwrap();
        assert_eq!(message.placeholders().collect::<Vec<_>>(), vec!["value"]);
        // The path argument is not a message.
        assert!(catalogue.get("validators", "field").is_none());
    }

    #[test]
    fn test_non_literal_id_is_fatal_without_logger() {
        let roots = vec![Node::call(
            "trans",
            vec![Node::other("identifier", Vec::new(), 7)],
            7,
        )];
        let err = extract(&roots).unwrap_err();
        assert_eq!(
            err,
            ExtractError::NonLiteralId {
                found: "identifier".to_string(),
                file: "app.ts".to_string(),
                line: 7,
            }
        );
    }

    #[test]
    fn test_non_literal_id_is_logged_and_skipped_with_logger() {
        let logger = RecordingLogger::default();
        let extractor = CallExtractor::new().with_logger(Box::new(logger.clone()));

        let roots = vec![
            Node::call("trans", vec![Node::other("identifier", Vec::new(), 7)], 7),
            Node::call("trans", vec![Node::string("still.extracted", 8)], 8),
        ];
        let mut catalogue = Catalogue::new("en");
        extractor
            .extract(Path::new("app.ts"), &roots, &mut catalogue)
            .unwrap();

        assert_eq!(logger.messages().len(), 1);
        assert!(logger.messages()[0].contains("identifier"));
        assert!(catalogue.get("messages", "still.extracted").is_some());
    }

    #[test]
    fn test_ignore_directive_skips_silently() {
        let logger = RecordingLogger::default();
        let extractor = CallExtractor::new().with_logger(Box::new(logger.clone()));

        let arg = Node::other("identifier", Vec::new(), 7).with_comment("@Ignore");
        let roots = vec![Node::call("trans", vec![arg], 7)];
        let mut catalogue = Catalogue::new("en");
        extractor
            .extract(Path::new("app.ts"), &roots, &mut catalogue)
            .unwrap();

        assert!(logger.messages().is_empty());
        assert_eq!(catalogue.message_count(), 0);
    }

    #[test]
    fn test_non_literal_domain_is_an_error() {
        let roots = vec![Node::call(
            "trans",
            vec![
                Node::string("a.b", 2),
                Node::array(Vec::new(), 2),
                Node::other("identifier", Vec::new(), 2),
            ],
            2,
        )];
        let err = extract(&roots).unwrap_err();
        assert!(matches!(err, ExtractError::NonLiteralDomain { line: 2, .. }));
    }

    #[test]
    fn test_comment_on_first_argument_wins() {
        let arg = Node::string("a.b", 1).with_comment(r#"@Desc("from arg")"#);
        let call = Node::call("trans", vec![arg], 1).with_comment(r#"@Desc("from call")"#);
        let catalogue = extract(&[call]).unwrap();

        let message = catalogue.get("messages", "a.b").unwrap();
        assert_eq!(message.desc(), Some("from arg"));
    }

    #[test]
    fn test_comment_falls_back_to_previous_node() {
        let previous =
            Node::other("statement", Vec::new(), 1).with_comment(r#"@Desc("from before")"#);
        let call = Node::call("trans", vec![Node::string("a.b", 2)], 2);
        let catalogue = extract(&[previous, call]).unwrap();

        let message = catalogue.get("messages", "a.b").unwrap();
        assert_eq!(message.desc(), Some("from before"));
        assert_eq!(message.meaning(), None);
    }

    #[test]
    fn test_desc_and_meaning_from_call_comment() {
        let call = Node::call("trans", vec![Node::string("a.b", 1)], 1)
            .with_comment(r#"@Desc("A label") @Meaning("noun")"#);
        let catalogue = extract(&[call]).unwrap();

        let message = catalogue.get("messages", "a.b").unwrap();
        assert_eq!(message.desc(), Some("A label"));
        assert_eq!(message.meaning(), Some("noun"));
    }

    #[test]
    fn test_unrecognized_calls_and_zero_arg_calls_do_nothing() {
        let roots = vec![
            Node::call("translate", vec![Node::string("a", 1)], 1),
            Node::call("trans", Vec::new(), 2),
        ];
        let catalogue = extract(&roots).unwrap();
        assert_eq!(catalogue.message_count(), 0);
    }

    #[test]
    fn test_case_insensitive_function_match() {
        let roots = vec![Node::call("Trans", vec![Node::string("a.b", 1)], 1)];
        let catalogue = extract(&roots).unwrap();
        assert!(catalogue.get("messages", "a.b").is_some());
    }

    #[test]
    fn test_nested_call_in_receiver_is_extracted() {
        let inner = Node::call("trans", vec![Node::string("inner.id", 1)], 1);
        let outer =
            Node::call("trans", vec![Node::string("outer.id", 1)], 1).with_receiver(inner);
        let catalogue = extract(&[outer]).unwrap();

        assert!(catalogue.get("messages", "inner.id").is_some());
        assert!(catalogue.get("messages", "outer.id").is_some());
    }
}
