//! Comment directive parsing.
//!
//! All transcat comment directives:
//! - `@Ignore` - suppress extraction-argument errors for the annotated node
//! - `@Desc("...")` - description shown to translators
//! - `@Meaning("...")` - disambiguation string
//! - `@AltTrans(locale = "de", text = "...")` - seed translation for a locale
//! - `@TransString("domain")` - extract the annotated string literal
//! - `@TransArrayKeys("domain")` - extract the keys of the annotated array
//! - `@TransArrayValues("domain")` - extract the values of the annotated array
//!
//! The grammar is deliberately small: a directive is `@Name`, optionally
//! followed by a parenthesized list of quoted strings and/or
//! `key = "quoted"` pairs. Anything that does not match yields no
//! directives rather than an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::DEFAULT_DOMAIN;

// Matches `@Name`; the argument list that may follow is parsed by hand
// because quoted strings can contain anything, including parentheses.
static DIRECTIVE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z][A-Za-z0-9]*)").unwrap());

/// Cheap pre-filter marker: only comments containing this substring are
/// handed to the annotation extractor's full directive parse.
pub const ANNOTATION_MARKER: &str = "@Trans";

/// A typed directive parsed from a source comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Ignore,
    Desc(String),
    Meaning(String),
    AltTrans { locale: String, text: String },
    TransString { domain: String },
    TransArrayKeys { domain: String },
    TransArrayValues { domain: String },
}

/// One argument inside a directive's parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Positional(String),
    Keyword(String, String),
}

impl Directive {
    /// Parse every directive in a raw comment string.
    ///
    /// Unknown names and malformed argument lists are skipped; unrelated
    /// comments produce an empty vec.
    pub fn parse_all(text: &str) -> Vec<Directive> {
        let mut directives = Vec::new();
        let bytes = text.as_bytes();
        // Byte offset already consumed by a previous directive's argument
        // list; `@` occurrences inside quoted arguments are not directives.
        let mut consumed = 0;

        for captures in DIRECTIVE_NAME_REGEX.captures_iter(text) {
            let (Some(full), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if full.start() < consumed {
                continue;
            }
            let mut pos = full.end();

            let mut args = Vec::new();
            let after_ws = pos + text[pos..].len() - text[pos..].trim_start().len();
            if bytes.get(after_ws) == Some(&b'(') {
                match parse_args(bytes, after_ws + 1) {
                    Some((parsed, end)) => {
                        args = parsed;
                        pos = end;
                    }
                    // Unbalanced parentheses: not a directive.
                    None => continue,
                }
            }
            consumed = pos;

            if let Some(directive) = Self::from_parts(name.as_str(), &args) {
                directives.push(directive);
            }
        }

        directives
    }

    fn from_parts(name: &str, args: &[Arg]) -> Option<Directive> {
        match name {
            "Ignore" => Some(Directive::Ignore),
            "Desc" => text_arg(args).map(Directive::Desc),
            "Meaning" => text_arg(args).map(Directive::Meaning),
            "AltTrans" => {
                let locale = keyword(args, "locale").or_else(|| positional(args, 0))?;
                let text = keyword(args, "text").or_else(|| positional(args, 1))?;
                Some(Directive::AltTrans { locale, text })
            }
            "TransString" => Some(Directive::TransString {
                domain: domain_arg(args),
            }),
            "TransArrayKeys" => Some(Directive::TransArrayKeys {
                domain: domain_arg(args),
            }),
            "TransArrayValues" => Some(Directive::TransArrayValues {
                domain: domain_arg(args),
            }),
            _ => None,
        }
    }
}

fn positional(args: &[Arg], index: usize) -> Option<String> {
    args.iter()
        .filter_map(|arg| match arg {
            Arg::Positional(value) => Some(value.clone()),
            Arg::Keyword(..) => None,
        })
        .nth(index)
}

fn keyword(args: &[Arg], name: &str) -> Option<String> {
    args.iter().find_map(|arg| match arg {
        Arg::Keyword(key, value) if key == name => Some(value.clone()),
        _ => None,
    })
}

fn text_arg(args: &[Arg]) -> Option<String> {
    keyword(args, "text").or_else(|| positional(args, 0))
}

fn domain_arg(args: &[Arg]) -> String {
    keyword(args, "domain")
        .or_else(|| positional(args, 0))
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_string())
}

/// Parse the argument list starting just after `(`.
///
/// Returns the parsed arguments and the byte offset just past the closing
/// parenthesis, or `None` when the list never closes.
fn parse_args(bytes: &[u8], mut pos: usize) -> Option<(Vec<Arg>, usize)> {
    let mut args = Vec::new();
    let mut pending_key: Option<String> = None;
    let mut ident_start: Option<usize> = None;

    while pos < bytes.len() {
        match bytes[pos] {
            b')' => {
                return Some((args, pos + 1));
            }
            b'"' => {
                let (value, end) = parse_quoted(bytes, pos + 1)?;
                pos = end;
                match pending_key.take() {
                    Some(key) => args.push(Arg::Keyword(key, value)),
                    None => args.push(Arg::Positional(value)),
                }
            }
            b'=' => {
                if let Some(start) = ident_start.take() {
                    let key = std::str::from_utf8(&bytes[start..pos])
                        .ok()?
                        .trim()
                        .to_string();
                    if !key.is_empty() {
                        pending_key = Some(key);
                    }
                }
                pos += 1;
            }
            b',' => {
                pending_key = None;
                ident_start = None;
                pos += 1;
            }
            c if c.is_ascii_whitespace() => {
                pos += 1;
            }
            _ => {
                if ident_start.is_none() {
                    ident_start = Some(pos);
                }
                pos += 1;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
            }
        }
    }

    None
}

/// Parse a double-quoted string starting just after the opening quote.
/// Supports `\"` and `\\` escapes.
fn parse_quoted(bytes: &[u8], mut pos: usize) -> Option<(String, usize)> {
    let mut value = Vec::new();
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => {
                return Some((String::from_utf8(value).ok()?, pos + 1));
            }
            b'\\' if pos + 1 < bytes.len() && matches!(bytes[pos + 1], b'"' | b'\\') => {
                value.push(bytes[pos + 1]);
                pos += 2;
            }
            byte => {
                value.push(byte);
                pos += 1;
            }
        }
    }
    None
}
