//! XLIFF 1.2 dumper.
//!
//! Serializes one catalogue domain to an XLIFF document and merges forward
//! any translator-added attributes found in a previously generated file.
//!
//! Two rules of the output are compatibility-critical for tools that diff
//! the raw text: source/target/note content is written as CDATA exactly
//! when it contains `<`, `>` or `&` (plain text with `xml:space="preserve"`
//! when it merely contains a newline, carriage return or tab), and source
//! references are sorted by a path/line/column composite key so the output
//! does not depend on extraction pass order.
//!
//! See <http://docs.oasis-open.org/xliff/v1.2/os/xliff-core.html>.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::model::{Catalogue, Message, Source, State};

const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";
const TOOL_NAMESPACE: &str = "urn:transcat:translation";
const XLIFF_VERSION: &str = "1.2";

/// Unit attributes owned by the dumper; never carried over from an
/// existing file.
const PROTECTED_ATTRIBUTES: [&str; 3] = ["id", "resname", "extradata"];

/// Errors produced while dumping.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to read existing file {path}: {source}")]
    ReadExisting {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The existing interchange file is given but not parseable. Always
    /// fatal: silently regenerating would drop translator edits.
    #[error("existing file {path} is not well-formed XML: {detail}")]
    MalformedExistingFile { path: String, detail: String },

    #[error("failed to serialize XLIFF document: {0}")]
    Serialize(String),
}

/// Attributes recovered from an existing file, keyed by unit identity hash.
/// Values keep the attribute order of the file they came from.
pub type CustomAttributes = HashMap<String, Vec<(String, String)>>;

/// XLIFF 1.2 dumper. The date and reference knobs exist so regenerated
/// catalogues can stay diff-friendly.
#[derive(Debug, Clone)]
pub struct XliffDumper {
    source_language: String,
    add_date: bool,
    add_reference: bool,
    add_reference_position: bool,
}

impl Default for XliffDumper {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            add_date: true,
            add_reference: true,
            add_reference_position: true,
        }
    }
}

impl XliffDumper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_source_language(&mut self, lang: impl Into<String>) {
        self.source_language = lang.into();
    }

    pub fn set_add_date(&mut self, add_date: bool) {
        self.add_date = add_date;
    }

    pub fn set_add_reference(&mut self, add_reference: bool) {
        self.add_reference = add_reference;
    }

    pub fn set_add_reference_position(&mut self, add_reference_position: bool) {
        self.add_reference_position = add_reference_position;
    }

    /// Stable identity hash of a message id, used as the `trans-unit` id
    /// attribute and as the carry-over key.
    pub fn identity_hash(id: &str) -> String {
        format!("{:x}", Sha256::digest(id.as_bytes()))
    }

    /// Serialize `domain` of `catalogue`. When `existing` points at a
    /// previously generated file, translator-added unit attributes are
    /// carried over by identity hash.
    pub fn dump(
        &self,
        catalogue: &Catalogue,
        domain: &str,
        existing: Option<&Path>,
    ) -> Result<String, DumpError> {
        let custom_attributes = match existing {
            Some(path) if path.exists() => self.extract_custom_attributes(path)?,
            _ => CustomAttributes::new(),
        };

        let mut buffer = Vec::new();
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(serialize_err)?;

        let mut root = BytesStart::new("xliff");
        root.push_attribute(("xmlns", XLIFF_NAMESPACE));
        root.push_attribute(("xmlns:tc", TOOL_NAMESPACE));
        root.push_attribute(("version", XLIFF_VERSION));
        writer.write_event(Event::Start(root)).map_err(serialize_err)?;

        let mut file = BytesStart::new("file");
        if self.add_date {
            file.push_attribute(("date", generation_date().as_str()));
        }
        file.push_attribute(("source-language", self.source_language.as_str()));
        file.push_attribute(("target-language", catalogue.locale()));
        file.push_attribute(("datatype", "plaintext"));
        file.push_attribute(("original", "not.available"));
        writer.write_event(Event::Start(file)).map_err(serialize_err)?;

        self.write_header(&mut writer)?;

        writer
            .write_event(Event::Start(BytesStart::new("body")))
            .map_err(serialize_err)?;

        if let Some(domain) = catalogue.domain(domain) {
            for message in domain.all() {
                self.write_unit(&mut writer, catalogue, message, &custom_attributes)?;
            }
        }

        for name in ["body", "file", "xliff"] {
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(serialize_err)?;
        }

        String::from_utf8(buffer).map_err(serialize_err)
    }

    /// Recover translator-added attributes from an existing file: for every
    /// `trans-unit`, its full attribute set minus the protected names,
    /// keyed by identity hash. A file that fails to parse is a fatal input
    /// error.
    pub fn extract_custom_attributes(&self, path: &Path) -> Result<CustomAttributes, DumpError> {
        let contents = fs::read_to_string(path).map_err(|source| DumpError::ReadExisting {
            path: path.display().to_string(),
            source,
        })?;

        let malformed = |detail: String| DumpError::MalformedExistingFile {
            path: path.display().to_string(),
            detail,
        };

        let mut result = CustomAttributes::new();
        let mut reader = Reader::from_str(&contents);
        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                    if element.local_name().as_ref() != b"trans-unit" {
                        continue;
                    }
                    let mut id = None;
                    let mut attributes = Vec::new();
                    for attribute in element.attributes() {
                        let attribute = attribute.map_err(|e| malformed(e.to_string()))?;
                        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
                        let value = attribute
                            .unescape_value()
                            .map_err(|e| malformed(e.to_string()))?
                            .to_string();
                        if key == "id" {
                            id = Some(value.clone());
                        }
                        if !PROTECTED_ATTRIBUTES.contains(&key.as_str()) {
                            attributes.push((key, value));
                        }
                    }
                    if let Some(id) = id
                        && !attributes.is_empty()
                    {
                        result.insert(id, attributes);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(malformed(e.to_string())),
            }
        }

        Ok(result)
    }

    fn write_header<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), DumpError> {
        writer
            .write_event(Event::Start(BytesStart::new("header")))
            .map_err(serialize_err)?;

        let mut tool = BytesStart::new("tool");
        tool.push_attribute(("tool-id", "transcat"));
        tool.push_attribute(("tool-name", "transcat"));
        tool.push_attribute(("tool-version", env!("CARGO_PKG_VERSION")));
        writer.write_event(Event::Empty(tool)).map_err(serialize_err)?;

        writer
            .write_event(Event::Start(BytesStart::new("note")))
            .map_err(serialize_err)?;
        writer
            .write_event(Event::Text(BytesText::new(
                "The source node in most cases contains the sample message as written by \
                 the developer. If it looks like a dot-delimited string such as \
                 \"form.label.firstname\", then the developer has not provided a default \
                 message.",
            )))
            .map_err(serialize_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("note")))
            .map_err(serialize_err)?;

        writer
            .write_event(Event::End(BytesEnd::new("header")))
            .map_err(serialize_err)
    }

    fn write_unit<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        catalogue: &Catalogue,
        message: &Message,
        custom_attributes: &CustomAttributes,
    ) -> Result<(), DumpError> {
        let id_hash = Self::identity_hash(message.id());

        let mut unit = BytesStart::new("trans-unit");
        unit.push_attribute(("id", id_hash.as_str()));
        unit.push_attribute(("resname", message.id()));
        if message.is_approved() {
            unit.push_attribute(("approved", "yes"));
        }
        if let Some(attributes) = custom_attributes.get(&id_hash) {
            // Attributes the dumper writes itself for this unit win over the
            // carried-over copy; an attribute may appear only once.
            let emitted_here = |key: &str| {
                (key == "approved" && message.is_approved())
                    || (key == "tc:meaning" && message.meaning().is_some())
            };
            for (key, value) in attributes {
                if emitted_here(key) {
                    continue;
                }
                unit.push_attribute((key.as_str(), value.as_str()));
            }
        }
        if let Some(meaning) = message.meaning() {
            unit.push_attribute(("tc:meaning", meaning));
        }
        writer.write_event(Event::Start(unit)).map_err(serialize_err)?;

        write_text_element(writer, "source", message.source_string(), &[])?;

        let mut target_text = message.locale_string();
        if target_text == message.source_string()
            && let Some(alt) = message.alternative_translation(catalogue.locale())
        {
            target_text = alt;
        }
        let state = match message.state() {
            Some(state) => Some(state),
            None if message.is_new() => Some(State::New),
            None => None,
        };
        let target_attributes: Vec<(&str, &str)> = match &state {
            Some(state) => vec![("state", state.as_str())],
            None => Vec::new(),
        };
        write_text_element(writer, "target", target_text, &target_attributes)?;

        for note in message.notes() {
            let attributes: Vec<(&str, &str)> = match &note.from {
                Some(from) => vec![("from", from.as_str())],
                None => Vec::new(),
            };
            write_text_element(writer, "note", &note.text, &attributes)?;
        }

        // Non-XLIFF elements must come after the standard fields, per the
        // OASIS 1.2 content model.
        if self.add_reference {
            self.write_references(writer, message)?;
        }

        for placeholder in message.placeholders() {
            write_text_element(writer, "tc:placeholder", placeholder, &[])?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("trans-unit")))
            .map_err(serialize_err)
    }

    /// Emit one reference per distinct sort key. The key is the path plus,
    /// when positions are emitted, line and column; without positions each
    /// file is referenced once.
    fn write_references<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        message: &Message,
    ) -> Result<(), DumpError> {
        let mut sorted: std::collections::BTreeMap<String, &Source> =
            std::collections::BTreeMap::new();
        for source in message.sources() {
            let key = match source {
                Source::File(file) => {
                    if self.add_reference_position {
                        format!(
                            "{}-{}-{}",
                            file.path(),
                            file.line().map(|l| l.to_string()).unwrap_or_default(),
                            file.column().map(|c| c.to_string()).unwrap_or_default(),
                        )
                    } else {
                        file.path().to_string()
                    }
                }
                Source::Custom(text) => text.clone(),
            };
            sorted.entry(key).or_insert(source);
        }

        for source in sorted.values() {
            match source {
                Source::File(file) => {
                    let mut reference = BytesStart::new("tc:reference-file");
                    if self.add_reference_position {
                        if let Some(line) = file.line() {
                            reference.push_attribute(("line", line.to_string().as_str()));
                        }
                        if let Some(column) = file.column() {
                            reference.push_attribute(("column", column.to_string().as_str()));
                        }
                    }
                    writer
                        .write_event(Event::Start(reference))
                        .map_err(serialize_err)?;
                    writer
                        .write_event(Event::Text(BytesText::new(file.path())))
                        .map_err(serialize_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("tc:reference-file")))
                        .map_err(serialize_err)?;
                }
                Source::Custom(text) => {
                    write_text_element(writer, "tc:reference", text, &[])?;
                }
            }
        }

        Ok(())
    }
}

/// Write `<name>text</name>`, applying the escaping rule: CDATA when the
/// text contains markup characters, otherwise a plain text node marked
/// `xml:space="preserve"` when it spans lines or contains tabs.
fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
    attributes: &[(&str, &str)],
) -> Result<(), DumpError> {
    let needs_cdata = text.contains(['<', '>', '&']);

    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        start.push_attribute((*key, *value));
    }
    if !needs_cdata && text.contains(['\n', '\r', '\t']) {
        start.push_attribute(("xml:space", "preserve"));
    }
    writer.write_event(Event::Start(start)).map_err(serialize_err)?;
    if needs_cdata {
        writer
            .write_event(Event::CData(BytesCData::new(text)))
            .map_err(serialize_err)?;
    } else {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(serialize_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(serialize_err)
}

fn serialize_err(e: impl fmt::Display) -> DumpError {
    DumpError::Serialize(e.to_string())
}

/// UTC timestamp without sub-second precision, e.g. `2024-05-01T12:00:00Z`.
fn generation_date() -> String {
    let now = OffsetDateTime::now_utc();
    let now = now.replace_nanosecond(0).unwrap_or(now);
    now.format(&Rfc3339).unwrap_or_default()
}
