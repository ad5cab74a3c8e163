//! A single translatable message and its metadata.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Where a message occurrence was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(FileSource),
    /// Non-file provenance (e.g. a database row), dumped as a plain text
    /// reference.
    Custom(String),
}

/// File/line/column of one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: String,
    line: Option<u32>,
    column: Option<u32>,
}

impl FileSource {
    pub fn new(path: impl Into<String>, line: u32) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
            column: None,
        }
    }

    pub fn path_only(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
            column: None,
        }
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn column(&self) -> Option<u32> {
        self.column
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(file) => file.fmt(f),
            Source::Custom(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(column) = self.column {
            write!(f, ":{column}")?;
        }
        Ok(())
    }
}

/// Translator-facing note with optional provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub text: String,
    pub from: Option<String>,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from: None,
        }
    }

    pub fn from(text: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from: Some(from.into()),
        }
    }
}

/// XLIFF workflow state of a target string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    New,
    NeedsTranslation,
    Translated,
    Final,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::New => "new",
            State::NeedsTranslation => "needs-translation",
            State::Translated => "translated",
            State::Final => "final",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A translatable unit, identified by `(domain, id)` within a catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: String,
    domain: String,
    /// True until an actual translation is attached; a new message dumps
    /// with target state "new".
    new: bool,
    desc: Option<String>,
    meaning: Option<String>,
    locale_string: Option<String>,
    sources: Vec<Source>,
    placeholders: BTreeSet<String>,
    alternative_translations: BTreeMap<String, String>,
    approved: bool,
    state: Option<State>,
    notes: Vec<Note>,
}

impl Message {
    pub fn new(id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: domain.into(),
            new: true,
            desc: None,
            meaning: None,
            locale_string: None,
            sources: Vec::new(),
            placeholders: BTreeSet::new(),
            alternative_translations: BTreeMap::new(),
            approved: false,
            state: None,
            notes: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_new(&self) -> bool {
        self.new
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn meaning(&self) -> Option<&str> {
        self.meaning.as_deref()
    }

    /// The text shown as `<source>`: the description when the developer
    /// provided one, otherwise the literal id.
    pub fn source_string(&self) -> &str {
        self.desc.as_deref().unwrap_or(&self.id)
    }

    /// The text shown as `<target>`: the attached translation when there is
    /// one, otherwise the source string.
    pub fn locale_string(&self) -> &str {
        self.locale_string
            .as_deref()
            .unwrap_or_else(|| self.source_string())
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(String::as_str)
    }

    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    pub fn alternative_translation(&self, locale: &str) -> Option<&str> {
        self.alternative_translations.get(locale).map(String::as_str)
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn state(&self) -> Option<State> {
        self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn set_desc(&mut self, desc: Option<String>) {
        self.desc = desc;
    }

    pub fn set_meaning(&mut self, meaning: Option<String>) {
        self.meaning = meaning;
    }

    /// Attach a real translation. Clears the `new` flag.
    pub fn set_locale_string(&mut self, text: impl Into<String>) {
        self.locale_string = Some(text.into());
        self.new = false;
    }

    pub fn add_source(&mut self, source: Source) {
        self.sources.push(source);
    }

    pub fn add_placeholder(&mut self, name: impl Into<String>) {
        self.placeholders.insert(name.into());
    }

    pub fn add_alternative_translation(
        &mut self,
        locale: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.alternative_translations.insert(locale.into(), text.into());
    }

    pub fn set_approved(&mut self, approved: bool) {
        self.approved = approved;
    }

    pub fn set_state(&mut self, state: State) {
        self.state = Some(state);
    }

    pub fn add_note(&mut self, note: Note) {
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }

    /// Merge another occurrence of the same `(domain, id)` into this one.
    ///
    /// Scalar fields keep the first writer's value; sources, placeholders,
    /// alternative translations and notes are unioned. `new` only stays set
    /// while every contributing occurrence is new.
    pub fn merge(&mut self, other: Message) {
        debug_assert_eq!(self.id, other.id);
        debug_assert_eq!(self.domain, other.domain);

        self.new = self.new && other.new;
        if self.desc.is_none() {
            self.desc = other.desc;
        }
        if self.meaning.is_none() {
            self.meaning = other.meaning;
        }
        if self.locale_string.is_none() {
            self.locale_string = other.locale_string;
        }
        if self.state.is_none() {
            self.state = other.state;
        }
        self.approved = self.approved || other.approved;
        for source in other.sources {
            if !self.sources.contains(&source) {
                self.sources.push(source);
            }
        }
        self.placeholders.extend(other.placeholders);
        for (locale, text) in other.alternative_translations {
            self.alternative_translations.entry(locale).or_insert(text);
        }
        for note in other.notes {
            self.add_note(note);
        }
    }
}
