//! The catalogue accumulated over one extraction run.

use std::collections::BTreeMap;

use super::Message;

/// A named partition of a catalogue, mapping message id to message.
#[derive(Debug, Clone, Default)]
pub struct Domain {
    name: String,
    messages: BTreeMap<String, Message>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merge-or-insert a message under its id.
    pub fn add(&mut self, message: Message) {
        match self.messages.get_mut(message.id()) {
            Some(existing) => existing.merge(message),
            None => {
                self.messages.insert(message.id().to_string(), message);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    /// All messages in id order. Restartable: call again for a fresh pass.
    pub fn all(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Top-level container owning all domains plus the target locale used when
/// dumping.
#[derive(Debug, Clone)]
pub struct Catalogue {
    locale: String,
    domains: BTreeMap<String, Domain>,
}

impl Catalogue {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            domains: BTreeMap::new(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// Merge-or-insert keyed by `(domain, id)`.
    pub fn add(&mut self, message: Message) {
        self.domains
            .entry(message.domain().to_string())
            .or_insert_with(|| Domain::new(message.domain()))
            .add(message);
    }

    /// Lookup; absence is a normal empty result, not an error.
    pub fn get(&self, domain: &str, id: &str) -> Option<&Message> {
        self.domains.get(domain).and_then(|d| d.get(id))
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.get(name)
    }

    /// All domains in name order.
    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.values()
    }

    pub fn message_count(&self) -> usize {
        self.domains.values().map(Domain::len).sum()
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new("en")
    }
}
