use log::{debug, log_enabled, Level};
use std::collections::HashMap;

use crate::language_data::{LanguageData, SuitTag};
use crate::substitution::Direction;
use crate::substitution::normalizer::field_text;
use crate::substitution::tags::Tag;

// @module: Replacement dictionary built from language data

/// Insertion-ordered find/replace table.
///
/// Keys are unique; inserting an existing key replaces its value and keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementDictionary {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ReplacementDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair; empty keys are ignored. Returns whether the pair was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if key.is_empty() {
            return false;
        }
        let value = value.into();
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Add every pair of `other`, later pairs overriding earlier ones
    pub fn merge(&mut self, other: &ReplacementDictionary) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Drop keys shorter than `min_length` characters.
    ///
    /// Used when making a template so bare card numbers are not matched as text.
    pub fn without_short_keys(self, min_length: usize) -> Self {
        let before = self.len();
        let mut kept = Self::new();
        for (key, value) in self.entries {
            if key.chars().count() >= min_length {
                kept.insert(key, value);
            }
        }
        debug!(
            "Making template. Removed short keys. len before = {}, len after = {}",
            before,
            kept.len()
        );
        kept
    }

    /// Pairs in the order they must be tried.
    ///
    /// Template keys are natural text and are tried longest first so a short key
    /// never wins inside a longer one; translation keys are tags and keep
    /// insertion order.
    pub fn candidates(&self, direction: Direction) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self.iter().collect();
        if direction.is_making_template() {
            pairs.sort_by_key(|(key, _)| std::cmp::Reverse(key.chars().count()));
        }
        pairs
    }
}

/// Builds a [`ReplacementDictionary`] for one direction
#[derive(Debug, Clone, Copy)]
pub struct DictionaryBuilder {
    direction: Direction,
}

impl DictionaryBuilder {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// Build the dictionary for `data`.
    ///
    /// Returns an empty dictionary when the data has no meta block or no
    /// section; callers treat that as a reason to abort the conversion.
    pub fn build(&self, data: &LanguageData) -> ReplacementDictionary {
        let mut dictionary = ReplacementDictionary::new();
        if !data.is_usable() {
            debug!("Language data has no meta block or no sections, dictionary left empty");
            return dictionary;
        }
        let mappings = data.is_mappings();

        for section in &data.sections {
            debug!("Section = {}, child key = {}", section.kind.name(), section.kind.child_key());
            for group in &section.groups {
                self.add_group_name(&mut dictionary, group.tag, group.name.as_deref());

                for entry in &group.entries {
                    for (field, value) in entry.translatable_fields() {
                        let tag = Tag::entry(group.tag, entry.id(), field).into_string();
                        match self.direction {
                            Direction::MakingTemplate => {
                                let literal = field_text(value, false);
                                dictionary.insert(literal.clone(), tag.clone());
                                if mappings {
                                    dictionary.insert(literal.replace(", ", ","), tag.clone());
                                    dictionary.insert(field_text(value, true), tag);
                                }
                            }
                            Direction::Translating => {
                                dictionary.insert(tag, field_text(value, true));
                            }
                        }
                    }
                }
            }
        }

        if !mappings && log_enabled!(Level::Debug) {
            Self::log_sample(&dictionary);
        }
        dictionary
    }

    fn add_group_name(
        &self,
        dictionary: &mut ReplacementDictionary,
        group: SuitTag,
        name: Option<&str>,
    ) {
        let suit_tag = Tag::suit(group).into_string();
        match (self.direction, name) {
            (Direction::MakingTemplate, Some(name)) => {
                dictionary.insert(name, suit_tag);
            }
            (Direction::Translating, Some(name)) => {
                dictionary.insert(suit_tag, name);
            }
            (_, None) => debug!("Group {} has no name", group),
        }

        if group.is_wildcard() {
            match self.direction {
                Direction::MakingTemplate => dictionary.insert("Joker", Tag::joker().into_string()),
                Direction::Translating => dictionary.insert(Tag::joker().into_string(), "Joker"),
            };
        }
    }

    fn log_sample(dictionary: &ReplacementDictionary) {
        let pairs: Vec<String> = dictionary
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        let head = pairs.iter().take(4).cloned().collect::<Vec<_>>().join("\n* ");
        let tail = pairs
            .iter()
            .skip(pairs.len().saturating_sub(4))
            .cloned()
            .collect::<Vec<_>>()
            .join("\n* ");
        debug!("Translation data showing first 4 (key: text):\n* {}", head);
        debug!("Translation data showing last 4 (key: text):\n* {}", tail);
    }
}
