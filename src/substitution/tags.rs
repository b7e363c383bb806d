use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::language_data::SuitTag;

// @module: Placeholder tag grammar

// @const: Anything that looks like a tag
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{.*\}").unwrap());

/// A `${...}` placeholder identifying one translatable unit across languages
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// `${VE_suit}`: the display name of a suit
    pub fn suit(group: SuitTag) -> Self {
        Self(format!("${{{}_suit}}", group))
    }

    /// `${WC_Joker}`
    pub fn joker() -> Self {
        Self("${WC_Joker}".to_string())
    }

    /// Tag for one field of one card or sentence.
    ///
    /// Suit cards repeat the suit in the card id (`${VE_VE3_desc}`), wild cards
    /// do not (`${WC_A_desc}`) and sentences carry no field (`${Common_T00010}`).
    pub fn entry(group: SuitTag, id: &str, field: &str) -> Self {
        match group {
            SuitTag::WC => Self(format!("${{{}_{}_{}}}", group, id, field)),
            SuitTag::Common => Self(format!("${{{}_{}}}", group, id)),
            _ => Self(format!("${{{}_{}{}_{}}}", group, group, id, field)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Field name of an entry tag, e.g. `owasp_scp` for `${VE_VE2_owasp_scp}`
    pub fn field_name(tag: &str) -> Option<&str> {
        let inner = tag.strip_prefix("${")?.strip_suffix('}')?;
        inner.splitn(3, '_').nth(2).filter(|field| !field.is_empty())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

/// Whether `text` already holds a tag-shaped substring
pub fn contains_tag(text: &str) -> bool {
    TAG_REGEX.is_match(text)
}
