/*!
 * Matching of one unit of document text against the replacement dictionary.
 *
 * Each candidate pair is tried in order and the first one that applies wins:
 * exact, trimmed (with typographic apostrophes), case-insensitive, then a
 * direction specific layout rule:
 *
 * - making a template: a citation box such as `OWASP SCP\u{2028}69, 107-109`
 *   becomes `OWASP SCP\u{2028}${VE_VE2_owasp_scp}`
 * - translating: `OWASP SCP\u{2028}${VE_VE2_owasp_scp}` gets the mapping value,
 *   re-broken over two lines when it is too wide for the box
 */

use crate::app_config::MatchConfig;
use crate::substitution::Direction;
use crate::substitution::tags::Tag;

/// Line separator used inside interchange-format text frames
pub const LINE_SEPARATOR: char = '\u{2028}';

/// Labels that open a citation box on the cards
pub const SOURCE_LABELS: [&str; 5] = ["OWASP SCP", "OWASP ASVS", "OWASP AppSensor", "CAPEC", "SAFECODE"];

/// Decides which dictionary pair, if any, applies to a piece of text
#[derive(Debug, Clone, Default)]
pub struct MatchResolver {
    config: MatchConfig,
}

impl MatchResolver {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Replacement text for `text`, or `None` when no candidate applies
    pub fn resolve(&self, text: &str, candidates: &[(&str, &str)], direction: Direction) -> Option<String> {
        for &(key, value) in candidates {
            if let Some(found) = Self::match_exact(text, key, value) {
                return Some(found);
            }
            let found = match direction {
                Direction::MakingTemplate => Self::match_suit_label(text, key, value),
                Direction::Translating => self.match_mapping_value(text, key, value),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Exact, trimmed and case-insensitive comparisons of `text` with `key`
    pub fn match_exact(text: &str, key: &str, value: &str) -> Option<String> {
        let normalized_key = normalize_apostrophes(key);
        let normalized_key = normalized_key.trim();
        let normalized_text = normalize_apostrophes(text);
        let normalized_text = normalized_text.trim();

        if text == key {
            Some(value.to_string())
        } else if normalized_text == normalized_key {
            Some(value.trim().to_string())
        } else if text.to_lowercase() == key.to_lowercase() {
            Some(value.to_string())
        } else if normalized_text.to_lowercase() == normalized_key.to_lowercase() {
            Some(value.trim().to_string())
        } else {
            None
        }
    }

    /// Substring rule used for word processing runs: every occurrence of `key`
    /// is replaced. `None` when `key` is empty or absent.
    pub fn substitute(text: &str, key: &str, value: &str) -> Option<String> {
        if key.is_empty() || !text.contains(key) {
            return None;
        }
        Some(text.replace(key, value))
    }

    /// Template rule for citation boxes: `label`, separator, compacted key.
    ///
    /// The label length comes from the tag's field name (`owasp_scp` is
    /// `OWASP SCP`); whatever character follows the label is taken as the
    /// separator.
    pub fn match_suit_label(text: &str, key: &str, tag: &str) -> Option<String> {
        let value_name = Tag::field_name(tag)?.replace('_', " ").to_lowercase();
        let value_name = value_name.trim();
        if !text.to_lowercase().starts_with(value_name) {
            return None;
        }

        let label_len = value_name.chars().count();
        let head: String = text.chars().take(label_len).collect();
        let rest: String = text.chars().skip(label_len + 1).collect::<String>().replace(' ', "");
        let candidate = format!("{}{}{}", head, LINE_SEPARATOR, rest.trim());

        let compact_key = key.replace(' ', "");
        let (_, cited) = split_source_label(&candidate)?;
        if cited == compact_key.trim() {
            Some(format!("{}{}{}", head, LINE_SEPARATOR, tag))
        } else {
            None
        }
    }

    /// Translation rule for citation boxes: `label`, separator, tag
    pub fn match_mapping_value(&self, text: &str, key: &str, value: &str) -> Option<String> {
        let (_, cited) = split_source_label(text.trim())?;
        if cited != key.trim() {
            return None;
        }
        let prefix = text.split(LINE_SEPARATOR).next().unwrap_or_default();
        Some(self.rewrap(text, prefix, key, value))
    }

    /// Lay a mapping value out in the fixed-width citation box
    fn rewrap(&self, text: &str, prefix: &str, key: &str, value: &str) -> String {
        let prefix_len = prefix.chars().count();
        let original = value;
        let value = if value.chars().count() + prefix_len > self.config.long_value_length {
            value.replace(", ", ",")
        } else {
            value.to_string()
        };

        // Short enough for one line: the value goes in as written, not compacted
        if value.chars().count() < self.config.rewrap_min_length {
            return text.replace(key, original);
        }

        let start = self.config.rewrap_column.saturating_sub(prefix_len);
        let split = value
            .chars()
            .enumerate()
            .skip(start)
            .find(|&(_, c)| c == ',')
            .map(|(i, _)| i + 1)
            .unwrap_or(0);
        let head: String = value.chars().take(split).collect();
        let tail: String = value.chars().skip(split).collect();

        format!(
            "{}{}{}{}{}",
            prefix,
            self.config.rewrap_indent,
            head,
            LINE_SEPARATOR,
            tail.trim()
        )
    }
}

/// Replace ASCII apostrophes with the typographic one used in the documents
fn normalize_apostrophes(text: &str) -> String {
    text.replace('\'', "\u{2019}")
}

/// Split `label` + separator off the front of `text`
pub fn split_source_label(text: &str) -> Option<(&'static str, &str)> {
    SOURCE_LABELS.iter().find_map(|&label| {
        text.strip_prefix(label)
            .and_then(|rest| rest.strip_prefix(LINE_SEPARATOR))
            .map(|rest| (label, rest))
    })
}
