/*!
 * Tag substitution engine.
 *
 * This module decides, for every piece of document text, whether and how to
 * replace it. It is split into several submodules:
 *
 * - `tags`: the `${...}` placeholder grammar shared by all language files
 * - `normalizer`: rendering of list-valued card fields (range compression)
 * - `dictionary`: building the ordered replacement dictionary from language data
 * - `resolver`: matching one unit of document text against the dictionary
 *
 * Both substitution directions run through the same code, parametrized by
 * [`Direction`].
 */

// Re-export main types for easier usage
pub use self::dictionary::{DictionaryBuilder, ReplacementDictionary};
pub use self::resolver::{LINE_SEPARATOR, MatchResolver, SOURCE_LABELS};
pub use self::tags::{Tag, contains_tag};

// Submodules
pub mod dictionary;
pub mod normalizer;
pub mod resolver;
pub mod tags;

/// Language sentinel that selects template generation
pub const TEMPLATE_LANGUAGE: &str = "template";

/// Which way text is substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Natural-language text is replaced by tags (builds a template document)
    MakingTemplate,
    /// Tags are replaced by natural-language text
    Translating,
}

impl Direction {
    /// Direction implied by the requested output language
    pub fn for_language(language: &str) -> Self {
        if language.eq_ignore_ascii_case(TEMPLATE_LANGUAGE) {
            Self::MakingTemplate
        } else {
            Self::Translating
        }
    }

    pub fn is_making_template(&self) -> bool {
        matches!(self, Self::MakingTemplate)
    }
}
