/*!
 * # cornucopia-convert
 *
 * A Rust library that converts OWASP Cornucopia card documents between a
 * language-neutral template and finished documents in one language.
 *
 * ## Features
 *
 * - Build replacement dictionaries from the YAML language and mapping files
 * - Compress numeric requirement lists into ranges and re-wrap long values
 * - Make templates from an original document (text becomes `${...}` tags)
 * - Translate templates back into any language file (tags become text)
 * - Formats:
 *   - Word processing documents (docx)
 *   - Pdf through an external docx converter
 *   - Interchange packages (idml)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `language_data`: Loading and validating the YAML language files
 * - `substitution`: Tag grammar, value normalizer, dictionary and match resolver:
 *   - `substitution::tags`: The `${...}` placeholder grammar
 *   - `substitution::normalizer`: List rendering and range compression
 *   - `substitution::dictionary`: Ordered replacement dictionaries
 *   - `substitution::resolver`: Matching one text unit against the dictionary
 * - `documents`: Walkers for docx paragraphs and idml story fragments
 * - `pdf`: External pdf conversion
 * - `file_utils`: File system and archive operations
 * - `app_controller`: Conversion pipeline over file types and languages
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod documents;
pub mod errors;
pub mod file_utils;
pub mod language_data;
pub mod language_utils;
pub mod pdf;
pub mod substitution;

// Re-export main types for easier usage
pub use app_config::{Config, FileType};
pub use app_controller::{Controller, RunOptions};
pub use documents::{DocumentWalker, DocxDocument, IdmlPackage};
pub use errors::{ConvertError, ConvertResult, XmlError};
pub use language_data::{LanguageData, Meta};
pub use language_utils::{get_language_name, language_tags_match, normalize_language_tag};
pub use substitution::{Direction, DictionaryBuilder, MatchResolver, ReplacementDictionary};
