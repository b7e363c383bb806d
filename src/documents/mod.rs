/*!
 * Document walkers.
 *
 * A walker enumerates the text units of one document format and applies the
 * replacement candidates to them:
 *
 * - `docx`: paragraphs and table cells of a word processing document
 * - `idml`: `Content` elements of the Story fragments of an interchange package
 * - `xml_tree`: the small mutable XML tree both walkers edit
 */

use std::fmt;

use crate::errors::ConvertResult;
use crate::substitution::Direction;

pub use self::docx::DocxDocument;
pub use self::idml::IdmlPackage;
pub use self::xml_tree::{Element, Node, XmlDocument};

pub mod docx;
pub mod idml;
pub mod xml_tree;

/// Counters collected during one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Non-blank units that were considered
    pub units_seen: usize,
    /// Units whose text was replaced
    pub units_changed: usize,
    /// Fragments that could not be parsed and were skipped
    pub fragments_failed: usize,
}

impl WalkReport {
    pub fn merge(&mut self, other: WalkReport) {
        self.units_seen += other.units_seen;
        self.units_changed += other.units_changed;
        self.fragments_failed += other.fragments_failed;
    }

    pub fn changed_anything(&self) -> bool {
        self.units_changed > 0
    }
}

impl fmt::Display for WalkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} units seen, {} changed, {} fragments failed",
            self.units_seen, self.units_changed, self.fragments_failed
        )
    }
}

/// Applies replacement candidates to every text unit of a document.
///
/// How a unit is matched belongs to the format: docx paragraphs are rewritten
/// by substring replacement, idml `Content` elements go through the
/// `MatchResolver` the package was built with.
pub trait DocumentWalker {
    /// Walk the document once with `candidates`, already in the order they must be tried
    fn walk(&mut self, candidates: &[(&str, &str)], direction: Direction) -> ConvertResult<WalkReport>;
}
