/*!
 * Interchange packages (.idml).
 *
 * The package is extracted into a scratch directory below the output folder,
 * the `Content` elements of its Story fragments are rewritten in place and the
 * directory is zipped again. The scratch directory is removed when the
 * package is dropped, unless it was asked to be kept.
 */

use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::documents::xml_tree::{Element, XmlDocument};
use crate::documents::{DocumentWalker, WalkReport};
use crate::errors::{ConvertError, ConvertResult};
use crate::file_utils::FileManager;
use crate::substitution::{Direction, MatchResolver, contains_tag};

/// Element holding the text of a story
pub const CONTENT_ELEMENT: &str = "Content";

/// An extracted interchange package
#[derive(Debug)]
pub struct IdmlPackage {
    root: PathBuf,
    /// Present while the scratch directory is owned; `None` once it is kept
    scratch: Option<TempDir>,
    resolver: MatchResolver,
}

impl IdmlPackage {
    /// Extract `archive` into a new scratch directory created in `work_dir`
    pub fn extract<P1: AsRef<Path>, P2: AsRef<Path>>(archive: P1, work_dir: P2, keep: bool) -> ConvertResult<Self> {
        let work_dir = work_dir.as_ref();
        fs::create_dir_all(work_dir)?;
        let scratch = tempfile::Builder::new().prefix("temp").tempdir_in(work_dir)?;
        debug!("Temp folder for extraction of xml files = {:?}", scratch.path());

        FileManager::extract_archive(archive.as_ref(), scratch.path())?;

        let (root, scratch) = if keep {
            let root = scratch.keep();
            info!("Keeping extracted package files in {:?}", root);
            (root, None)
        } else {
            (scratch.path().to_path_buf(), Some(scratch))
        };
        Ok(Self {
            root,
            scratch,
            resolver: MatchResolver::default(),
        })
    }

    /// Match `Content` elements with `resolver` instead of the default rules
    pub fn with_resolver(mut self, resolver: MatchResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Directory holding the extracted files
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_kept(&self) -> bool {
        self.scratch.is_none()
    }

    /// Non-empty XML fragments whose path has `Stories` followed by `Story`
    pub fn story_files(&self) -> ConvertResult<Vec<PathBuf>> {
        let mut stories = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| ConvertError::Io(std::io::Error::other(e.to_string())))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "xml") {
                continue;
            }
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if !is_story_path(&relative.to_string_lossy()) {
                continue;
            }
            if entry.metadata().map(|m| m.len() == 0).unwrap_or(true) {
                debug!("Skipping empty story {:?}", relative);
                continue;
            }
            stories.push(path.to_path_buf());
        }
        Ok(stories)
    }

    /// Zip the extracted files into `output`
    pub fn save<P: AsRef<Path>>(&self, output: P) -> ConvertResult<()> {
        debug!("Finished replacing text in xml files. Now zipping into idml file");
        FileManager::zip_dir(&self.root, output)
    }
}

impl DocumentWalker for IdmlPackage {
    fn walk(&mut self, candidates: &[(&str, &str)], direction: Direction) -> ConvertResult<WalkReport> {
        let mut report = WalkReport::default();
        for story in self.story_files()? {
            match replace_in_fragment(&story, candidates, &self.resolver, direction) {
                Ok(fragment) => report.merge(fragment),
                Err(ConvertError::Parse { path, message }) => {
                    error!("Parsing xml file: {:?}. error = {}", path, message);
                    report.fragments_failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        debug!("Story walk finished: {}", report);
        Ok(report)
    }
}

/// Whether a path relative to the package root names a Story fragment
pub fn is_story_path(relative: &str) -> bool {
    relative
        .find("Stories")
        .is_some_and(|i| relative[i + "Stories".len()..].contains("Story"))
}

/// Resolve every `Content` element of one fragment; the file is rewritten only
/// when something changed.
pub fn replace_in_fragment(
    path: &Path,
    candidates: &[(&str, &str)],
    resolver: &MatchResolver,
    direction: Direction,
) -> ConvertResult<WalkReport> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8(bytes).map_err(|e| ConvertError::parse(path, e.to_string()))?;
    let mut document = XmlDocument::parse(&content).map_err(|e| ConvertError::parse(path, e.to_string()))?;

    let mut report = WalkReport::default();
    if let Some(root) = document.root_mut() {
        root.visit_mut(&mut |element: &mut Element| {
            if !element.is(CONTENT_ELEMENT) {
                return;
            }
            let text = element.text();
            if text.trim().is_empty() {
                return;
            }
            report.units_seen += 1;
            if direction.is_making_template() && contains_tag(&text) {
                return;
            }
            if let Some(replacement) = resolver.resolve(&text, candidates, direction) {
                if replacement != text {
                    element.set_text(&replacement);
                    report.units_changed += 1;
                }
            }
        });
    }

    if report.changed_anything() {
        fs::write(path, document.to_bytes()?)?;
        debug!("Updated {} units in {:?}", report.units_changed, path.file_name().unwrap_or_default());
    }
    Ok(report)
}
