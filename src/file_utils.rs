use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::{ConvertError, ConvertResult};
use crate::language_data::Meta;

// @module: File and directory utilities

/// Archive entry that must come first, uncompressed, in interchange packages
pub const MIMETYPE_ENTRY: &str = "mimetype";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory, recursively and sorted
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let extension = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            {
                result.push(path.to_path_buf());
            }
        }

        debug!(
            "Found {} files of type {} in {:?}. Showing first few:\n* {}",
            result.len(),
            extension,
            dir.as_ref(),
            result
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join("\n* ")
        );
        Ok(result)
    }

    // @returns: Path ending in `extension`; a numeric extension (a version) is kept and extended
    pub fn check_fix_file_extension<P: AsRef<Path>>(path: P, extension: &str) -> PathBuf {
        let path = path.as_ref();
        let extension = extension.trim_start_matches('.');
        if path.as_os_str().is_empty() || path.to_string_lossy().ends_with(extension) {
            return path.to_path_buf();
        }

        let current = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        let fixed = if !current.is_empty() && current.chars().all(|c| c.is_ascii_digit()) {
            PathBuf::from(format!("{}.{}", path.display(), extension))
        } else {
            path.with_extension(extension)
        };
        debug!("Output filename with new ext = {:?}", fixed);
        fixed
    }

    /// Replace the meta placeholders in the file name of `path`.
    ///
    /// `_template` is dropped unless a template is being made.
    pub fn apply_meta_placeholders<P: AsRef<Path>>(path: P, meta: &Meta, making_template: bool) -> PathBuf {
        let path = path.as_ref();
        let Some(file_name) = path.file_name() else {
            return path.to_path_buf();
        };

        let mut replacements = vec![
            ("_type", format!("_{}", meta.edition.to_lowercase())),
            ("_edition", format!("_{}", meta.edition.to_lowercase())),
            ("_component", format!("_{}", meta.component.to_lowercase())),
            ("_language", format!("_{}", meta.language.to_lowercase())),
            ("_lang", format!("_{}", meta.language.to_lowercase())),
            ("_version", format!("_{}", meta.version.to_lowercase())),
            ("_ver", format!("_{}", meta.version.to_lowercase())),
        ];
        if !making_template {
            replacements.push(("_template", String::new()));
        }

        let mut name = file_name.to_string_lossy().to_string();
        for (placeholder, value) in &replacements {
            name = name.replace(placeholder, value);
        }
        path.with_file_name(name)
    }

    /// Locate an input document given on the command line.
    ///
    /// Tried in order: absolute path, relative to `base`, relative to `base`
    /// without `../`, relative to the parent of `base`, relative to `base`
    /// without `scripts/`.
    pub fn resolve_input_file<P: AsRef<Path>>(base: P, input: &str) -> Option<PathBuf> {
        let base = base.as_ref();
        let input = input.replace("\\ ", " ");
        let input_path = Path::new(&input);
        if input_path.is_absolute() {
            return Self::file_exists(input_path).then(|| input_path.to_path_buf());
        }

        let separator = std::path::MAIN_SEPARATOR;
        let mut candidates = vec![
            base.join(&input),
            base.join(input.replace(&format!("..{}", separator), "")),
        ];
        if !input.contains("..") {
            candidates.push(base.join("..").join(&input));
        }
        candidates.push(base.join(input.replace(&format!("scripts{}", separator), "")));

        let found = candidates.into_iter().find(|candidate| Self::file_exists(candidate));
        if found.is_none() {
            debug!("Template doc not found. Input file = {}", input);
        }
        found
    }

    /// Extract every entry of a zip archive below `destination`.
    ///
    /// Entries whose names would escape `destination` are skipped.
    pub fn extract_archive<P1: AsRef<Path>, P2: AsRef<Path>>(archive_path: P1, destination: P2) -> ConvertResult<usize> {
        let archive_path = archive_path.as_ref();
        let destination = destination.as_ref();
        let file = fs::File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let mut extracted = 0;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let Some(relative) = entry.enclosed_name() else {
                warn!("Skipping archive entry with unsafe name: {}", entry.name());
                continue;
            };
            let out_path = destination.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out_file = fs::File::create(&out_path)?;
            io::copy(&mut entry, &mut out_file)?;
            extracted += 1;
        }

        debug!(
            "Extracted {} files from {:?} into {:?}",
            extracted, archive_path, destination
        );
        Ok(extracted)
    }

    /// Zip every file below `dir` into `archive_path`, names relative to `dir`.
    ///
    /// A `mimetype` entry is written first and stored, as packages require.
    pub fn zip_dir<P1: AsRef<Path>, P2: AsRef<Path>>(dir: P1, archive_path: P2) -> ConvertResult<()> {
        let dir = dir.as_ref();
        let archive_path = archive_path.as_ref();

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| ConvertError::Io(io::Error::other(e.to_string())))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| ConvertError::Archive(e.to_string()))?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            files.push((name, entry.path().to_path_buf()));
        }
        // Stable sort keeps walk order for everything else
        files.sort_by_key(|(name, _)| name != MIMETYPE_ENTRY);

        let file = fs::File::create(archive_path)?;
        let mut zip = zip::ZipWriter::new(file);
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, path) in &files {
            let options = if name == MIMETYPE_ENTRY { stored } else { deflated };
            zip.start_file(name.as_str(), options)?;
            let mut source = fs::File::open(path)?;
            io::copy(&mut source, &mut zip)?;
        }
        zip.finish()?;

        debug!("Zipped {} files into {:?}", files.len(), archive_path);
        Ok(())
    }
}
