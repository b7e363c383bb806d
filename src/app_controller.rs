use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, FileType};
use crate::documents::{DocumentWalker, DocxDocument, IdmlPackage, WalkReport};
use crate::errors::ConvertError;
use crate::file_utils::FileManager;
use crate::language_data::{LanguageData, Meta, load_language_data, load_mapping_data};
use crate::language_utils;
use crate::pdf::{PdfConverter, PdfOutcome};
use crate::substitution::{Direction, DictionaryBuilder, MatchResolver, ReplacementDictionary, TEMPLATE_LANGUAGE};

// @module: Application controller for document conversion

/// Language value that expands to every configured language
pub const ALL_LANGUAGES: &str = "all";

/// File type value that expands to every available format
pub const ALL_FILE_TYPES: &str = "all";

/// Command line choices that apply to a whole batch
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Input document given on the command line
    pub input_file: Option<String>,
    /// Output file given on the command line, may hold meta placeholders
    pub output_file: Option<String>,
    /// Keep temporary files and allow pdf requests on any platform
    pub debug: bool,
}

/// Outcome of a batch of conversions
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Files written, in batch order
    pub outputs: Vec<PathBuf>,
    /// Pairs that were aborted
    pub failed: usize,
}

/// Main application controller for card conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Batch options from the command line
    options: RunOptions,
    resolver: MatchResolver,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let resolver = MatchResolver::new(config.matching.clone());
        Ok(Self {
            config,
            options: RunOptions::default(),
            resolver,
        })
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn keep_temp_files(&self) -> bool {
        self.config.keep_temp_files || self.options.debug
    }

    /// File types to produce for a `-t` value, falling back to the output file
    /// extension and then to docx.
    pub fn select_file_types(
        requested: Option<&str>,
        output_file: Option<&str>,
        can_convert_pdf: bool,
    ) -> Result<Vec<FileType>> {
        let Some(requested) = requested.filter(|r| !r.is_empty()) else {
            let file_type = output_file
                .and_then(|out| Path::new(out).extension().map(|e| e.to_string_lossy().to_string()))
                .filter(|ext| !ext.is_empty())
                .unwrap_or_else(|| FileType::Docx.extension().to_string());
            return Ok(vec![file_type.parse::<FileType>()?]);
        };

        if requested.eq_ignore_ascii_case(ALL_FILE_TYPES) {
            return Ok(FileType::ALL
                .into_iter()
                .filter(|t| *t != FileType::Pdf || can_convert_pdf)
                .collect());
        }

        let file_type: FileType = requested.parse()?;
        if file_type == FileType::Pdf && !can_convert_pdf {
            error!("PDF output selected but currently unable to output PDF on this OS.");
            return Ok(Vec::new());
        }
        Ok(vec![file_type])
    }

    /// Languages to produce for a `-l` value
    pub fn select_languages(&self, requested: &str) -> Result<Vec<String>> {
        let requested = requested.trim();
        if requested.is_empty() {
            return Ok(vec!["en".to_string()]);
        }
        if requested.eq_ignore_ascii_case(ALL_LANGUAGES) {
            return Ok(self.config.languages.clone());
        }
        if requested.eq_ignore_ascii_case(TEMPLATE_LANGUAGE) {
            return Ok(vec![TEMPLATE_LANGUAGE.to_string()]);
        }

        let normalized = language_utils::normalize_language_tag(requested);
        if !self
            .config
            .languages
            .iter()
            .any(|l| language_utils::language_tags_match(l, &normalized))
        {
            return Err(anyhow!(
                "Unsupported language '{}'. Choose one of: {}, {}, {}",
                requested,
                TEMPLATE_LANGUAGE,
                ALL_LANGUAGES,
                self.config.languages.join(", ")
            ));
        }
        Ok(vec![normalized])
    }

    /// Convert every (file type, language) pair; a failing pair is logged and skipped
    pub fn run(&self, file_types: &[FileType], languages: &[String]) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();
        let jobs: Vec<(FileType, &String)> = file_types
            .iter()
            .flat_map(|file_type| languages.iter().map(move |language| (*file_type, language)))
            .collect();

        let progress_bar = ProgressBar::new(jobs.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = BatchSummary::default();
        for (file_type, language) in jobs {
            progress_bar.set_message(format!("{} {}", file_type, language));
            match self.convert_type_language(file_type, language) {
                Ok(output) => summary.outputs.push(output),
                Err(e) => {
                    error!("Could not convert {} ({}): {:#}", file_type, language, e);
                    summary.failed += 1;
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        info!(
            "Conversion completed: {} written, {} failed in {:.1}s",
            summary.outputs.len(),
            summary.failed,
            start_time.elapsed().as_secs_f64()
        );
        Ok(summary)
    }

    /// Produce one output document and return its path
    pub fn convert_type_language(&self, file_type: FileType, language: &str) -> Result<PathBuf> {
        let direction = Direction::for_language(language);
        let source_path = self.config.source_path();
        let mut yaml_files = FileManager::find_files(&source_path, "yaml")?;
        yaml_files.extend(FileManager::find_files(&source_path, "yml")?);
        if yaml_files.is_empty() {
            return Err(ConvertError::Configuration(format!(
                "No language files found in folder: {:?}",
                source_path
            ))
            .into());
        }

        let language_data = load_language_data(&yaml_files, language)?;
        let meta = language_data.meta.clone().ok_or_else(|| {
            ConvertError::Configuration(
                "Could not find meta tag in the language data. \
                 Please ensure required language file is in the source folder."
                    .to_string(),
            )
        })?;
        debug!("Meta data = {:?}", meta);
        let (language_dict, mapping_dict) = self.build_dictionaries(&language_data, &load_mapping_data(&yaml_files)?, direction)?;

        let template_doc = self.template_document(file_type, direction)?;
        let output_file = self.output_file(file_type, &meta, direction);
        if let Some(parent) = output_file.parent() {
            FileManager::ensure_dir(parent)?;
        }

        let written = match file_type {
            FileType::Docx | FileType::Pdf => {
                let mut doc = DocxDocument::open(&template_doc)?;
                let report = if direction.is_making_template() {
                    let mut report = self.walk(&mut doc, &language_dict, direction)?;
                    report.merge(self.walk(&mut doc, &mapping_dict, direction)?);
                    report
                } else {
                    self.walk(&mut doc, &merged(language_dict, &mapping_dict), direction)?
                };
                debug!("Docx walk: {}", report);

                if file_type == FileType::Docx {
                    doc.save(&output_file)?;
                    output_file
                } else {
                    let temp_docx = self.config.output_dir().join("temp.docx");
                    FileManager::ensure_dir(self.config.output_dir())?;
                    doc.save(&temp_docx)?;
                    let converter = PdfConverter::new(self.config.pdf.clone(), self.keep_temp_files());
                    match converter.convert(&temp_docx, &output_file) {
                        PdfOutcome::Converted(path) => path,
                        PdfOutcome::KeptDocx(path) => {
                            warn!("Pdf not written, the converted docx is at {}", path.display());
                            path
                        }
                    }
                }
            }
            FileType::Idml => {
                let mut package = IdmlPackage::extract(&template_doc, self.config.output_dir(), self.keep_temp_files())?
                    .with_resolver(self.resolver.clone());
                let report = self.walk(&mut package, &merged(language_dict, &mapping_dict), direction)?;
                if report.fragments_failed > 0 {
                    warn!("{} story fragments could not be parsed and were left unchanged", report.fragments_failed);
                }
                package.save(&output_file)?;
                output_file
            }
        };

        info!("New file saved: {}", written.display());
        Ok(written)
    }

    /// Language and mapping dictionaries for one pair; empty ones abort the pair
    fn build_dictionaries(
        &self,
        language_data: &LanguageData,
        mapping_data: &LanguageData,
        direction: Direction,
    ) -> Result<(ReplacementDictionary, ReplacementDictionary)> {
        let builder = DictionaryBuilder::new(direction);
        let mut language_dict = builder.build(language_data);
        if direction.is_making_template() {
            language_dict = language_dict.without_short_keys(self.config.matching.min_template_key_length);
        }
        let mapping_dict = builder.build(mapping_data);

        if language_dict.is_empty() {
            return Err(ConvertError::Configuration("Language dictionary is empty".to_string()).into());
        }
        if mapping_dict.is_empty() {
            return Err(ConvertError::Configuration("Mapping dictionary is empty".to_string()).into());
        }
        debug!(
            "Dictionary sizes: language = {}, mappings = {}",
            language_dict.len(),
            mapping_dict.len()
        );
        Ok((language_dict, mapping_dict))
    }

    fn walk(
        &self,
        document: &mut dyn DocumentWalker,
        dictionary: &ReplacementDictionary,
        direction: Direction,
    ) -> Result<WalkReport> {
        let candidates = dictionary.candidates(direction);
        Ok(document.walk(&candidates, direction)?)
    }

    /// Input document for a pair: the command line file, or the default
    /// template (translating) or original (making a template)
    pub fn template_document(&self, file_type: FileType, direction: Direction) -> Result<PathBuf> {
        let source_ext = file_type.source_extension();
        let candidate = match &self.options.input_file {
            Some(input) if !input.is_empty() => FileManager::resolve_input_file(&self.config.base_path, input),
            _ => {
                let stem = if direction.is_making_template() {
                    &self.config.original_filename
                } else {
                    &self.config.template_filename
                };
                Some(self.config.base_path.join(format!("{}.{}", stem, source_ext)))
            }
        };

        match candidate.filter(|path| FileManager::file_exists(path)) {
            Some(path) => {
                let path = FileManager::check_fix_file_extension(path, source_ext);
                debug!("Returning template_doc = {:?}", path);
                Ok(path)
            }
            None => Err(ConvertError::Configuration(format!(
                "Source file not found: {}. Please ensure file exists and try again.",
                self.options.input_file.as_deref().unwrap_or("default template")
            ))
            .into()),
        }
    }

    /// Output path for a pair with meta placeholders filled in
    pub fn output_file(&self, file_type: FileType, meta: &Meta, direction: Direction) -> PathBuf {
        let making_template = direction.is_making_template();
        let path = match &self.options.output_file {
            Some(output) if !output.is_empty() => {
                let output = Path::new(output);
                if output.is_absolute() {
                    output.to_path_buf()
                } else {
                    self.config.base_path.join(output)
                }
            }
            _ => self.config.base_path.join(format!(
                "{}{}.{}",
                self.config.output_filename,
                if making_template { "_template" } else { "" },
                file_type.extension()
            )),
        };
        debug!("Output_filename before fix extension = {:?}", path);
        let path = FileManager::check_fix_file_extension(path, file_type.extension());
        let path = FileManager::apply_meta_placeholders(path, meta, making_template);
        debug!("Output_filename = {:?}", path);
        path
    }
}

/// Language dictionary with the mapping dictionary merged in
fn merged(mut language_dict: ReplacementDictionary, mapping_dict: &ReplacementDictionary) -> ReplacementDictionary {
    language_dict.merge(mapping_dict);
    language_dict
}
