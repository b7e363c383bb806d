use anyhow::{anyhow, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the converter configuration: where language files and
/// documents live, which languages a batch covers, the layout thresholds used
/// when matching text, and the external pdf converter.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root that relative paths are resolved against
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Folder (under the base path) searched recursively for language files
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Template document used when translating, without extension
    #[serde(default = "default_template_filename")]
    pub template_filename: String,

    /// Original English document used when making a template, without extension
    #[serde(default = "default_original_filename")]
    pub original_filename: String,

    /// Output file name pattern, without extension
    #[serde(default = "default_output_filename")]
    pub output_filename: String,

    /// Languages converted when `all` is requested
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Keep extracted archives and temporary documents after a run
    #[serde(default)]
    pub keep_temp_files: bool,

    /// Text matching thresholds
    #[serde(default)]
    pub matching: MatchConfig,

    /// External pdf converter
    #[serde(default)]
    pub pdf: PdfConfig,
}

/// Output document format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Docx,
    Pdf,
    Idml,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Docx, FileType::Pdf, FileType::Idml];

    // @returns: File extension without dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Idml => "idml",
        }
    }

    // @returns: Extension of the document this output is produced from
    pub fn source_extension(&self) -> &'static str {
        match self {
            Self::Docx | Self::Pdf => "docx",
            Self::Idml => "idml",
        }
    }

    /// Detect the format from a file name, if it has a known extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for FileType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "pdf" => Ok(Self::Pdf),
            "idml" => Ok(Self::Idml),
            _ => Err(anyhow!("Invalid file type: {}", s)),
        }
    }
}

/// Thresholds used by the match resolver and dictionary builder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchConfig {
    /// Prefix + value length above which `", "` is compacted to `","`
    #[serde(default = "default_long_value_length")]
    pub long_value_length: usize,

    /// Values at least this long are broken over two lines
    #[serde(default = "default_rewrap_min_length")]
    pub rewrap_min_length: usize,

    /// Column (counted from the start of the label) where the line break search starts
    #[serde(default = "default_rewrap_column")]
    pub rewrap_column: usize,

    /// Inserted between the label and the first line of a re-broken value
    #[serde(default = "default_rewrap_indent")]
    pub rewrap_indent: String,

    /// Shorter keys are dropped from the language dictionary when making a template
    #[serde(default = "default_min_template_key_length")]
    pub min_template_key_length: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            long_value_length: default_long_value_length(),
            rewrap_min_length: default_rewrap_min_length(),
            rewrap_column: default_rewrap_column(),
            rewrap_indent: default_rewrap_indent(),
            min_template_key_length: default_min_template_key_length(),
        }
    }
}

/// External converter used to turn a docx into a pdf
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PdfConfig {
    /// Program name or path
    #[serde(default = "default_converter_command")]
    pub converter_command: String,

    /// Extra arguments placed before the input and output paths
    #[serde(default)]
    pub converter_args: Vec<String>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            converter_command: default_converter_command(),
            converter_args: Vec::new(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("source")
}

fn default_template_filename() -> String {
    "resources/templates/owasp_cornucopia_edition_lang_ver_template".to_string()
}

fn default_original_filename() -> String {
    "resources/originals/owasp_cornucopia_en".to_string()
}

fn default_output_filename() -> String {
    "output/owasp_cornucopia_edition_component_lang_ver".to_string()
}

fn default_languages() -> Vec<String> {
    ["en", "es", "fr", "pt-br"].iter().map(|s| s.to_string()).collect()
}

fn default_long_value_length() -> usize {
    60
}

fn default_rewrap_min_length() -> usize {
    34
}

fn default_rewrap_column() -> usize {
    25
}

fn default_rewrap_indent() -> String {
    "    ".to_string()
}

fn default_min_template_key_length() -> usize {
    8
}

fn default_converter_command() -> String {
    "docx2pdf".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(anyhow!("At least one language must be configured"));
        }
        for language in &self.languages {
            crate::language_utils::validate_language_tag(language)?;
        }

        let matching = &self.matching;
        if matching.rewrap_min_length == 0 {
            return Err(anyhow!("matching.rewrap_min_length must be greater than zero"));
        }
        if matching.rewrap_min_length > matching.long_value_length {
            return Err(anyhow!(
                "matching.rewrap_min_length ({}) cannot exceed matching.long_value_length ({})",
                matching.rewrap_min_length,
                matching.long_value_length
            ));
        }

        if self.pdf.converter_command.trim().is_empty() {
            return Err(anyhow!("pdf.converter_command cannot be empty"));
        }

        Ok(())
    }

    /// Folder holding the language files
    pub fn source_path(&self) -> PathBuf {
        self.base_path.join(&self.source_dir)
    }

    /// Folder that receives output documents and temporary files
    pub fn output_dir(&self) -> PathBuf {
        let output = Path::new(&self.output_filename);
        match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.base_path.join(parent),
            _ => self.base_path.clone(),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            base_path: default_base_path(),
            source_dir: default_source_dir(),
            template_filename: default_template_filename(),
            original_filename: default_original_filename(),
            output_filename: default_output_filename(),
            languages: default_languages(),
            log_level: LogLevel::default(),
            keep_temp_files: false,
            matching: MatchConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}
