/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::path::PathBuf;
use cornucopia_convert::app_config::{Config, FileType, LogLevel, MatchConfig};
use log::LevelFilter;

/// Test that the default configuration is valid
#[test]
fn test_default_config_shouldBeValid() -> Result<()> {
    let config = Config::default();
    config.validate()?;
    assert_eq!(config.languages, vec!["en", "es", "fr", "pt-br"]);
    assert_eq!(config.matching, MatchConfig::default());
    assert_eq!(config.log_level, LogLevel::Info);
    Ok(())
}

/// Test that a partial JSON file falls back to defaults for missing fields
#[test]
fn test_config_fromPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "base_path": "/cards",
        "languages": ["en", "nl"],
        "matching": { "rewrap_column": 20 },
        "pdf": { "converter_command": "soffice", "converter_args": ["--headless"] }
    }"#;
    let config: Config = serde_json::from_str(json)?;
    config.validate()?;

    assert_eq!(config.base_path, PathBuf::from("/cards"));
    assert_eq!(config.source_path(), PathBuf::from("/cards/source"));
    assert_eq!(config.output_dir(), PathBuf::from("/cards/output"));
    assert_eq!(config.matching.rewrap_column, 20);
    assert_eq!(config.matching.long_value_length, 60);
    assert_eq!(config.pdf.converter_args, vec!["--headless"]);
    assert!(!config.keep_temp_files);
    Ok(())
}

/// Test that invalid languages are rejected
#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let config = Config {
        languages: vec!["en".to_string(), "xx-yyyy".to_string()],
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        languages: Vec::new(),
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

/// Test that inconsistent thresholds are rejected
#[test]
fn test_validate_withRewrapLongerThanLongValue_shouldFail() {
    let mut config = Config::default();
    config.matching.rewrap_min_length = 80;
    assert!(config.validate().is_err());
}

/// Test file type parsing and extensions
#[test]
fn test_file_type_parse_shouldAcceptExtensions() -> Result<()> {
    assert_eq!(".docx".parse::<FileType>()?, FileType::Docx);
    assert_eq!("IDML".parse::<FileType>()?, FileType::Idml);
    assert!("txt".parse::<FileType>().is_err());
    assert_eq!(FileType::Pdf.source_extension(), "docx");
    assert_eq!(FileType::from_path(std::path::Path::new("out/cards.pdf")), Some(FileType::Pdf));
    assert_eq!(FileType::Idml.to_string(), "idml");
    Ok(())
}

/// Test log level conversion
#[test]
fn test_log_level_shouldMapToFilter() {
    assert_eq!(LogLevel::Debug.to_level_filter(), LevelFilter::Debug);
    assert_eq!(LogLevel::Error.to_level_filter(), LevelFilter::Error);
}
