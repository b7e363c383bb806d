/*!
 * Tests for loading language and mapping files
 */

use anyhow::Result;
use std::path::PathBuf;
use cornucopia_convert::file_utils::FileManager;
use cornucopia_convert::language_data::{FieldValue, LanguageData, SectionKind, SuitTag, load_language_data, load_mapping_data};
use cornucopia_convert::substitution::{Direction, DictionaryBuilder};
use crate::common;

/// Test that the language file is picked by its meta language
#[test]
fn test_load_language_data_withSeveralFiles_shouldPickByMeta() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = vec![
        common::create_test_file(temp_dir.path(), "en.yaml", common::ENGLISH_YAML)?,
        common::create_test_file(temp_dir.path(), "es.yaml", common::SPANISH_YAML)?,
        common::create_test_file(temp_dir.path(), "mappings.yaml", common::MAPPINGS_YAML)?,
    ];

    let spanish = load_language_data(&files, "es")?;
    assert_eq!(spanish.meta.as_ref().map(|m| m.language.as_str()), Some("ES"));

    let template = load_language_data(&files, "template")?;
    assert_eq!(template.meta.as_ref().map(|m| m.language.as_str()), Some("EN"));

    assert!(load_language_data(&files, "fr").is_err());
    Ok(())
}

/// Test that the mapping file is found by its component
#[test]
fn test_load_mapping_data_shouldUseExplicitSuitIds() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = vec![
        common::create_test_file(temp_dir.path(), "en.yaml", common::ENGLISH_YAML)?,
        common::create_test_file(temp_dir.path(), "mappings.yaml", common::MAPPINGS_YAML)?,
    ];

    let mappings = load_mapping_data(&files)?;
    assert!(mappings.is_mappings());
    let suits = mappings.section(SectionKind::Suits).expect("suits");
    assert_eq!(suits.groups[1].tag, SuitTag::AT);
    assert_eq!(suits.groups[1].name, None);
    Ok(())
}

/// Test that a broken file is skipped and the rest are still searched
#[test]
fn test_load_language_data_withBrokenFile_shouldSkipIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = vec![
        common::create_test_file(temp_dir.path(), "broken.yaml", "suits: [unclosed")?,
        common::create_test_file(temp_dir.path(), "en.yaml", common::ENGLISH_YAML)?,
    ];
    assert!(load_language_data(&files, "en").is_ok());
    assert!(load_mapping_data(&files).is_err());
    Ok(())
}

/// Test that more groups than suit tags is rejected
#[test]
fn test_from_yaml_str_withTooManyGroups_shouldFail() {
    let groups: String = (0..8).map(|i| format!("  - name: suit {}\n    cards: []\n", i)).collect();
    let yaml = format!("suits:\n{}", groups);
    assert!(LanguageData::from_yaml_str(&yaml).is_err());
}

const UNQUOTED_NUMBERS_YAML: &str = r#"
meta:
  edition: webapp
  component: mappings
  language: ALL
  version: 1.20
suits:
  - id: VE
    cards:
      - value: 2
        owasp_asvs: [1.10, 5.1, 007]
        capec: 0100
"#;

/// Test that unquoted numbers are read exactly as written
#[test]
fn test_from_yaml_str_withUnquotedNumbers_shouldKeepSourceText() -> Result<()> {
    let data = LanguageData::from_yaml_str(UNQUOTED_NUMBERS_YAML)?;
    let meta = data.meta.as_ref().expect("meta");
    assert_eq!(meta.version, "1.20");

    let entry = &data.section(SectionKind::Suits).expect("suits").groups[0].entries[0];
    assert_eq!(entry.id(), "2");
    assert_eq!(
        entry.field("owasp_asvs"),
        Some(&FieldValue::List(vec!["1.10".to_string(), "5.1".to_string(), "007".to_string()]))
    );
    assert_eq!(entry.field("capec"), Some(&FieldValue::Scalar("0100".to_string())));

    let dict = DictionaryBuilder::new(Direction::Translating).build(&data);
    assert_eq!(dict.get("${VE_VE2_owasp_asvs}"), Some("1.10, 5.1, 007"));

    let output = FileManager::apply_meta_placeholders("output/cards_edition_ver.docx", meta, false);
    assert_eq!(output, PathBuf::from("output/cards_webapp_1.20.docx"));
    Ok(())
}
