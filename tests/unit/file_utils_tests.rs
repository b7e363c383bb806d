/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use cornucopia_convert::file_utils::FileManager;
use cornucopia_convert::language_data::Meta;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test that dir_exists returns false for non-existent directories
#[test]
fn test_dir_exists_withNonExistentDir_shouldReturnFalse() {
    assert!(!FileManager::dir_exists("./non_existent_directory_12345"));
    assert!(FileManager::dir_exists("."));
}

/// Test that find_files walks subdirectories and sorts the result
#[test]
fn test_find_files_withNestedFiles_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b/webapp-cards-es.yaml", "x")?;
    common::create_test_file(temp_dir.path(), "a/webapp-cards-en.YAML", "x")?;
    common::create_test_file(temp_dir.path(), "a/readme.md", "x")?;

    let found = FileManager::find_files(temp_dir.path(), ".yaml")?;
    assert_eq!(found.len(), 2);
    assert!(found[0].ends_with("a/webapp-cards-en.YAML"));
    assert!(found[1].ends_with("b/webapp-cards-es.yaml"));
    Ok(())
}

/// Test the output naming rules used by the pipeline
#[test]
fn test_output_name_withPlaceholdersAndVersion_shouldProduceFinalName() {
    let meta = Meta {
        edition: "mobileapp".to_string(),
        component: "cards".to_string(),
        language: "PT-BR".to_string(),
        version: "1.1".to_string(),
    };
    let path = FileManager::check_fix_file_extension("output/cornucopia_edition_component_lang_ver", "idml");
    assert_eq!(path, PathBuf::from("output/cornucopia_edition_component_lang_ver.idml"));

    let path = FileManager::apply_meta_placeholders(path, &meta, false);
    assert_eq!(path, PathBuf::from("output/cornucopia_mobileapp_cards_pt-br_1.1.idml"));
}

/// Test that ensure_dir creates nested folders
#[test]
fn test_ensure_dir_withMissingParents_shouldCreateAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("output/cards/1.22");
    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

/// Test that archives keep their entries through extract and zip
#[test]
fn test_extract_archive_withPackage_shouldWriteAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let archive = temp_dir.path().join("cards.idml");
    fs::write(&archive, common::idml_bytes(&["Spoofing"])?)?;

    let target = temp_dir.path().join("extracted");
    let count = FileManager::extract_archive(&archive, &target)?;
    assert_eq!(count, 3);
    assert!(target.join("Stories/Story_u1.xml").exists());

    let rezipped = temp_dir.path().join("again.idml");
    FileManager::zip_dir(&target, &rezipped)?;
    let story = common::read_zip_entry(&rezipped, "Stories/Story_u1.xml")?;
    assert!(story.contains("<Content>Spoofing</Content>"));
    Ok(())
}

/// Test that a missing archive is reported as an error
#[test]
fn test_extract_archive_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::extract_archive(temp_dir.path().join("missing.idml"), temp_dir.path());
    assert!(result.is_err());
    Ok(())
}
