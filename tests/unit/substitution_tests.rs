/*!
 * Tests for replacement dictionaries and the match resolver
 */

use anyhow::Result;
use cornucopia_convert::app_config::MatchConfig;
use cornucopia_convert::language_data::LanguageData;
use cornucopia_convert::substitution::normalizer::{group_number_ranges, list_into_text};
use cornucopia_convert::substitution::{Direction, DictionaryBuilder, MatchResolver, ReplacementDictionary};
use crate::common;

fn dictionary(yaml: &str, direction: Direction) -> Result<ReplacementDictionary> {
    Ok(DictionaryBuilder::new(direction).build(&LanguageData::from_yaml_str(yaml)?))
}

/// Test that both directions agree on every tag
#[test]
fn test_build_bothDirections_shouldBeInverse() -> Result<()> {
    let template = dictionary(common::ENGLISH_YAML, Direction::MakingTemplate)?;
    let translation = dictionary(common::ENGLISH_YAML, Direction::Translating)?;
    assert_eq!(template.len(), translation.len());
    for (text, tag) in template.iter() {
        assert_eq!(translation.get(tag), Some(text));
    }
    Ok(())
}

/// Test that translating a mapping compresses numeric runs
#[test]
fn test_build_translatingMappings_shouldUseRanges() -> Result<()> {
    let dict = dictionary(common::MAPPINGS_YAML, Direction::Translating)?;
    assert_eq!(dict.get("${VE_VE2_owasp_scp}"), Some("69, 107-109"));
    assert_eq!(dict.get("${AT_AT2_owasp_scp}"), Some("28, 31"));
    assert_eq!(dict.get("${VE_suit}"), None);
    Ok(())
}

/// Test that the translated language dictionary fills a template text unit
#[test]
fn test_resolve_translating_shouldFillTagsAndCitations() -> Result<()> {
    let mut dict = dictionary(common::SPANISH_YAML, Direction::Translating)?;
    dict.merge(&dictionary(common::MAPPINGS_YAML, Direction::Translating)?);
    let candidates = dict.candidates(Direction::Translating);
    let resolver = MatchResolver::default();

    assert_eq!(
        resolver.resolve("${VE_suit}", &candidates, Direction::Translating).as_deref(),
        Some("Validación y codificación de datos")
    );
    assert_eq!(
        resolver
            .resolve("OWASP SCP\u{2028}${VE_VE2_owasp_scp}", &candidates, Direction::Translating)
            .as_deref(),
        Some("OWASP SCP\u{2028}69, 107-109")
    );
    assert_eq!(resolver.resolve("Plain text", &candidates, Direction::Translating), None);
    Ok(())
}

/// Test that the template dictionary turns citations back into tags
#[test]
fn test_resolve_makingTemplate_shouldTagCitations() -> Result<()> {
    let mut dict = dictionary(common::ENGLISH_YAML, Direction::MakingTemplate)?;
    dict.merge(&dictionary(common::MAPPINGS_YAML, Direction::MakingTemplate)?);
    let candidates = dict.candidates(Direction::MakingTemplate);
    let resolver = MatchResolver::default();

    assert_eq!(
        resolver
            .resolve("OWASP SCP\u{2028}69, 107-109", &candidates, Direction::MakingTemplate)
            .as_deref(),
        Some("OWASP SCP\u{2028}${VE_VE2_owasp_scp}")
    );
    assert_eq!(
        resolver
            .resolve("  spoofing the identity of a trusted user ", &candidates, Direction::MakingTemplate)
            .as_deref(),
        Some("${VE_VE3_desc}")
    );
    Ok(())
}

/// Test that long citations are broken over two lines
#[test]
fn test_resolve_withLongCitation_shouldRewrap() {
    let resolver = MatchResolver::new(MatchConfig::default());
    let candidates = [("${VE_VE2_capec}", "28, 31, 48, 57, 62, 88, 111, 119, 120")];
    let resolved = resolver
        .resolve("CAPEC\u{2028}${VE_VE2_capec}", &candidates, Direction::Translating)
        .expect("resolved");
    let lines: Vec<&str> = resolved.split('\u{2028}').collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("CAPEC    28, 31"));
    assert!(lines[1].ends_with("120"));
}

/// Test the list rendering used for mapping values
#[test]
fn test_list_into_text_shouldGroupConsecutiveNumbers() {
    let items: Vec<String> = ["1", "2", "3", "5", "7", "8"].iter().map(|s| s.to_string()).collect();
    assert_eq!(group_number_ranges(&items), vec!["1-3", "5", "7-8"]);
    assert_eq!(list_into_text(&items, true), "1-3, 5, 7-8");
    assert_eq!(list_into_text(&items, false), "1, 2, 3, 5, 7, 8");
    assert_eq!(list_into_text(&[], true), " - ");
}
