use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the language tags used by the card files
///
/// Tags are an ISO 639-1 (2-letter) or ISO 639-3 (3-letter) code, optionally
/// followed by a region: `en`, `fr`, `pt-br`. File names sometimes spell the
/// separator as an underscore (`pt_br`).
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-3 (3-letter) code
    Part3,
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-3 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 && Language::from_639_1(&normalized_code).is_some() {
        return Ok(LanguageCodeType::Part1);
    }
    if normalized_code.len() == 3 && Language::from_639_3(&normalized_code).is_some() {
        return Ok(LanguageCodeType::Part3);
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Lowercase a tag and use `-` between language and region
pub fn normalize_language_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace('_', "-")
}

/// Split a tag into its language code and optional region
pub fn split_language_tag(tag: &str) -> (String, Option<String>) {
    let normalized = normalize_language_tag(tag);
    match normalized.split_once('-') {
        Some((code, region)) => (code.to_string(), Some(region.to_string())),
        None => (normalized, None),
    }
}

/// Validate a language tag such as `en` or `pt-br`
pub fn validate_language_tag(tag: &str) -> Result<()> {
    let (code, region) = split_language_tag(tag);
    validate_language_code(&code).map_err(|_| anyhow!("Invalid language tag: {}", tag))?;

    if let Some(region) = region {
        let is_alpha_region = region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic());
        let is_numeric_region = region.len() == 3 && region.chars().all(|c| c.is_ascii_digit());
        if !is_alpha_region && !is_numeric_region {
            return Err(anyhow!("Invalid region in language tag: {}", tag));
        }
    }
    Ok(())
}

/// Check if two language tags name the same language and region
pub fn language_tags_match(tag1: &str, tag2: &str) -> bool {
    normalize_language_tag(tag1) == normalize_language_tag(tag2)
}

/// Get the English language name for a tag, with the region in brackets
pub fn get_language_name(tag: &str) -> Result<String> {
    let (code, region) = split_language_tag(tag);
    let lang = match validate_language_code(&code)? {
        LanguageCodeType::Part1 => Language::from_639_1(&code),
        LanguageCodeType::Part3 => Language::from_639_3(&code),
    }
    .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(match region {
        Some(region) => format!("{} ({})", lang.to_name(), region.to_uppercase()),
        None => lang.to_name().to_string(),
    })
}
