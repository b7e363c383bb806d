use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, error, info};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_yaml::Value;

use crate::errors::{ConvertError, ConvertResult};
use crate::language_utils::{language_tags_match, normalize_language_tag};

// @module: Structured language data (suits, cards, paragraphs, sentences)

/// Name of the field that identifies an entry inside its group
pub const ID_FIELD: &str = "value";

/// Component name carried by the shared mapping table
pub const MAPPINGS_COMPONENT: &str = "mappings";

/// Closed vocabulary of group tags used in the templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuitTag {
    /// Data validation & encoding
    VE,
    /// Authentication
    AT,
    /// Session management
    SM,
    /// Authorization
    AZ,
    /// Cryptography
    CR,
    /// Cornucopia
    CO,
    /// Wild cards (jokers)
    WC,
    /// Paragraph group shared by the whole deck
    Common,
}

impl SuitTag {
    /// Suit tags in deck order
    pub const SUITS: [SuitTag; 7] = [
        SuitTag::VE,
        SuitTag::AT,
        SuitTag::SM,
        SuitTag::AZ,
        SuitTag::CR,
        SuitTag::CO,
        SuitTag::WC,
    ];

    /// Paragraph group tags
    pub const PARAGRAPHS: [SuitTag; 1] = [SuitTag::Common];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VE => "VE",
            Self::AT => "AT",
            Self::SM => "SM",
            Self::AZ => "AZ",
            Self::CR => "CR",
            Self::CO => "CO",
            Self::WC => "WC",
            Self::Common => "Common",
        }
    }

    /// Whether this is the wild card suit holding the jokers
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::WC)
    }
}

impl fmt::Display for SuitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuitTag {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "VE" => Ok(Self::VE),
            "AT" => Ok(Self::AT),
            "SM" => Ok(Self::SM),
            "AZ" => Ok(Self::AZ),
            "CR" => Ok(Self::CR),
            "CO" => Ok(Self::CO),
            "WC" => Ok(Self::WC),
            "Common" => Ok(Self::Common),
            other => Err(ConvertError::Configuration(format!(
                "Unknown suit tag: {}",
                other
            ))),
        }
    }
}

/// Kind of a top-level collection in a language file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `suits`, each holding `cards`
    Suits,
    /// `paragraphs`, each holding `sentences`
    Paragraphs,
}

impl SectionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "suits" => Some(Self::Suits),
            "paragraphs" => Some(Self::Paragraphs),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Suits => "suits",
            Self::Paragraphs => "paragraphs",
        }
    }

    /// Group tags allowed in this section, in positional order
    pub fn vocabulary(&self) -> &'static [SuitTag] {
        match self {
            Self::Suits => &SuitTag::SUITS,
            Self::Paragraphs => &SuitTag::PARAGRAPHS,
        }
    }

    /// Name of the child collection inside each group
    pub fn child_key(&self) -> &'static str {
        match self {
            Self::Suits => "cards",
            Self::Paragraphs => "sentences",
        }
    }
}

/// Value of one entry field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

/// A card or a sentence: ordered field/value pairs
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    fields: Vec<(String, FieldValue)>,
}

impl Entry {
    /// Create an entry, checking that it carries an identifying field
    pub fn new(fields: Vec<(String, FieldValue)>) -> ConvertResult<Self> {
        let entry = Self { fields };
        match entry.field(ID_FIELD) {
            Some(FieldValue::Scalar(_)) => Ok(entry),
            Some(FieldValue::List(_)) => Err(ConvertError::Configuration(format!(
                "Entry field '{}' must be a scalar",
                ID_FIELD
            ))),
            None => Err(ConvertError::Configuration(format!(
                "Entry is missing its '{}' field",
                ID_FIELD
            ))),
        }
    }

    /// Identifier of the entry within its group
    pub fn id(&self) -> &str {
        match self.field(ID_FIELD) {
            Some(FieldValue::Scalar(id)) => id,
            _ => "",
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Every field except the identifying one, in file order
    pub fn translatable_fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .filter(|(key, _)| key != ID_FIELD)
            .map(|(key, value)| (key.as_str(), value))
    }
}

/// A suit or paragraph group
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub tag: SuitTag,
    /// Display name, e.g. the suit title printed on the cards
    pub name: Option<String>,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub groups: Vec<Group>,
}

/// The `meta` block of a language file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub edition: String,
    pub component: String,
    pub language: String,
    pub version: String,
}

impl Meta {
    pub fn is_mappings(&self) -> bool {
        self.component == MAPPINGS_COMPONENT
    }
}

/// Parsed content of one language file or of the mapping table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageData {
    /// File the data was read from, if any
    pub source: Option<PathBuf>,
    pub meta: Option<Meta>,
    pub sections: Vec<Section>,
}

impl LanguageData {
    /// Read and parse a YAML language file
    pub fn load<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut data = Self::from_yaml_str(&content)
            .map_err(|e| match e {
                ConvertError::Parse { message, .. } => ConvertError::parse(path, message),
                other => other,
            })?;
        data.source = Some(path.to_path_buf());
        Ok(data)
    }

    /// Parse language data from YAML text.
    ///
    /// Every scalar is kept as written in the file, so `1.10` stays `1.10`
    /// and `007` stays `007`.
    pub fn from_yaml_str(content: &str) -> ConvertResult<Self> {
        let root = parse_literal(content)?;
        let root = root
            .as_map()
            .ok_or_else(|| ConvertError::parse("<yaml>", "top level is not a mapping"))?;

        let mut data = LanguageData::default();
        for (key, value) in root {
            if key == "meta" {
                data.meta = parse_meta(value);
                continue;
            }
            match SectionKind::from_name(key) {
                Some(kind) => data.sections.push(parse_section(kind, value)?),
                None => debug!("Skipping unknown section '{}'", key),
            }
        }
        Ok(data)
    }

    /// Whether the data carries a usable meta block and at least one section
    pub fn is_usable(&self) -> bool {
        self.meta.is_some() && !self.sections.is_empty()
    }

    pub fn is_mappings(&self) -> bool {
        self.meta.as_ref().is_some_and(Meta::is_mappings)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    fn describe(&self) -> String {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// Pick the language file for `language` among `yaml_files`.
///
/// The `template` language reads the English file.
pub fn load_language_data(yaml_files: &[PathBuf], language: &str) -> ConvertResult<LanguageData> {
    debug!("Looking for language data for language = {}", language);
    let wanted = if language.eq_ignore_ascii_case("template") {
        "en".to_string()
    } else {
        normalize_language_tag(language)
    };

    for data in parse_all(yaml_files) {
        let Some(meta) = &data.meta else {
            continue;
        };
        if meta.is_mappings() || !language_tags_match(&meta.language, &wanted) {
            debug!("Not the language file: {}", data.describe());
            continue;
        }
        debug!("Found source language file: {}", data.describe());
        if data.section(SectionKind::Suits).is_none() {
            return Err(ConvertError::Configuration(format!(
                "Language file {} has no suits",
                data.describe()
            )));
        }
        return Ok(data);
    }

    Err(ConvertError::Configuration(format!(
        "Could not get language data for '{}' from yaml files",
        language
    )))
}

/// Pick the shared mapping table among `yaml_files`
pub fn load_mapping_data(yaml_files: &[PathBuf]) -> ConvertResult<LanguageData> {
    parse_all(yaml_files)
        .find(|data| data.is_mappings())
        .inspect(|data| debug!("Found mappings file: {}", data.describe()))
        .ok_or_else(|| ConvertError::Configuration("Could not find the mappings file".to_string()))
}

fn parse_all(yaml_files: &[PathBuf]) -> impl Iterator<Item = LanguageData> + '_ {
    yaml_files
        .iter()
        .filter(|file| {
            file.extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .filter_map(|file| match LanguageData::load(file) {
            Ok(data) => Some(data),
            Err(e) => {
                info!("Error loading yaml file: {:?}. Error = {}", file, e);
                None
            }
        })
}

fn parse_meta(value: &LiteralNode) -> Option<Meta> {
    if value.as_map().is_none() {
        error!("The meta block is not a mapping");
        return None;
    }
    let get = |name: &str| value.get(name).and_then(LiteralNode::as_scalar).map(str::to_string);
    match (get("edition"), get("component"), get("language"), get("version")) {
        (Some(edition), Some(component), Some(language), Some(version)) => Some(Meta {
            edition,
            component,
            language,
            version,
        }),
        _ => {
            error!("Incomplete meta block: edition, component, language and version are required");
            None
        }
    }
}

fn parse_section(kind: SectionKind, value: &LiteralNode) -> ConvertResult<Section> {
    let items = value.as_list().ok_or_else(|| {
        ConvertError::Configuration(format!("Section '{}' is not a list", kind.name()))
    })?;
    if items.is_empty() {
        return Err(ConvertError::Configuration(format!(
            "Section '{}' is empty",
            kind.name()
        )));
    }

    let vocabulary = kind.vocabulary();
    let mut groups = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.as_map().is_none() {
            return Err(ConvertError::Configuration(format!(
                "Group {} in '{}' is not a mapping",
                index,
                kind.name()
            )));
        }

        let tag = match item.get("id").and_then(LiteralNode::as_scalar) {
            Some(id) => {
                let tag = SuitTag::from_str(id)?;
                if !vocabulary.contains(&tag) {
                    return Err(ConvertError::Configuration(format!(
                        "Suit tag {} is not allowed in '{}'",
                        tag,
                        kind.name()
                    )));
                }
                tag
            }
            None => *vocabulary.get(index).ok_or_else(|| {
                ConvertError::Configuration(format!(
                    "Section '{}' has more groups than known tags ({})",
                    kind.name(),
                    vocabulary.len()
                ))
            })?,
        };

        let entries = match item.get(kind.child_key()) {
            Some(LiteralNode::List(children)) => children
                .iter()
                .map(parse_entry)
                .collect::<ConvertResult<Vec<_>>>()?,
            Some(_) => {
                return Err(ConvertError::Configuration(format!(
                    "'{}' of group {} is not a list",
                    kind.child_key(),
                    tag
                )));
            }
            None => Vec::new(),
        };

        groups.push(Group {
            tag,
            name: item.get("name").and_then(LiteralNode::as_scalar).map(str::to_string),
            entries,
        });
    }

    Ok(Section { kind, groups })
}

fn parse_entry(value: &LiteralNode) -> ConvertResult<Entry> {
    let mapping = value
        .as_map()
        .ok_or_else(|| ConvertError::Configuration("Entry is not a mapping".to_string()))?;

    let mut fields = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let field = match value {
            LiteralNode::Scalar(text) => FieldValue::Scalar(text.clone()),
            LiteralNode::List(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| {
                        item.as_scalar().map(str::to_string).ok_or_else(|| {
                            ConvertError::Configuration(format!(
                                "List field '{}' holds a non-scalar item",
                                key
                            ))
                        })
                    })
                    .collect::<ConvertResult<Vec<_>>>()?,
            ),
            LiteralNode::Map(_) => {
                return Err(ConvertError::Configuration(format!(
                    "Field '{}' has an unsupported value",
                    key
                )));
            }
        };
        fields.push((key.clone(), field));
    }
    Entry::new(fields)
}

/// YAML node whose scalars are the text as written in the file
#[derive(Debug, Clone, PartialEq, Eq)]
enum LiteralNode {
    Scalar(String),
    List(Vec<LiteralNode>),
    Map(Vec<(String, LiteralNode)>),
}

impl LiteralNode {
    fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&[LiteralNode]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    fn as_map(&self) -> Option<&[(String, LiteralNode)]> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    fn get(&self, name: &str) -> Option<&LiteralNode> {
        self.as_map()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Read `content` twice: once as a `Value` to learn its shape, then again
/// asking for every scalar as a string, which hands back the source text
/// instead of a resolved number or bool.
fn parse_literal(content: &str) -> ConvertResult<LiteralNode> {
    let shape: Value = serde_yaml::from_str(content)
        .map_err(|e| ConvertError::parse("<yaml>", e.to_string()))?;
    LiteralSeed(&shape)
        .deserialize(serde_yaml::Deserializer::from_str(content))
        .map_err(|e| ConvertError::parse("<yaml>", e.to_string()))
}

struct LiteralSeed<'a>(&'a Value);

impl<'de> DeserializeSeed<'de> for LiteralSeed<'_> {
    type Value = LiteralNode;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<LiteralNode, D::Error> {
        match self.0 {
            Value::Sequence(_) => deserializer.deserialize_seq(LiteralVisitor(self.0)),
            Value::Mapping(_) => deserializer.deserialize_map(LiteralVisitor(self.0)),
            Value::Tagged(tagged) => LiteralSeed(&tagged.value).deserialize(deserializer),
            _ => deserializer.deserialize_str(LiteralVisitor(self.0)),
        }
    }
}

struct LiteralVisitor<'a>(&'a Value);

impl<'de> Visitor<'de> for LiteralVisitor<'_> {
    type Value = LiteralNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML scalar, sequence or mapping")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LiteralNode, E> {
        Ok(LiteralNode::Scalar(v.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LiteralNode, A::Error> {
        let shapes = self.0.as_sequence().map(Vec::as_slice).unwrap_or_default();
        let mut items = Vec::with_capacity(shapes.len());
        for shape in shapes {
            match seq.next_element_seed(LiteralSeed(shape))? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(LiteralNode::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LiteralNode, A::Error> {
        // Mapping keeps insertion order, so shapes line up with the stream
        let shapes: Vec<&Value> = self.0.as_mapping().map(|m| m.values().collect()).unwrap_or_default();
        let mut fields = Vec::with_capacity(shapes.len());
        for shape in shapes {
            let Some(key) = map.next_key::<String>()? else {
                break;
            };
            fields.push((key, map.next_value_seed(LiteralSeed(shape))?));
        }
        Ok(LiteralNode::Map(fields))
    }
}
