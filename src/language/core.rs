use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::fmt;
use std::sync::OnceLock;

static LANG_DIR: Dir = include_dir!("src/lang");

const BUILTIN_FILE: &str = "hiragana.json";

static BUILTIN: OnceLock<Result<Catalog, CatalogError>> = OnceLock::new();

/// One practice word: its romanized reading and the hiragana to tap.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    #[serde(rename = "romaji")]
    pub romanized: String,
    #[serde(rename = "hiragana")]
    pub script: String,
}

impl WordEntry {
    pub fn new(romanized: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            romanized: romanized.into(),
            script: script.into(),
        }
    }

    /// Number of glyphs a user has to tap to spell this word.
    pub fn glyph_count(&self) -> usize {
        self.script.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    MissingFile(String),
    Parse(String),
    EmptyField { index: usize },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::MissingFile(name) => write!(f, "word file not found: {name}"),
            CatalogError::Parse(msg) => write!(f, "unable to deserialize word json: {msg}"),
            CatalogError::EmptyField { index } => {
                write!(f, "word entry {index} has an empty romaji or hiragana field")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// The fixed, read-only set of words available for practice.
#[derive(Deserialize, Clone, Debug)]
pub struct Catalog {
    pub name: String,
    pub words: Vec<WordEntry>,
}

impl Catalog {
    /// The catalog compiled into the binary, parsed once on first use.
    pub fn builtin() -> Result<&'static Catalog, CatalogError> {
        BUILTIN
            .get_or_init(|| read_catalog_from_file(BUILTIN_FILE))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_entries(name: impl Into<String>, words: Vec<WordEntry>) -> Result<Self, CatalogError> {
        let catalog = Self {
            name: name.into(),
            words,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        match self
            .words
            .iter()
            .position(|w| w.romanized.is_empty() || w.script.is_empty())
        {
            Some(index) => Err(CatalogError::EmptyField { index }),
            None => Ok(()),
        }
    }
}

fn read_catalog_from_file(file_name: &str) -> Result<Catalog, CatalogError> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| CatalogError::MissingFile(file_name.to_string()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| CatalogError::Parse(format!("{file_name} is not valid utf-8")))?;

    Catalog::from_json(file_as_str)
}
