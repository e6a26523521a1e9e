//! Translation lookup.
//!
//! Strings live in a table shaped `section -> language -> nested keys`,
//! compiled into the binary from `translations.toml`. A key path such as
//! `askCard.title` is resolved segment by segment against the requested
//! language; on any miss the same path is retried against English, and if
//! that misses too the key path itself comes back so the gap is visible on
//! screen.

pub mod catalog;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

pub use catalog::{DEFAULT_LANGUAGE, LANGUAGES, Language, find_language};

const BUILTIN_TABLE: &str = include_str!("translations.toml");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("failed to parse translation table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("translation table has no '{0}' section")]
    MissingSection(Section),
    #[error("section '{0}' has no English entry")]
    MissingEnglish(Section),
    #[error("'{section}.{language}.{key}' has no English counterpart")]
    NotInEnglish {
        section: Section,
        language: String,
        key: String,
    },
    #[error("unknown translation section '{0}' (expected home, ask or detect)")]
    UnknownSection(String),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Top-level grouping of strings, one per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Home,
    Ask,
    Detect,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Home, Section::Ask, Section::Detect];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Ask => "ask",
            Self::Detect => "detect",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TranslationError::UnknownSection(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Node tree
// ---------------------------------------------------------------------------

/// One value in the nested string table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(String),
    List(Vec<String>),
    Section(BTreeMap<String, Node>),
}

impl Node {
    fn child(&self, segment: &str) -> Option<&Node> {
        match self {
            Self::Section(children) => children.get(segment),
            _ => None,
        }
    }

    /// Walk to the parent of the last segment, then read a string from it.
    /// List items are addressed with a decimal segment (`howTo.instructions.0`).
    fn lookup(&self, segments: &[&str]) -> Option<&str> {
        let (last, parents) = segments.split_last()?;
        let parent = parents.iter().try_fold(self, |node, seg| node.child(seg))?;
        match parent {
            Self::Section(children) => match children.get(*last)? {
                Self::Leaf(text) => Some(text.as_str()),
                _ => None,
            },
            Self::List(items) => last
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .map(String::as_str),
            Self::Leaf(_) => None,
        }
    }

    fn lookup_list(&self, segments: &[&str]) -> Option<&[String]> {
        match segments.iter().try_fold(self, |node, seg| node.child(seg))? {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Collect every addressable key path below this node.
    fn key_paths(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            Self::Section(children) => {
                for (name, child) in children {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    child.key_paths(&path, out);
                }
            }
            Self::Leaf(_) | Self::List(_) => out.push(prefix.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Read-only string table: `section -> language key -> node`.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    sections: BTreeMap<Section, BTreeMap<String, Node>>,
}

impl TranslationTable {
    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, TranslationError> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    /// Parse and validate a table.
    ///
    /// Every section must exist, must carry an `en` entry, and every key path
    /// under another language must also be present under `en`.
    pub fn from_toml_str(source: &str) -> Result<Self, TranslationError> {
        let raw: BTreeMap<String, BTreeMap<String, Node>> = toml::from_str(source)?;
        let sections = raw
            .into_iter()
            .map(|(name, languages)| Ok((name.parse::<Section>()?, languages)))
            .collect::<Result<BTreeMap<_, _>, TranslationError>>()?;
        let table = Self { sections };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), TranslationError> {
        for section in Section::ALL {
            let languages = self
                .sections
                .get(&section)
                .ok_or(TranslationError::MissingSection(section))?;
            let english = languages
                .get(DEFAULT_LANGUAGE)
                .ok_or(TranslationError::MissingEnglish(section))?;

            for (language, root) in languages {
                if language == DEFAULT_LANGUAGE {
                    continue;
                }
                let mut paths = Vec::new();
                root.key_paths("", &mut paths);
                for key in paths {
                    let segments: Vec<&str> = key.split('.').collect();
                    let present = english.lookup(&segments).is_some()
                        || english.lookup_list(&segments).is_some();
                    if !present {
                        return Err(TranslationError::NotInEnglish {
                            section,
                            language: language.clone(),
                            key,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn root(&self, section: Section, language: &str) -> Option<&Node> {
        self.sections.get(&section)?.get(language)
    }

    /// Resolve `key_path` for `language`, falling back to English, then to
    /// the key path itself. Never fails.
    pub fn resolve(&self, key_path: &str, section: Section, language: &str) -> String {
        if key_path.is_empty() {
            return String::new();
        }
        let segments: Vec<&str> = key_path.split('.').collect();

        self.root(section, language)
            .and_then(|root| root.lookup(&segments))
            .or_else(|| {
                self.root(section, DEFAULT_LANGUAGE)
                    .and_then(|root| root.lookup(&segments))
            })
            .unwrap_or(key_path)
            .to_string()
    }

    /// Resolve a list-valued entry with the same fallback. A miss in both
    /// languages yields an empty list.
    pub fn resolve_list(&self, key_path: &str, section: Section, language: &str) -> Vec<String> {
        if key_path.is_empty() {
            return Vec::new();
        }
        let segments: Vec<&str> = key_path.split('.').collect();

        self.root(section, language)
            .and_then(|root| root.lookup_list(&segments))
            .or_else(|| {
                self.root(section, DEFAULT_LANGUAGE)
                    .and_then(|root| root.lookup_list(&segments))
            })
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// Share of English key paths in `section` that `language` translates
    /// itself, as `(translated, total)`.
    pub fn coverage(&self, section: Section, language: &str) -> (usize, usize) {
        let mut english_paths = Vec::new();
        if let Some(root) = self.root(section, DEFAULT_LANGUAGE) {
            root.key_paths("", &mut english_paths);
        }
        let total = english_paths.len();

        let Some(root) = self.root(section, language) else {
            return (0, total);
        };
        let mut own_paths = Vec::new();
        root.key_paths("", &mut own_paths);
        let translated = own_paths
            .iter()
            .filter(|path| english_paths.contains(path))
            .count();

        (translated, total)
    }
}

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// A table bound to one language, for `t(key, section)` call sites.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    table: &'a TranslationTable,
    language: &'a str,
}

impl<'a> Translator<'a> {
    pub fn new(table: &'a TranslationTable, language: &'a str) -> Self {
        Self { table, language }
    }

    pub fn language(&self) -> &str {
        self.language
    }

    pub fn t(&self, key_path: &str, section: Section) -> String {
        self.table.resolve(key_path, section, self.language)
    }

    pub fn t_list(&self, key_path: &str, section: Section) -> Vec<String> {
        self.table.resolve_list(key_path, section, self.language)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
