use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::error::*;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Cpp,
    C,
    TypeScript,
    Go,
    Rust,
    CSharp,
}

impl Language {
    /// Language id on Judge0 CE.
    pub const fn judge_id(&self) -> u32 {
        use Language::*;
        match self {
            JavaScript => 63,
            Python => 71,
            Java => 62,
            Cpp => 54,
            C => 50,
            TypeScript => 74,
            Go => 60,
            Rust => 73,
            CSharp => 51,
        }
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

static DEFAULT_TABLE: Lazy<BTreeMap<String, u32>> = Lazy::new(|| {
    Language::iter()
        .map(|lang| (lang.name().to_owned(), lang.judge_id()))
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    pub id: u32,
}

/// Name to judge-id mapping used to validate every execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    ids: BTreeMap<String, u32>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            ids: DEFAULT_TABLE.clone(),
        }
    }
}

impl LanguageTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        Self {
            ids: entries
                .into_iter()
                .map(|(name, id)| (Self::normalize(name.as_ref()), id))
                .collect(),
        }
    }

    /// Default table plus `extra` entries; an extra entry replaces a default one of the same name.
    pub fn with_overrides(extra: &BTreeMap<String, u32>) -> Self {
        let mut table = Self::default();
        for (name, &id) in extra {
            table.ids.insert(Self::normalize(name), id);
        }
        table
    }

    fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn supported_languages(&self) -> Vec<LanguageEntry> {
        self.ids
            .iter()
            .map(|(name, &id)| LanguageEntry {
                name: name.clone(),
                id,
            })
            .collect()
    }

    pub fn language_id(&self, name: &str) -> Option<u32> {
        self.ids.get(&Self::normalize(name)).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<u32> {
        self.language_id(name)
            .ok_or_else(|| Error::UnsupportedLanguage(name.to_owned()))
    }

    pub fn is_supported_id(&self, id: u32) -> bool {
        self.ids.values().any(|&x| x == id)
    }

    pub fn ensure_supported_id(&self, id: u32) -> Result<()> {
        if self.is_supported_id(id) {
            Ok(())
        } else {
            Err(Error::UnsupportedLanguageId(id))
        }
    }
}

impl From<BTreeMap<String, u32>> for LanguageTable {
    fn from(ids: BTreeMap<String, u32>) -> Self {
        Self::new(ids)
    }
}
