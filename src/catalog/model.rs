use serde::Deserialize;

use crate::error::Result;

/// Catalog language. `Unset` is the "choose a language" entry of the selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    #[serde(alias = "", alias = "none")]
    Unset,
    #[default]
    #[serde(alias = "english")]
    En,
    #[serde(alias = "hindi")]
    Hi,
}

impl Language {
    /// Selector order, as shown in the language bar.
    pub const ALL: [Language; 3] = [Language::Unset, Language::En, Language::Hi];

    /// Value sent in the `language` query parameter.
    pub fn code(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::En => "en",
            Self::Hi => "hi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unset => "Select Language",
            Self::En => "English",
            Self::Hi => "Hindi",
        }
    }

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|&l| l == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let pos = Self::ALL.iter().position(|&l| l == self).unwrap_or(0);
        Self::ALL[(pos + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A chant as served by `GET /music`. The name doubles as its identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Track {
    pub fn same_identity(&self, other: &Track) -> bool {
        self.name == other.name
    }
}

/// The currently displayed chant list and the language it was fetched for.
#[derive(Debug, Default)]
pub struct Catalog {
    language: Language,
    tracks: Vec<Track>,
    /// Language of the most recent request still awaiting a response.
    pending: Option<Language>,
}

impl Catalog {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            tracks: Vec::new(),
            pending: None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Language last asked for: the pending one, else the displayed one.
    pub fn requested(&self) -> Language {
        self.pending.unwrap_or(self.language)
    }

    /// Mark a fetch for `language` as outstanding. The displayed language
    /// only changes once that fetch succeeds.
    pub fn request(&mut self, language: Language) {
        self.pending = Some(language);
    }

    /// Apply a fetch result. Responses for a language that is no longer
    /// requested are dropped; a failure keeps the previous list and language
    /// and is handed back so the caller can alert.
    ///
    /// Returns `Ok(true)` when the list was replaced.
    pub fn apply(&mut self, language: Language, result: Result<Vec<Track>>) -> Result<bool> {
        if self.pending != Some(language) {
            return Ok(false);
        }
        self.pending = None;
        self.tracks = result?;
        self.language = language;
        Ok(true)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.name == name)
    }
}
