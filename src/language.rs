//! Consultation languages
//!
//! The language doubles as the session key: the start-consultation endpoint is
//! addressed by language name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Language the consultation is held in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Slovak,
    English,
    German,
    Spanish,
}

impl Language {
    /// Name as understood by the chat service
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Slovak => "Slovak",
            Language::English => "English",
            Language::German => "German",
            Language::Spanish => "Spanish",
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Language::Slovak,
            Language::English,
            Language::German,
            Language::Spanish,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language '{0}' (expected one of Slovak, English, German, Spanish)")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::all()
            .iter()
            .copied()
            .find(|language| language.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLanguageError(s.to_string()))
    }
}
