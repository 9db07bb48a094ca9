//! Controlled vocabularies used by extracted entities.
//!
//! Vocabulary values are carried as [`Concept`]s, opaque `scheme/concept`
//! strings such as `theme/public-health`. Mapping files set them as plain
//! strings, so unknown concepts pass through untouched; the well-known
//! schemes below only exist to give call sites readable names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Language tag of a localized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "de")]
    German,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::German => "de",
            Language::English => "en",
        }
    }
}

impl FromStr for Language {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" | "deu" | "german" => Ok(Language::German),
            "en" | "eng" | "english" => Ok(Language::English),
            _ => Err(ModelError::UnknownLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value from a controlled vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Concept(String);

impl Concept {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidConcept(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The vocabulary part before the first `/`, if any.
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once('/').map(|(scheme, _)| scheme)
    }

    /// The concept name after the scheme.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Concept {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Concept::new(s)
    }
}

/// Vocabulary schemes known to the transformers.
pub mod scheme {
    pub const ACCESS_RESTRICTION: &str = "access-restriction";
    pub const ACTIVITY_TYPE: &str = "activity-type";
    pub const DATA_TYPE: &str = "data-type";
    pub const LANGUAGE: &str = "language";
    pub const RESOURCE_TYPE_GENERAL: &str = "resource-type-general";
    pub const TECHNICAL_ACCESSIBILITY: &str = "technical-accessibility";
    pub const THEME: &str = "theme";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_parts() {
        let concept = Concept::new(" theme/infectious-diseases ").unwrap();
        assert_eq!(concept.as_str(), "theme/infectious-diseases");
        assert_eq!(concept.scheme(), Some(scheme::THEME));
        assert_eq!(concept.name(), "infectious-diseases");

        let bare = Concept::new("open").unwrap();
        assert_eq!(bare.scheme(), None);
        assert_eq!(bare.name(), "open");
    }

    #[test]
    fn concept_rejects_blank_and_spaces() {
        assert!(Concept::new("  ").is_err());
        assert!(Concept::new("theme/public health").is_err());
    }

    #[test]
    fn language_parsing() {
        assert_eq!("DE".parse::<Language>().unwrap(), Language::German);
        assert_eq!("english".parse::<Language>().unwrap(), Language::English);
        assert!("fr".parse::<Language>().is_err());
    }
}
