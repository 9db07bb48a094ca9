use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Language;

/// A localized text value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Text {
    pub fn new(value: impl Into<String>, language: Option<Language>) -> Self {
        Self {
            value: value.into(),
            language,
        }
    }

    /// Text without a language tag.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(value, None)
    }

    pub fn de(value: impl Into<String>) -> Self {
        Self::new(value, Some(Language::German))
    }

    pub fn en(value: impl Into<String>) -> Self {
        Self::new(value, Some(Language::English))
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A hyperlink with optional title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Link {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            language: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
