//! Raw source records.
//!
//! One type per upstream record shape, deserialized from already-parsed
//! structured data. Records are immutable once read; each exposes the
//! natural key its transformer derives identities from.

use std::borrow::Cow;

use chrono::NaiveDate;
use harvest_core::FilterableRecord;
use harvest_model::Temporal;
use serde::{Deserialize, Serialize};

use crate::keys::composite_key_with;

/// An organizational unit from the unit directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub short_name: String,
    pub name_de: Option<String>,
    pub name_en: Option<String>,
    pub alternative_names: Vec<String>,
    pub email: Vec<String>,
}

impl UnitRecord {
    /// Every name the unit is known by.
    pub fn synonyms(&self) -> Vec<&str> {
        let mut synonyms = vec![self.id.as_str(), self.short_name.as_str()];
        synonyms.extend(self.name_de.as_deref());
        synonyms.extend(self.name_en.as_deref());
        synonyms.extend(self.alternative_names.iter().map(String::as_str));
        synonyms.retain(|synonym| !synonym.trim().is_empty());
        synonyms
    }
}

/// A person from the staff directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRecord {
    pub account: String,
    pub email: Vec<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub display_name: Option<String>,
    /// Unit short name or any other unit synonym.
    pub department: Option<String>,
}

impl PersonRecord {
    pub fn full_name(&self) -> Option<String> {
        if let Some(display_name) = self.display_name.as_deref()
            && !display_name.trim().is_empty()
        {
            return Some(display_name.trim().to_string());
        }
        match (self.given_name.as_deref(), self.family_name.as_deref()) {
            (Some(given), Some(family)) => Some(format!("{given} {family}")),
            (None, Some(name)) | (Some(name), None) => Some(name.to_string()),
            (None, None) => None,
        }
    }
}

/// An external organization from a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationRecord {
    pub id: String,
    pub official_name: String,
    pub alternative_names: Vec<String>,
}

/// A research project from the project database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRecord {
    pub project_number: String,
    pub title: String,
    pub title_en: Option<String>,
    pub short_name: Option<String>,
    /// Short name of the project this one continues.
    pub predecessor: Option<String>,
    pub activity_type: Option<String>,
    pub unit: String,
    pub project_lead: Option<String>,
    pub partners: Vec<String>,
    pub funders: Vec<String>,
    /// Topic hints, resolved independently through the theme rules.
    pub topics: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub website: Option<String>,
}

impl ProjectRecord {
    pub fn start_date(&self) -> Option<Temporal> {
        self.start.as_deref().and_then(|raw| Temporal::parse(raw).ok())
    }

    pub fn end_date(&self) -> Option<Temporal> {
        self.end.as_deref().and_then(|raw| Temporal::parse(raw).ok())
    }
}

impl FilterableRecord for ProjectRecord {
    fn identifier_in_primary_source(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.project_number))
    }

    fn partners(&self) -> Vec<&str> {
        self.partners.iter().map(String::as_str).collect()
    }

    fn units(&self) -> Vec<&str> {
        vec![self.unit.as_str()]
    }

    fn start_year(&self) -> Option<i32> {
        self.start_date().map(|date| date.year())
    }

    fn end_year(&self) -> Option<i32> {
        self.end_date().map(|date| date.year())
    }

    fn label(&self) -> Option<&str> {
        Some(&self.title)
    }
}

/// One version of a sample data set from the laboratory system.
///
/// The same sample on the same platform is delivered once per run; only
/// the latest version is harvested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SampleRecord {
    pub sample_id: String,
    pub platform: String,
    /// Effective date of this version, `YYYY-MM-DD`.
    pub version_date: String,
    pub run_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub unit: String,
    pub contact_email: Vec<String>,
    pub project_number: Option<String>,
    /// Federal state code, first spatial dimension.
    pub state: Option<String>,
    /// Country code, second spatial dimension.
    pub country: Option<String>,
}

impl SampleRecord {
    /// `{sample_id}.{platform}`, with dots inside either part escaped.
    pub fn natural_key(&self) -> String {
        composite_key_with('.', [&self.sample_id, &self.platform])
    }

    pub fn version(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.version_date.trim(), "%Y-%m-%d").ok()
    }
}

impl FilterableRecord for SampleRecord {
    fn identifier_in_primary_source(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.natural_key()))
    }

    fn units(&self) -> Vec<&str> {
        vec![self.unit.as_str()]
    }

    fn start_year(&self) -> Option<i32> {
        self.version().map(|date| chrono::Datelike::year(&date))
    }

    fn label(&self) -> Option<&str> {
        Some(&self.title)
    }
}

/// A variable of a survey study.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableRecord {
    /// Identifier of the study resource the variable belongs to.
    pub study_id: String,
    pub variable_id: String,
    /// Thematic group the variable is bucketed into.
    pub group_id: String,
    pub label: String,
    pub description: Option<String>,
    pub data_type: Option<String>,
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_synonyms_skip_blanks() {
        let unit = UnitRecord {
            id: "u-12".into(),
            short_name: "FG12".into(),
            name_de: Some("Fachgebiet 12".into()),
            alternative_names: vec![" ".into(), "Surveillance".into()],
            ..UnitRecord::default()
        };
        assert_eq!(
            unit.synonyms(),
            vec!["u-12", "FG12", "Fachgebiet 12", "Surveillance"]
        );
    }

    #[test]
    fn person_full_name_prefers_display_name() {
        let mut person = PersonRecord {
            given_name: Some("Jane".into()),
            family_name: Some("Doe".into()),
            ..PersonRecord::default()
        };
        assert_eq!(person.full_name().as_deref(), Some("Jane Doe"));
        person.display_name = Some("Dr. Jane Doe ".into());
        assert_eq!(person.full_name().as_deref(), Some("Dr. Jane Doe"));
    }

    #[test]
    fn project_years_feed_the_filter() {
        let project = ProjectRecord {
            project_number: "P-1".into(),
            start: Some("01.03.1969".into()),
            end: Some("2021".into()),
            unit: "FG12".into(),
            ..ProjectRecord::default()
        };
        assert_eq!(project.start_year(), Some(1969));
        assert_eq!(project.end_year(), Some(2021));
        assert_eq!(project.units(), vec!["FG12"]);
    }

    #[test]
    fn sample_natural_key() {
        let sample = SampleRecord {
            sample_id: "S1".into(),
            platform: "PLATFORM-X".into(),
            ..SampleRecord::default()
        };
        assert_eq!(sample.natural_key(), "S1.PLATFORM-X");
        assert_eq!(
            sample.identifier_in_primary_source().as_deref(),
            Some("S1.PLATFORM-X")
        );
    }
}
