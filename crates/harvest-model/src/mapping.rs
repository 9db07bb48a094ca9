//! Declarative field mappings.
//!
//! A mapping file is a tree of
//! `{targetField: [{fieldInPrimarySource, locationInPrimarySource, mappingRules: [...]}]}`.
//! Each rule says "for these inputs, set these outputs". Rules without
//! `forValues` are unconditional defaults. Evaluation lives in `harvest-map`;
//! this module only holds the typed shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Concept, Language, Link, Text};

/// One output value of a mapping rule.
///
/// Mapping authors write plain scalars, `{value, language}` texts or
/// `{url, title, language}` links. Identifier placeholders (for example a unit
/// short name that still needs resolving) are plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetValue {
    Link(Link),
    Text(Text),
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl SetValue {
    /// The value as a plain string, if it has a scalar or text form.
    pub fn as_string(&self) -> Option<String> {
        match self {
            SetValue::String(value) => Some(value.clone()),
            SetValue::Text(text) => Some(text.value.clone()),
            SetValue::Integer(value) => Some(value.to_string()),
            SetValue::Float(value) => Some(value.to_string()),
            SetValue::Bool(value) => Some(value.to_string()),
            SetValue::Link(link) => Some(link.url.clone()),
        }
    }

    /// The value as localized text; scalars become untagged texts.
    pub fn to_text(&self) -> Option<Text> {
        match self {
            SetValue::Text(text) => Some(text.clone()),
            SetValue::Link(link) => link
                .title
                .as_ref()
                .map(|title| Text::new(title.clone(), link.language)),
            SetValue::Bool(_) => None,
            other => other.as_string().map(Text::plain),
        }
    }

    pub fn to_text_with_language(&self, language: Language) -> Option<Text> {
        self.to_text().map(|mut text| {
            text.language.get_or_insert(language);
            text
        })
    }

    pub fn to_link(&self) -> Option<Link> {
        match self {
            SetValue::Link(link) => Some(link.clone()),
            SetValue::String(url) => Some(Link::new(url.clone())),
            _ => None,
        }
    }

    pub fn to_concept(&self) -> Option<Concept> {
        match self {
            SetValue::String(value) => Concept::new(value.clone()).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SetValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for SetValue {
    fn from(value: &str) -> Self {
        SetValue::String(value.to_string())
    }
}

impl From<Text> for SetValue {
    fn from(value: Text) -> Self {
        SetValue::Text(value)
    }
}

/// A single "for these inputs, set these outputs" rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    /// Inputs this rule applies to. `None` makes the rule an unconditional default.
    #[serde(
        default,
        deserialize_with = "deserialize_for_values",
        skip_serializing_if = "Option::is_none"
    )]
    pub for_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_values: Option<Vec<SetValue>>,
    /// Human-readable description; never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl MappingRule {
    pub fn is_default(&self) -> bool {
        self.for_values.is_none()
    }

    pub fn matches(&self, input: &str) -> bool {
        self.for_values
            .as_ref()
            .is_some_and(|values| values.iter().any(|value| value == input))
    }

    pub fn set_values(&self) -> &[SetValue] {
        self.set_values.as_deref().unwrap_or(&[])
    }
}

/// Ordered rules for one dimension of a target field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRuleGroup {
    /// Where the input comes from. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_in_primary_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_in_primary_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_in_primary_source: Option<String>,
    pub mapping_rules: Vec<MappingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl MappingRuleGroup {
    pub fn new(mapping_rules: Vec<MappingRule>) -> Self {
        Self {
            mapping_rules,
            ..Self::default()
        }
    }

    /// Every `forValues` entry across the group, in rule order, first occurrence only.
    pub fn for_values(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.mapping_rules
            .iter()
            .filter_map(|rule| rule.for_values.as_ref())
            .flatten()
            .map(String::as_str)
            .filter(|value| seen.insert(*value))
            .collect()
    }
}

/// A typed mapping: target field name to its rule groups.
///
/// Loaded once per file and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    fields: BTreeMap<String, Vec<MappingRuleGroup>>,
}

impl Mapping {
    pub fn new(fields: BTreeMap<String, Vec<MappingRuleGroup>>) -> Self {
        Self { fields }
    }

    pub fn groups(&self, field: &str) -> &[MappingRuleGroup] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first rule group of a field, if the field is mapped at all.
    pub fn group(&self, field: &str) -> Option<&MappingRuleGroup> {
        self.groups(field).first()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn rule_count(&self) -> usize {
        self.fields
            .values()
            .flatten()
            .map(|group| group.mapping_rules.len())
            .sum()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(value) => value.to_string(),
            Scalar::Integer(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::String(value) => value,
        }
    }
}

/// Mapping authors write unquoted numbers (`forValues: [1, 2]`); keep them as strings.
fn deserialize_for_values<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Scalar>>::deserialize(deserializer)?;
    Ok(values.map(|values| values.into_iter().map(Scalar::into_string).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_coercions() {
        let text = SetValue::Text(Text::de("Projekt"));
        assert_eq!(text.as_string().as_deref(), Some("Projekt"));
        assert_eq!(text.to_concept(), None);

        let concept = SetValue::from("theme/public-health");
        assert_eq!(
            concept.to_concept().map(|c| c.to_string()),
            Some("theme/public-health".to_string())
        );
        assert_eq!(
            SetValue::Integer(2021).to_text(),
            Some(Text::plain("2021"))
        );
        assert_eq!(
            SetValue::from("Titel").to_text_with_language(Language::German),
            Some(Text::de("Titel"))
        );
    }

    #[test]
    fn group_for_values_are_unique_and_ordered() {
        let group = MappingRuleGroup::new(vec![
            MappingRule {
                for_values: Some(vec!["b".into(), "a".into()]),
                ..MappingRule::default()
            },
            MappingRule::default(),
            MappingRule {
                for_values: Some(vec!["a".into(), "c".into()]),
                ..MappingRule::default()
            },
        ]);
        assert_eq!(group.for_values(), vec!["b", "a", "c"]);
    }
}
