//! Rule evaluation.
//!
//! Rules are evaluated first-match-wins in declared order. An explicit rule
//! whose `forValues` contains the input always beats an unconditional
//! default, wherever the default sits in the list. No match and no default
//! means "no value for this field": callers omit the field.

use std::collections::HashMap;

use harvest_model::{Concept, Language, Link, Mapping, MappingRuleGroup, SetValue, Text};

/// Resolve one input against a rule group.
///
/// Returns the `setValues` of the first rule whose `forValues` contain
/// `input`, otherwise those of the first default rule, otherwise `None`.
pub fn resolve<'a>(group: &'a MappingRuleGroup, input: &str) -> Option<&'a [SetValue]> {
    group
        .mapping_rules
        .iter()
        .find(|rule| rule.matches(input))
        .or_else(|| group.mapping_rules.iter().find(|rule| rule.is_default()))
        .map(|rule| rule.set_values())
}

/// The `setValues` of the first unconditional rule, if any.
pub fn default_values(group: &MappingRuleGroup) -> Option<&[SetValue]> {
    group
        .mapping_rules
        .iter()
        .find(|rule| rule.is_default())
        .map(|rule| rule.set_values())
}

/// Index a rule group by its `forValues` for bulk lookups.
///
/// Built in rule order; a `forValue` that appears again in a later rule
/// keeps the earlier rule's values. Default rules are not indexed.
pub fn index_by_for_value(group: &MappingRuleGroup) -> HashMap<String, Vec<SetValue>> {
    let mut index = HashMap::new();
    for rule in &group.mapping_rules {
        let Some(for_values) = &rule.for_values else {
            continue;
        };
        for value in for_values {
            index
                .entry(value.clone())
                .or_insert_with(|| rule.set_values().to_vec());
        }
    }
    index
}

/// Field-level lookups on a [`Mapping`].
///
/// All helpers read the first rule group of a field; fields that need a
/// second dimension use [`Mapping::groups`] with [`resolve`] directly.
pub trait MappingExt {
    /// Resolve `input` against the field's first rule group.
    fn resolve(&self, field: &str, input: &str) -> &[SetValue];

    /// Values of the field's unconditional rule.
    fn defaults(&self, field: &str) -> &[SetValue];

    fn default_texts(&self, field: &str) -> Vec<Text> {
        self.defaults(field)
            .iter()
            .filter_map(SetValue::to_text)
            .collect()
    }

    fn default_texts_in(&self, field: &str, language: Language) -> Vec<Text> {
        self.defaults(field)
            .iter()
            .filter_map(|value| value.to_text_with_language(language))
            .collect()
    }

    fn default_strings(&self, field: &str) -> Vec<String> {
        self.defaults(field)
            .iter()
            .filter_map(SetValue::as_string)
            .collect()
    }

    fn default_concepts(&self, field: &str) -> Vec<Concept> {
        self.defaults(field)
            .iter()
            .filter_map(SetValue::to_concept)
            .collect()
    }

    fn default_concept(&self, field: &str) -> Option<Concept> {
        self.default_concepts(field).into_iter().next()
    }

    fn default_links(&self, field: &str) -> Vec<Link> {
        self.defaults(field)
            .iter()
            .filter_map(SetValue::to_link)
            .collect()
    }

    fn resolve_concepts(&self, field: &str, input: &str) -> Vec<Concept> {
        self.resolve(field, input)
            .iter()
            .filter_map(SetValue::to_concept)
            .collect()
    }

    fn resolve_texts(&self, field: &str, input: &str) -> Vec<Text> {
        self.resolve(field, input)
            .iter()
            .filter_map(SetValue::to_text)
            .collect()
    }

    fn resolve_strings(&self, field: &str, input: &str) -> Vec<String> {
        self.resolve(field, input)
            .iter()
            .filter_map(SetValue::as_string)
            .collect()
    }

    /// Index the field's first rule group; empty when the field is unmapped.
    fn index(&self, field: &str) -> HashMap<String, Vec<SetValue>>;
}

impl MappingExt for Mapping {
    fn resolve(&self, field: &str, input: &str) -> &[SetValue] {
        self.group(field)
            .and_then(|group| resolve(group, input))
            .unwrap_or(&[])
    }

    fn defaults(&self, field: &str) -> &[SetValue] {
        self.group(field).and_then(default_values).unwrap_or(&[])
    }

    fn index(&self, field: &str) -> HashMap<String, Vec<SetValue>> {
        self.group(field)
            .map(index_by_for_value)
            .unwrap_or_default()
    }
}
