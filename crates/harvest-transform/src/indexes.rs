//! Index builders for the natural keys shared across sources.
//!
//! Email and unit keys are lowercased on both sides; names are matched as
//! written.

use harvest_core::{CrossReferenceIndex, build_index};
use harvest_model::{
    ExtractedOrganization, ExtractedOrganizationalUnit, ExtractedPerson, ExtractedResource,
};

/// Normalize a key for case-insensitive indexes.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Persons by every declared email address.
pub fn persons_by_email(persons: &[ExtractedPerson]) -> CrossReferenceIndex {
    build_index(persons, |person| {
        person
            .attributes
            .email
            .iter()
            .map(|email| normalize_key(email))
            .collect::<Vec<_>>()
    })
}

/// Persons by full name.
pub fn persons_by_name(persons: &[ExtractedPerson]) -> CrossReferenceIndex {
    build_index(persons, |person| person.attributes.full_name.clone())
}

/// Units by every synonym: source identifier, short names, names and
/// alternative names.
pub fn units_by_synonym(units: &[ExtractedOrganizationalUnit]) -> CrossReferenceIndex {
    build_index(units, |unit| {
        let attributes = &unit.attributes;
        std::iter::once(unit.identifier_in_primary_source())
            .chain(attributes.short_name.iter().map(|text| text.value.as_str()))
            .chain(attributes.name.iter().map(|text| text.value.as_str()))
            .chain(attributes.alternative_name.iter().map(|text| text.value.as_str()))
            .map(normalize_key)
            .filter(|key| !key.is_empty())
            .collect::<Vec<_>>()
    })
}

/// Organizations by official and alternative names.
pub fn organizations_by_name(organizations: &[ExtractedOrganization]) -> CrossReferenceIndex {
    build_index(organizations, |organization| {
        let attributes = &organization.attributes;
        attributes
            .official_name
            .iter()
            .chain(&attributes.alternative_name)
            .map(|text| text.value.clone())
            .collect::<Vec<_>>()
    })
}

/// Resources by identifier in their primary source.
pub fn resources_by_identifier(resources: &[ExtractedResource]) -> CrossReferenceIndex {
    build_index(resources, |resource| {
        [resource.identifier_in_primary_source().to_string()]
    })
}
