use harvest_core::{AmbiguityPolicy, CrossReferenceIndex};
use harvest_map::{MappingExt, resolve};
use harvest_model::{
    EntityKind, ExtractedResource, Identifier, Mapping, Resource, SetValue, Temporal, Text,
};

use super::{push_unique, require_unit};
use crate::context::TransformContext;
use crate::indexes::normalize_key;
use crate::latest::keep_latest;
use crate::records::SampleRecord;

const ACCESS_RESTRICTION: &str = "accessRestriction";
const LANGUAGE: &str = "language";
const RESOURCE_TYPE_GENERAL: &str = "resourceTypeGeneral";
const SPATIAL: &str = "spatial";
const THEME: &str = "theme";

/// Indexes the sample transformer links against.
pub struct ResourceReferences<'a> {
    pub units: &'a CrossReferenceIndex,
    pub persons_by_email: &'a CrossReferenceIndex,
    /// Activities by project number.
    pub activities: &'a CrossReferenceIndex,
    pub access_platform: Option<&'a Identifier>,
}

/// Transform sample data sets into resources.
///
/// Only the latest version of each `{sample_id}.{platform}` is kept.
/// `unitInCharge` is required. Contacts are every person with a listed
/// email, falling back to the unit in charge. The generating activity is
/// looked up by project number; should two activities share one, the
/// lexicographically first is used.
pub fn transform_sample_resources(
    records: Vec<SampleRecord>,
    mapping: &Mapping,
    references: &ResourceReferences<'_>,
    ctx: &mut TransformContext<'_>,
) -> Vec<ExtractedResource> {
    let mut resources = Vec::new();
    for record in keep_latest(records) {
        let key = record.natural_key();
        let Some(unit_in_charge) = require_unit(
            ctx,
            references.units,
            &record.unit,
            EntityKind::Resource,
            &key,
            "unitInCharge",
        ) else {
            continue;
        };

        let mut contact = Vec::new();
        for email in &record.contact_email {
            let ids = ctx.reference(
                references.persons_by_email,
                &normalize_key(email),
                AmbiguityPolicy::UseAll,
                EntityKind::Resource,
                &key,
                "contact",
            );
            push_unique(&mut contact, ids);
        }
        if contact.is_empty() {
            contact = unit_in_charge.clone();
        }

        let was_generated_by = match record.project_number.as_deref() {
            Some(number) => ctx
                .reference(
                    references.activities,
                    number,
                    AmbiguityPolicy::FirstLexicographic,
                    EntityKind::Resource,
                    &key,
                    "wasGeneratedBy",
                )
                .into_iter()
                .next(),
            None => None,
        };

        let attributes = Resource {
            title: vec![Text::de(&record.title)],
            description: record.description.as_deref().map(Text::de).into_iter().collect(),
            keyword: record.keywords.iter().map(Text::de).collect(),
            contact,
            unit_in_charge,
            access_restriction: mapping.default_concept(ACCESS_RESTRICTION),
            theme: mapping.default_concepts(THEME),
            spatial: spatial(mapping, &record),
            language: mapping.default_concepts(LANGUAGE),
            created: record.version().map(Temporal::Date),
            was_generated_by,
            resource_type_general: mapping.default_concepts(RESOURCE_TYPE_GENERAL),
            access_platform: references.access_platform.cloned().into_iter().collect(),
            ..Resource::default()
        };
        resources.push(ctx.extract(&key, attributes));
    }
    resources
}

/// Spatial coverage from two independent rule groups: the first keyed by
/// federal state, the second by country.
fn spatial(mapping: &Mapping, record: &SampleRecord) -> Vec<Text> {
    let inputs = [record.state.as_deref(), record.country.as_deref()];
    let mut texts: Vec<Text> = Vec::new();
    for (group, input) in mapping.groups(SPATIAL).iter().zip(inputs) {
        let Some(input) = input else {
            continue;
        };
        let values = resolve(group, input).unwrap_or_default();
        for text in values.iter().filter_map(SetValue::to_text) {
            if !texts.contains(&text) {
                texts.push(text);
            }
        }
    }
    texts
}
