use harvest_core::CrossReferenceIndex;
use harvest_map::{MappingExt, index_by_for_value};
use harvest_model::{
    EntityKind, ExtractedResource, Identifier, Link, Mapping, Resource, SetValue, Text,
};

use super::require_unit;
use crate::context::TransformContext;
use crate::keys::composite_key;

const TITLE: &str = "title";
const ALTERNATIVE_TITLE: &str = "alternativeTitle";
const DOCUMENTATION: &str = "documentation";
const SPATIAL: &str = "spatial";
const KEYWORD: &str = "keyword";
const UNIT_IN_CHARGE: &str = "unitInCharge";
const ACCESS_RESTRICTION: &str = "accessRestriction";
const THEME: &str = "theme";
const LANGUAGE: &str = "language";
const RESOURCE_TYPE_GENERAL: &str = "resourceTypeGeneral";

/// Fan out one resource per disease key of the `title` rule group.
///
/// Each key's alternative title, documentation and spatial coverage come
/// from sibling rule groups matched by the same key; a key missing from a
/// sibling leaves that attribute empty. The unit in charge is the mapping's
/// default and is required for every resource.
pub fn transform_disease_resources(
    mapping: &Mapping,
    units: &CrossReferenceIndex,
    is_part_of: Option<&Identifier>,
    ctx: &mut TransformContext<'_>,
) -> Vec<ExtractedResource> {
    let Some(title_group) = mapping.group(TITLE) else {
        return Vec::new();
    };
    let titles = index_by_for_value(title_group);
    let alternative_titles = mapping.index(ALTERNATIVE_TITLE);
    let documentation = mapping.index(DOCUMENTATION);
    let spatial = mapping.index(SPATIAL);

    let unit = mapping.default_strings(UNIT_IN_CHARGE).into_iter().next();
    let mut resources = Vec::new();
    for key in title_group.for_values() {
        let identifier = composite_key(["disease", key]);
        let unit_in_charge = match unit.as_deref() {
            Some(unit) => require_unit(
                ctx,
                units,
                unit,
                EntityKind::Resource,
                &identifier,
                UNIT_IN_CHARGE,
            ),
            None => {
                ctx.report_mut().skip(
                    EntityKind::Resource,
                    &identifier,
                    UNIT_IN_CHARGE,
                    "mapping has no default unit",
                );
                None
            }
        };
        let Some(unit_in_charge) = unit_in_charge else {
            continue;
        };

        let attributes = Resource {
            title: texts(titles.get(key)),
            alternative_title: texts(alternative_titles.get(key)),
            documentation: links(documentation.get(key)),
            spatial: texts(spatial.get(key)),
            keyword: mapping.default_texts(KEYWORD),
            contact: unit_in_charge.clone(),
            unit_in_charge,
            access_restriction: mapping.default_concept(ACCESS_RESTRICTION),
            theme: mapping.default_concepts(THEME),
            language: mapping.default_concepts(LANGUAGE),
            is_part_of: is_part_of.cloned().into_iter().collect(),
            resource_type_general: mapping.default_concepts(RESOURCE_TYPE_GENERAL),
            ..Resource::default()
        };
        resources.push(ctx.extract(&identifier, attributes));
    }
    resources
}

fn texts(values: Option<&Vec<SetValue>>) -> Vec<Text> {
    values
        .into_iter()
        .flatten()
        .filter_map(SetValue::to_text)
        .collect()
}

fn links(values: Option<&Vec<SetValue>>) -> Vec<Link> {
    values
        .into_iter()
        .flatten()
        .filter_map(SetValue::to_link)
        .collect()
}
