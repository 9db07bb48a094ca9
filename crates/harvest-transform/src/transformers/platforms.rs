use harvest_core::{AmbiguityPolicy, CrossReferenceIndex};
use harvest_map::MappingExt;
use harvest_model::{AccessPlatform, EntityKind, ExtractedAccessPlatform, Mapping};

use super::{push_unique, require_unit};
use crate::context::TransformContext;
use crate::indexes::normalize_key;

const IDENTIFIER_IN_PRIMARY_SOURCE: &str = "identifierInPrimarySource";
const TITLE: &str = "title";
const TECHNICAL_ACCESSIBILITY: &str = "technicalAccessibility";
const ENDPOINT_URL: &str = "endpointUrl";
const LANDING_PAGE: &str = "landingPage";
const CONTACT: &str = "contact";
const UNIT_IN_CHARGE: &str = "unitInCharge";

/// Build the access platform described entirely by mapping defaults.
///
/// Contacts are emails resolved through the person index; the unit in
/// charge is a unit synonym and is required.
pub fn transform_access_platform(
    mapping: &Mapping,
    units: &CrossReferenceIndex,
    persons_by_email: &CrossReferenceIndex,
    ctx: &mut TransformContext<'_>,
) -> Option<ExtractedAccessPlatform> {
    let Some(identifier) = mapping
        .default_strings(IDENTIFIER_IN_PRIMARY_SOURCE)
        .into_iter()
        .next()
    else {
        ctx.report_mut().skip(
            EntityKind::AccessPlatform,
            "",
            IDENTIFIER_IN_PRIMARY_SOURCE,
            "mapping has no default identifier",
        );
        return None;
    };

    let mut unit_in_charge = Vec::new();
    for unit in mapping.default_strings(UNIT_IN_CHARGE) {
        let ids = require_unit(
            ctx,
            units,
            &unit,
            EntityKind::AccessPlatform,
            &identifier,
            UNIT_IN_CHARGE,
        )?;
        push_unique(&mut unit_in_charge, ids);
    }
    if unit_in_charge.is_empty() {
        ctx.report_mut().skip(
            EntityKind::AccessPlatform,
            &identifier,
            UNIT_IN_CHARGE,
            "mapping has no default unit",
        );
        return None;
    }

    let mut contact = Vec::new();
    for email in mapping.default_strings(CONTACT) {
        let ids = ctx.reference(
            persons_by_email,
            &normalize_key(&email),
            AmbiguityPolicy::UseAll,
            EntityKind::AccessPlatform,
            &identifier,
            CONTACT,
        );
        push_unique(&mut contact, ids);
    }

    let attributes = AccessPlatform {
        title: mapping.default_texts(TITLE),
        technical_accessibility: mapping.default_concept(TECHNICAL_ACCESSIBILITY),
        endpoint_url: mapping.default_links(ENDPOINT_URL).into_iter().next(),
        landing_page: mapping.default_links(LANDING_PAGE),
        contact,
        unit_in_charge,
    };
    Some(ctx.extract(&identifier, attributes))
}
