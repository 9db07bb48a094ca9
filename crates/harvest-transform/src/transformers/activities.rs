use std::collections::BTreeSet;

use harvest_core::{AmbiguityPolicy, CrossReferenceIndex};
use harvest_map::MappingExt;
use harvest_model::{
    Activity, Concept, EntityKind, ExtractedActivity, Identifier, Link, Mapping, Text,
};
use tracing::debug;

use super::organizations::fallback_organization;
use super::{push_unique, require_unit};
use crate::context::TransformContext;
use crate::error::Result;
use crate::records::ProjectRecord;

const ACTIVITY_TYPE: &str = "activityType";
const THEME: &str = "theme";
const DOCUMENTATION: &str = "documentation";

/// Indexes the activity transformer links against.
pub struct ActivityReferences<'a> {
    /// Units by synonym, lowercased.
    pub units: &'a CrossReferenceIndex,
    pub persons_by_name: &'a CrossReferenceIndex,
    /// Organizations by label; extended with fallback organizations.
    pub organizations: &'a mut CrossReferenceIndex,
}

/// Transform projects into activities.
///
/// Runs in two passes. The first builds every activity and indexes it by
/// short name; the second resolves each project's predecessor name against
/// that index, so a project may succeed one that appears later in the input.
///
/// Per-field policies:
/// - `responsibleUnit` is required; a project without a known unit is skipped.
/// - `contact` and `involvedPerson` use every person matching the project
///   lead's name. Without a match the responsible unit is the contact.
/// - partners and funders missing from the organization index get one
///   fallback organization per label.
pub fn transform_activities<'r>(
    records: impl IntoIterator<Item = &'r ProjectRecord>,
    mapping: &Mapping,
    references: ActivityReferences<'_>,
    ctx: &mut TransformContext<'_>,
) -> Result<Vec<ExtractedActivity>> {
    let ActivityReferences {
        units,
        persons_by_name,
        organizations,
    } = references;

    let mut activities = Vec::new();
    let mut predecessors: Vec<Option<&str>> = Vec::new();
    let mut by_short_name = CrossReferenceIndex::new();

    for record in records {
        let number = record.project_number.as_str();
        let Some(responsible_unit) = require_unit(
            ctx,
            units,
            &record.unit,
            EntityKind::Activity,
            number,
            "responsibleUnit",
        ) else {
            continue;
        };

        let persons = match record.project_lead.as_deref() {
            Some(lead) => ctx.reference(
                persons_by_name,
                lead,
                AmbiguityPolicy::UseAll,
                EntityKind::Activity,
                number,
                "contact",
            ),
            None => Vec::new(),
        };
        let contact = if persons.is_empty() {
            responsible_unit.clone()
        } else {
            persons.clone()
        };

        let mut external_associate = Vec::new();
        for partner in &record.partners {
            let ids = ctx.reference_or_create(organizations, partner, fallback_organization)?;
            push_unique(&mut external_associate, ids);
        }
        let mut funder_or_commissioner = Vec::new();
        for funder in &record.funders {
            let ids = ctx.reference_or_create(organizations, funder, fallback_organization)?;
            push_unique(&mut funder_or_commissioner, ids);
        }

        let mut title = vec![Text::de(&record.title)];
        title.extend(record.title_en.as_deref().map(Text::en));

        let attributes = Activity {
            title,
            short_name: record.short_name.as_deref().map(Text::plain).into_iter().collect(),
            activity_type: mapping
                .resolve_concepts(ACTIVITY_TYPE, record.activity_type.as_deref().unwrap_or_default()),
            contact,
            responsible_unit,
            involved_person: persons,
            funder_or_commissioner,
            external_associate,
            start: record.start_date().into_iter().collect(),
            end: record.end_date().into_iter().collect(),
            theme: select_themes(mapping, &record.topics),
            website: record.website.as_deref().map(Link::new).into_iter().collect(),
            documentation: mapping.default_links(DOCUMENTATION),
            ..Activity::default()
        };
        let activity = ctx.extract(number, attributes);
        if let Some(short_name) = record.short_name.as_deref() {
            by_short_name.insert(short_name.to_string(), activity.stable_target_id().clone());
        }
        predecessors.push(record.predecessor.as_deref());
        activities.push(activity);
    }

    for (activity, predecessor) in activities.iter_mut().zip(predecessors) {
        let Some(predecessor) = predecessor else {
            continue;
        };
        let succeeds: Vec<Identifier> = by_short_name
            .resolve(predecessor, AmbiguityPolicy::UseAll)
            .into_iter()
            .filter(|id| id != activity.stable_target_id())
            .collect();
        if succeeds.is_empty() {
            debug!(
                activity = activity.identifier_in_primary_source(),
                predecessor,
                "predecessor not found"
            );
        }
        activity.attributes.succeeds = succeeds;
    }

    Ok(activities)
}

/// Resolve each topic hint through the theme rules and merge the results.
///
/// Themes are deduplicated and sorted by concept, so the output does not
/// depend on the order of the hints. Without any hint the rule group's
/// default applies.
pub fn select_themes(mapping: &Mapping, hints: &[String]) -> Vec<Concept> {
    let mut themes = BTreeSet::new();
    if hints.is_empty() {
        themes.extend(mapping.default_concepts(THEME));
    }
    for hint in hints {
        themes.extend(mapping.resolve_concepts(THEME, hint));
    }
    themes.into_iter().collect()
}
