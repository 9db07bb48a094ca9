use harvest_model::{ExtractedOrganization, Organization, Text};

use crate::context::TransformContext;
use crate::records::OrganizationRecord;

pub fn transform_organizations(
    records: &[OrganizationRecord],
    ctx: &mut TransformContext<'_>,
) -> Vec<ExtractedOrganization> {
    records
        .iter()
        .map(|record| {
            let attributes = Organization {
                official_name: vec![Text::plain(&record.official_name)],
                alternative_name: record.alternative_names.iter().map(Text::plain).collect(),
            };
            ctx.extract(&record.id, attributes)
        })
        .collect()
}

/// Attributes of a synthetic organization known only by a label.
pub fn fallback_organization(label: &str) -> Organization {
    Organization {
        official_name: vec![Text::plain(label)],
        ..Organization::default()
    }
}
