//! Per-domain entity transformers.
//!
//! Each transformer turns raw records of one upstream shape into extracted
//! entities, using its mapping for business rules and previously built
//! cross-reference indexes for links to other entities.
//!
//! | Transformer | Records | Produces | Required references |
//! |-------------|---------|----------|---------------------|
//! | units | [`UnitRecord`](crate::UnitRecord) | organizational units | none |
//! | persons | [`PersonRecord`](crate::PersonRecord) | persons | none |
//! | organizations | [`OrganizationRecord`](crate::OrganizationRecord) | organizations | none |
//! | activities | [`ProjectRecord`](crate::ProjectRecord) | activities | responsible unit |
//! | resources | [`SampleRecord`](crate::SampleRecord) | resources | unit in charge |
//! | diseases | mapping only | resources | unit in charge |
//! | platforms | mapping only | access platform | unit in charge |
//! | variables | [`VariableRecord`](crate::VariableRecord) | variable groups, variables | study resource |
//!
//! Records whose required reference cannot be resolved are skipped and
//! reported; optional references that do not resolve are omitted.

mod activities;
mod diseases;
mod organizations;
mod persons;
mod platforms;
mod resources;
mod units;
mod variables;

pub use activities::{ActivityReferences, select_themes, transform_activities};
pub use diseases::transform_disease_resources;
pub use organizations::{fallback_organization, transform_organizations};
pub use persons::transform_persons;
pub use platforms::transform_access_platform;
pub use resources::{ResourceReferences, transform_sample_resources};
pub use units::transform_units;
pub use variables::{VariableReferences, transform_variables};

use harvest_core::{AmbiguityPolicy, CrossReferenceIndex};
use harvest_model::{EntityKind, Identifier};

use crate::context::TransformContext;
use crate::indexes::normalize_key;

/// Resolve a mandatory unit reference, or report the record as skipped.
///
/// Unit synonyms can overlap between units; the lexicographically first
/// match is used so the result does not depend on index order.
pub(crate) fn require_unit(
    ctx: &mut TransformContext<'_>,
    units: &CrossReferenceIndex,
    unit: &str,
    target: EntityKind,
    record: &str,
    dependency: &str,
) -> Option<Vec<Identifier>> {
    let ids = ctx.reference(
        units,
        &normalize_key(unit),
        AmbiguityPolicy::FirstLexicographic,
        target,
        record,
        dependency,
    );
    if ids.is_empty() {
        ctx.report_mut().skip(
            target,
            record,
            dependency,
            format!("no unit known as `{unit}`"),
        );
        return None;
    }
    Some(ids)
}

/// Append `ids` to `into`, skipping ones already present.
pub(crate) fn push_unique(into: &mut Vec<Identifier>, ids: impl IntoIterator<Item = Identifier>) {
    for id in ids {
        if !into.contains(&id) {
            into.push(id);
        }
    }
}
