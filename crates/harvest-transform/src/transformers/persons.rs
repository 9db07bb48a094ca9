use harvest_core::{AmbiguityPolicy, CrossReferenceIndex};
use harvest_model::{EntityKind, ExtractedPerson, Person};

use crate::context::TransformContext;
use crate::indexes::normalize_key;
use crate::records::PersonRecord;

/// Transform directory persons.
///
/// Membership is optional: a department that matches no unit synonym is
/// dropped, one that matches several units links all of them.
pub fn transform_persons(
    records: &[PersonRecord],
    units: &CrossReferenceIndex,
    ctx: &mut TransformContext<'_>,
) -> Vec<ExtractedPerson> {
    records
        .iter()
        .map(|record| {
            let member_of = match record.department.as_deref() {
                Some(department) => ctx.reference(
                    units,
                    &normalize_key(department),
                    AmbiguityPolicy::UseAll,
                    EntityKind::Person,
                    &record.account,
                    "memberOf",
                ),
                None => Vec::new(),
            };
            let attributes = Person {
                email: record.email.clone(),
                full_name: record.full_name().into_iter().collect(),
                given_name: record.given_name.clone().into_iter().collect(),
                family_name: record.family_name.clone().into_iter().collect(),
                member_of,
            };
            ctx.extract(&record.account, attributes)
        })
        .collect()
}
