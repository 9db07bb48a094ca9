use std::collections::HashMap;

use harvest_model::{
    EntityKind, ExtractedOrganizationalUnit, Identifier, OrganizationalUnit, Text,
};

use crate::context::TransformContext;
use crate::records::UnitRecord;

/// Transform the unit directory.
///
/// Parent links point at other units of the same batch, which may come
/// later in the input, so they are resolved in a second pass once every
/// unit has its identity. `unit_of` is the organization all units belong to.
pub fn transform_units(
    records: &[UnitRecord],
    unit_of: Option<&Identifier>,
    ctx: &mut TransformContext<'_>,
) -> Vec<ExtractedOrganizationalUnit> {
    let mut units = Vec::with_capacity(records.len());
    let mut by_source_id: HashMap<&str, Identifier> = HashMap::new();

    for record in records {
        let mut name = Vec::new();
        name.extend(record.name_de.as_deref().map(Text::de));
        name.extend(record.name_en.as_deref().map(Text::en));
        let attributes = OrganizationalUnit {
            name,
            alternative_name: record.alternative_names.iter().map(Text::plain).collect(),
            short_name: vec![Text::plain(&record.short_name)],
            email: record.email.clone(),
            parent_unit: None,
            unit_of: unit_of.cloned().into_iter().collect(),
        };
        let unit = ctx.extract(&record.id, attributes);
        by_source_id.insert(&record.id, unit.stable_target_id().clone());
        units.push(unit);
    }

    for (unit, record) in units.iter_mut().zip(records) {
        let Some(parent) = record.parent_id.as_deref() else {
            continue;
        };
        match by_source_id.get(parent) {
            Some(id) => unit.attributes.parent_unit = Some(id.clone()),
            None => ctx.report_mut().unresolved(
                EntityKind::OrganizationalUnit,
                &record.id,
                "parentUnit",
                format!("no unit with id `{parent}`"),
            ),
        }
    }

    units
}
