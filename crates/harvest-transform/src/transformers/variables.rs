use std::collections::{BTreeSet, HashMap};

use harvest_core::{AmbiguityPolicy, CrossReferenceIndex};
use harvest_map::MappingExt;
use harvest_model::{
    EntityKind, ExtractedVariable, ExtractedVariableGroup, Identifier, Mapping, Text, Variable,
    VariableGroup,
};

use crate::context::TransformContext;
use crate::keys::composite_key;
use crate::records::VariableRecord;

const LABEL: &str = "label";
const DATA_TYPE: &str = "dataType";

/// Inputs of the variable transformer besides the records.
pub struct VariableReferences<'a> {
    /// Study resources by identifier in primary source.
    pub resources: &'a CrossReferenceIndex,
    /// Rules for group labels, keyed by group id.
    pub group_mapping: &'a Mapping,
    /// Rules for data types, keyed by the source type name.
    pub variable_mapping: &'a Mapping,
}

/// Bucket survey variables into thematic groups and transform both.
///
/// Groups are identified by `{study_id}-{group_id}` and variables by
/// `{study_id}-{variable_id}`. The study resource is required: a group
/// whose study is unknown is skipped along with its variables.
pub fn transform_variables(
    records: &[VariableRecord],
    references: &VariableReferences<'_>,
    ctx: &mut TransformContext<'_>,
) -> (Vec<ExtractedVariableGroup>, Vec<ExtractedVariable>) {
    let mut buckets: Vec<(&str, &str, Vec<&VariableRecord>)> = Vec::new();
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    for record in records {
        let key = (record.study_id.as_str(), record.group_id.as_str());
        let position = *positions.entry(key).or_insert_with(|| {
            buckets.push((key.0, key.1, Vec::new()));
            buckets.len() - 1
        });
        buckets[position].2.push(record);
    }

    let mut groups = Vec::with_capacity(buckets.len());
    let mut variables = Vec::with_capacity(records.len());
    for (study_id, group_id, members) in buckets {
        let group_key = composite_key([study_id, group_id]);
        let study = ctx.reference(
            references.resources,
            study_id,
            AmbiguityPolicy::FirstLexicographic,
            EntityKind::VariableGroup,
            &group_key,
            "containedBy",
        );
        if study.is_empty() {
            ctx.report_mut().skip(
                EntityKind::VariableGroup,
                &group_key,
                "containedBy",
                format!("no study resource `{study_id}`"),
            );
            for member in members {
                ctx.report_mut().skip(
                    EntityKind::Variable,
                    &composite_key([study_id, member.variable_id.as_str()]),
                    "belongsTo",
                    format!("variable group `{group_key}` was skipped"),
                );
            }
            continue;
        }

        let mut label = references.group_mapping.resolve_texts(LABEL, group_id);
        if label.is_empty() {
            label.push(Text::plain(group_id));
        }
        let group = ctx.extract(
            &group_key,
            VariableGroup {
                label,
                contained_by: study.clone(),
            },
        );

        for member in members {
            let variable = transform_variable(
                member,
                group.stable_target_id(),
                &study,
                references.variable_mapping,
                ctx,
            );
            variables.push(variable);
        }
        groups.push(group);
    }
    (groups, variables)
}

fn transform_variable(
    record: &VariableRecord,
    group: &Identifier,
    study: &[Identifier],
    mapping: &Mapping,
    ctx: &mut TransformContext<'_>,
) -> ExtractedVariable {
    let value_set: BTreeSet<&str> = record
        .values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();
    let data_type = record
        .data_type
        .as_deref()
        .and_then(|data_type| mapping.resolve_concepts(DATA_TYPE, data_type).into_iter().next());
    let attributes = Variable {
        label: vec![Text::de(&record.label)],
        description: record.description.as_deref().map(Text::de).into_iter().collect(),
        data_type,
        value_set: value_set.into_iter().map(str::to_string).collect(),
        belongs_to: vec![group.clone()],
        used_in: study.to_vec(),
    };
    ctx.extract(
        &composite_key([record.study_id.as_str(), record.variable_id.as_str()]),
        attributes,
    )
}
