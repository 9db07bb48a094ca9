//! Reading mapping files into typed [`Mapping`]s.
//!
//! Loading happens in two steps so the two failure modes stay distinct:
//! [`load_tree`] only checks that a file is well-formed YAML
//! ([`MappingError::Parse`]), and [`coerce`] fits that tree to the mapping
//! model and a [`MappingSchema`] ([`MappingError::Schema`]).

use std::fs;
use std::path::Path;

use harvest_model::{Mapping, MappingRuleGroup};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{MappingError, Result};
use crate::schema::MappingSchema;

/// Read a mapping file as an untyped tree.
pub fn load_tree(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path).map_err(|source| MappingError::io(path, source))?;
    parse_tree(&contents, path)
}

/// Parse mapping text as an untyped tree; `origin` is used for error messages.
pub fn parse_tree(contents: &str, origin: &Path) -> Result<Value> {
    serde_yaml::from_str(contents).map_err(|source| MappingError::Parse {
        path: origin.to_path_buf(),
        source,
    })
}

/// Read and coerce a mapping file in one go.
pub fn load_mapping(path: &Path, schema: &MappingSchema) -> Result<Mapping> {
    let tree = load_tree(path)?;
    let mapping = coerce(tree, schema, path)?;
    debug!(
        path = %path.display(),
        schema = schema.name(),
        rules = mapping.rule_count(),
        "loaded mapping"
    );
    Ok(mapping)
}

/// Fit an untyped tree to the mapping model.
///
/// The top level must be a map from target field to a list of rule groups.
/// Fields outside the schema and missing required fields are schema errors.
/// An empty document coerces to an empty mapping.
pub fn coerce(tree: Value, schema: &MappingSchema, origin: &Path) -> Result<Mapping> {
    let entries = match tree {
        Value::Mapping(entries) => entries,
        Value::Null => serde_yaml::Mapping::new(),
        other => {
            return Err(MappingError::schema(
                origin,
                format!("expected a map of target fields, found {}", value_kind(&other)),
            ));
        }
    };

    let mut fields = std::collections::BTreeMap::new();
    for (key, value) in entries {
        let Value::String(field) = key else {
            return Err(MappingError::schema(
                origin,
                format!("target field names must be strings, found {}", value_kind(&key)),
            ));
        };
        if !schema.is_allowed(&field) {
            return Err(MappingError::schema(
                origin,
                format!("unknown target field `{field}` for {}", schema.name()),
            ));
        }
        let groups: Vec<MappingRuleGroup> = match value {
            Value::Null => Vec::new(),
            value => serde_yaml::from_value(value).map_err(|error| {
                MappingError::schema(origin, format!("field `{field}`: {error}"))
            })?,
        };
        fields.insert(field, groups);
    }

    let missing: Vec<&str> = schema
        .required()
        .filter(|field| !fields.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(MappingError::schema(
            origin,
            format!(
                "missing required field(s) for {}: {}",
                schema.name(),
                missing.join(", ")
            ),
        ));
    }

    Ok(Mapping::new(fields))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a map",
        Value::Tagged(_) => "a tagged value",
    }
}
