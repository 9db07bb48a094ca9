//! Mapping-driven transformation of raw source records into extracted
//! entities.
//!
//! - **records**: raw record shapes per upstream system
//! - **keys**: composite identifiers from several source fields
//! - **latest**: latest-version selection
//! - **indexes**: cross-reference index builders for shared natural keys
//! - **transformers**: one transformer per domain
//! - **context** / **report**: per-pass identity, fallback and issue tracking

pub mod context;
pub mod error;
pub mod indexes;
pub mod keys;
pub mod latest;
pub mod records;
pub mod report;
pub mod transformers;

pub use context::TransformContext;
pub use error::{Result, TransformError};
pub use indexes::{
    normalize_key, organizations_by_name, persons_by_email, persons_by_name,
    resources_by_identifier, units_by_synonym,
};
pub use keys::{DELIMITER, composite_key, composite_key_with};
pub use latest::{Versioned, keep_latest};
pub use records::{
    OrganizationRecord, PersonRecord, ProjectRecord, SampleRecord, UnitRecord, VariableRecord,
};
pub use report::{Issue, IssueKind, TransformReport};
pub use transformers::{
    ActivityReferences, ResourceReferences, VariableReferences, fallback_organization,
    select_themes, transform_access_platform, transform_activities, transform_disease_resources,
    transform_organizations, transform_persons, transform_sample_resources, transform_units,
    transform_variables,
};
