//! Declarative mapping support: loading mapping files into typed
//! [`harvest_model::Mapping`]s and evaluating their rules.

#![deny(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod loader;
pub mod repository;
pub mod schema;

pub use error::{MappingError, Result};
pub use evaluator::{MappingExt, default_values, index_by_for_value, resolve};
pub use loader::{coerce, load_mapping, load_tree, parse_tree};
pub use repository::{MappingMetadata, MappingRepository};
pub use schema::MappingSchema;
