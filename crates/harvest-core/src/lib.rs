//! Identity resolution and run plumbing shared by every transformer:
//! identity assignment, cross-reference indexes, fallback creation, sinks,
//! the global record filter and run settings.

pub mod error;
pub mod fallback;
pub mod filter;
pub mod identity;
pub mod settings;
pub mod sink;
pub mod xref;

pub use error::{ConfigError, IdentityError, SinkError};
pub use fallback::FallbackCache;
pub use filter::{FILTER_TARGET, FilterPolicy, FilterReason, FilterableRecord, Filtered, filter};
pub use identity::{
    HashingIdentityProvider, IdentityProvider, ROOT_PRIMARY_SOURCE, extract_primary_source,
    root_identity,
};
pub use settings::{CONFIG_ENV, Settings};
pub use sink::{MemorySink, NdjsonSink, Sink};
pub use xref::{AmbiguityPolicy, CrossReferenceIndex, Lookup, build_index};
