//! Library side of the harvester CLI: logging setup and step sequencing.

pub mod logging;
pub mod pipeline;
pub mod types;
