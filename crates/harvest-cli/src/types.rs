use std::collections::BTreeMap;
use std::path::PathBuf;

use harvest_model::EntityKind;
use harvest_transform::TransformReport;

/// Outcome of one harvesting run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Written NDJSON file; `None` on a dry run.
    pub output: Option<PathBuf>,
    pub steps: Vec<StepSummary>,
    /// Entities handed to the sink, per kind. Fallback entities included.
    pub emitted: BTreeMap<EntityKind, usize>,
    /// Source records dropped by the filter policy, per target kind.
    pub filtered: BTreeMap<EntityKind, usize>,
    pub report: TransformReport,
}

impl RunSummary {
    pub fn total_emitted(&self) -> usize {
        self.emitted.values().sum()
    }

    pub fn total_filtered(&self) -> usize {
        self.filtered.values().sum()
    }

    pub fn has_issues(&self) -> bool {
        !self.report.issues.is_empty()
    }
}

/// Counters for one extraction step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSummary {
    pub name: &'static str,
    pub records: usize,
    pub produced: usize,
    pub skipped: usize,
}
