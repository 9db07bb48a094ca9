//! Per-record issues and transformer run statistics.

use std::fmt;

use harvest_core::AmbiguityPolicy;
use harvest_model::EntityKind;
use tracing::warn;

/// Kind of a non-fatal transformer issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// A mandatory reference had no match; the record was skipped.
    UnresolvedRequiredReference,
    /// An optional reference had no match; the record was kept without it.
    UnresolvedOptionalReference,
    /// A reference matched several entities; the call site's policy applied.
    AmbiguousReference,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::UnresolvedRequiredReference => "unresolved required reference",
            IssueKind::UnresolvedOptionalReference => "unresolved optional reference",
            IssueKind::AmbiguousReference => "ambiguous reference",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal problem with one raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    /// Entity kind the record would have produced.
    pub target: EntityKind,
    /// Natural identifier of the raw record.
    pub record: String,
    /// The reference that failed, e.g. `responsibleUnit`.
    pub dependency: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` ({}) {}: {}",
            self.target, self.record, self.dependency, self.kind, self.message
        )
    }
}

/// Outcome of one transformer pass.
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    /// Entities produced, fallback entities excluded.
    pub produced: usize,
    /// Records skipped for unresolved required references.
    pub skipped: usize,
    /// Synthetic entities created for missing references.
    pub fallbacks: usize,
    pub issues: Vec<Issue>,
}

impl TransformReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped record and log it.
    pub fn skip(
        &mut self,
        target: EntityKind,
        record: &str,
        dependency: &str,
        reason: impl Into<String>,
    ) {
        let reason = reason.into();
        warn!(
            target_kind = %target,
            record,
            dependency,
            reason = %reason,
            "record skipped"
        );
        self.skipped += 1;
        self.issues.push(Issue {
            kind: IssueKind::UnresolvedRequiredReference,
            target,
            record: record.to_string(),
            dependency: dependency.to_string(),
            message: reason,
        });
    }

    /// Record an optional reference left empty and log it. Nothing is skipped.
    pub fn unresolved(
        &mut self,
        target: EntityKind,
        record: &str,
        dependency: &str,
        reason: impl Into<String>,
    ) {
        let reason = reason.into();
        warn!(
            target_kind = %target,
            record,
            dependency,
            reason = %reason,
            "reference unresolved"
        );
        self.issues.push(Issue {
            kind: IssueKind::UnresolvedOptionalReference,
            target,
            record: record.to_string(),
            dependency: dependency.to_string(),
            message: reason,
        });
    }

    /// Record an ambiguous match; the reference is kept per `policy`.
    pub fn ambiguous(
        &mut self,
        target: EntityKind,
        record: &str,
        dependency: &str,
        matches: usize,
        policy: AmbiguityPolicy,
    ) {
        self.issues.push(Issue {
            kind: IssueKind::AmbiguousReference,
            target,
            record: record.to_string(),
            dependency: dependency.to_string(),
            message: format!("{matches} matches, {policy}"),
        });
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }

    /// Fold another pass into this one.
    pub fn merge(&mut self, other: TransformReport) {
        self.produced += other.produced;
        self.skipped += other.skipped;
        self.fallbacks += other.fallbacks;
        self.issues.extend(other.issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_counts_and_describes() {
        let mut report = TransformReport::new();
        report.skip(
            EntityKind::Resource,
            "S1.PLATFORM-X",
            "unitInCharge",
            "no unit named `fg99`",
        );
        report.ambiguous(
            EntityKind::Activity,
            "P-1",
            "contact",
            2,
            AmbiguityPolicy::UseAll,
        );

        assert_eq!(report.skipped, 1);
        assert_eq!(report.count(IssueKind::AmbiguousReference), 1);
        insta::assert_snapshot!(
            report.issues[0].to_string(),
            @"ExtractedResource `S1.PLATFORM-X` (unitInCharge) unresolved required reference: no unit named `fg99`"
        );
    }

    #[test]
    fn merge_adds_up() {
        let mut total = TransformReport {
            produced: 2,
            ..TransformReport::default()
        };
        let mut other = TransformReport {
            produced: 3,
            fallbacks: 1,
            ..TransformReport::default()
        };
        other.skip(EntityKind::Activity, "P-2", "responsibleUnit", "missing");
        total.merge(other);
        assert_eq!(total.produced, 5);
        assert_eq!(total.fallbacks, 1);
        assert_eq!(total.issues.len(), 1);
    }
}
