//! Global record filter.
//!
//! Drops raw records by configured deny-lists before they are transformed.
//! Checks run in a fixed order and stop at the first hit, which becomes the
//! logged reason. Every drop is logged at info level on the
//! `harvest::filter` target; that log is the audit trail for records
//! missing from the catalog.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use harvest_model::Identifier;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Log target of filter audit lines.
pub const FILTER_TARGET: &str = "harvest::filter";

/// Deny-lists applied to raw records.
///
/// Partner and unit checks are exact, case-sensitive membership tests. Label
/// checks are case-sensitive substring tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterPolicy {
    pub skip_partners: BTreeSet<String>,
    pub skip_units: BTreeSet<String>,
    /// Records starting or ending strictly before this year are dropped.
    pub skip_years_before: Option<i32>,
    pub skip_labels: BTreeSet<String>,
}

/// Accessors the filter needs from a raw record.
pub trait FilterableRecord {
    /// Same value the record's entity will carry as `identifierInPrimarySource`.
    fn identifier_in_primary_source(&self) -> Option<Cow<'_, str>>;

    fn partners(&self) -> Vec<&str> {
        Vec::new()
    }

    fn units(&self) -> Vec<&str> {
        Vec::new()
    }

    fn start_year(&self) -> Option<i32> {
        None
    }

    fn end_year(&self) -> Option<i32> {
        None
    }

    fn label(&self) -> Option<&str> {
        None
    }
}

impl<R: FilterableRecord + ?Sized> FilterableRecord for &R {
    fn identifier_in_primary_source(&self) -> Option<Cow<'_, str>> {
        (**self).identifier_in_primary_source()
    }

    fn partners(&self) -> Vec<&str> {
        (**self).partners()
    }

    fn units(&self) -> Vec<&str> {
        (**self).units()
    }

    fn start_year(&self) -> Option<i32> {
        (**self).start_year()
    }

    fn end_year(&self) -> Option<i32> {
        (**self).end_year()
    }

    fn label(&self) -> Option<&str> {
        (**self).label()
    }
}

/// Why a record was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterReason {
    Partner(String),
    Unit(String),
    StartYear { year: i32, cutoff: i32 },
    EndYear { year: i32, cutoff: i32 },
    Label(String),
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterReason::Partner(partner) => write!(f, "partner `{partner}` in skip_partners"),
            FilterReason::Unit(unit) => write!(f, "unit `{unit}` in skip_units"),
            FilterReason::StartYear { year, cutoff } => {
                write!(f, "start year {year} before {cutoff}")
            }
            FilterReason::EndYear { year, cutoff } => {
                write!(f, "end year {year} before {cutoff}")
            }
            FilterReason::Label(label) => write!(f, "label contains `{label}` from skip_labels"),
        }
    }
}

impl FilterPolicy {
    /// The first check `record` fails, if any.
    pub fn check<R: FilterableRecord + ?Sized>(&self, record: &R) -> Option<FilterReason> {
        if let Some(partner) = record
            .partners()
            .into_iter()
            .find(|partner| self.skip_partners.contains(*partner))
        {
            return Some(FilterReason::Partner(partner.to_string()));
        }
        if let Some(unit) = record
            .units()
            .into_iter()
            .find(|unit| self.skip_units.contains(*unit))
        {
            return Some(FilterReason::Unit(unit.to_string()));
        }
        if let Some(cutoff) = self.skip_years_before {
            if let Some(year) = record.start_year().filter(|year| *year < cutoff) {
                return Some(FilterReason::StartYear { year, cutoff });
            }
            if let Some(year) = record.end_year().filter(|year| *year < cutoff) {
                return Some(FilterReason::EndYear { year, cutoff });
            }
        }
        if let Some(label) = record.label()
            && let Some(skip) = self.skip_labels.iter().find(|skip| label.contains(skip.as_str()))
        {
            return Some(FilterReason::Label(skip.clone()));
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.skip_partners.is_empty()
            && self.skip_units.is_empty()
            && self.skip_years_before.is_none()
            && self.skip_labels.is_empty()
    }
}

/// Lazily filter `records`, keeping their relative order.
///
/// Use `by_ref()` to read [`Filtered::dropped`] after consuming the records.
pub fn filter<'a, I>(
    records: I,
    policy: &'a FilterPolicy,
    had_primary_source: &'a Identifier,
) -> Filtered<'a, I::IntoIter>
where
    I: IntoIterator,
    I::Item: FilterableRecord,
{
    Filtered {
        records: records.into_iter(),
        policy,
        had_primary_source,
        dropped: 0,
    }
}

/// Iterator returned by [`filter`].
#[derive(Debug)]
pub struct Filtered<'a, I> {
    records: I,
    policy: &'a FilterPolicy,
    had_primary_source: &'a Identifier,
    dropped: usize,
}

impl<I> Filtered<'_, I> {
    /// Records dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<I> Iterator for Filtered<'_, I>
where
    I: Iterator,
    I::Item: FilterableRecord,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.records.by_ref() {
            match self.policy.check(&record) {
                None => return Some(record),
                Some(reason) => {
                    self.dropped += 1;
                    let identifier = record.identifier_in_primary_source();
                    info!(
                        target: FILTER_TARGET,
                        reason = %reason,
                        had_primary_source = %self.had_primary_source,
                        identifier_in_primary_source = identifier.as_deref(),
                        "record filtered"
                    );
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Record {
        id: &'static str,
        partners: Vec<&'static str>,
        units: Vec<&'static str>,
        start: Option<i32>,
        end: Option<i32>,
        label: &'static str,
    }

    impl FilterableRecord for Record {
        fn identifier_in_primary_source(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.id))
        }

        fn partners(&self) -> Vec<&str> {
            self.partners.clone()
        }

        fn units(&self) -> Vec<&str> {
            self.units.clone()
        }

        fn start_year(&self) -> Option<i32> {
            self.start
        }

        fn end_year(&self) -> Option<i32> {
            self.end
        }

        fn label(&self) -> Option<&str> {
            Some(self.label)
        }
    }

    fn policy() -> FilterPolicy {
        FilterPolicy {
            skip_partners: ["Acme Corp".to_string()].into(),
            skip_units: ["FG99".to_string()].into(),
            skip_years_before: Some(1970),
            skip_labels: ["Test".to_string()].into(),
        }
    }

    #[test]
    fn first_failing_check_wins() {
        let record = Record {
            partners: vec!["Other", "Acme Corp"],
            units: vec!["FG99"],
            ..Record::default()
        };
        assert_eq!(
            policy().check(&record),
            Some(FilterReason::Partner("Acme Corp".into()))
        );
    }

    #[test]
    fn year_cutoff_is_exclusive() {
        let at_cutoff = Record {
            start: Some(1970),
            end: Some(1970),
            ..Record::default()
        };
        assert_eq!(policy().check(&at_cutoff), None);

        let before = Record {
            start: Some(1980),
            end: Some(1969),
            ..Record::default()
        };
        assert_eq!(
            policy().check(&before),
            Some(FilterReason::EndYear {
                year: 1969,
                cutoff: 1970
            })
        );
        assert_eq!(policy().check(&Record::default()), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let lower = Record {
            partners: vec!["acme corp"],
            label: "a test project",
            ..Record::default()
        };
        assert_eq!(policy().check(&lower), None);

        let upper = Record {
            label: "Pilot Testlauf",
            ..Record::default()
        };
        insta::assert_snapshot!(
            policy().check(&upper).map(|reason| reason.to_string()).unwrap_or_default(),
            @"label contains `Test` from skip_labels"
        );
    }

    #[test]
    fn filter_preserves_order_and_counts_drops() {
        let records = vec![
            Record {
                id: "a",
                ..Record::default()
            },
            Record {
                id: "b",
                units: vec!["FG99"],
                ..Record::default()
            },
            Record {
                id: "c",
                ..Record::default()
            },
        ];
        let policy = policy();
        let source = Identifier::from_seed("source");
        let mut filtered = filter(&records, &policy, &source);
        let kept: Vec<&str> = filtered.by_ref().map(|record| record.id).collect();
        assert_eq!(kept, vec!["a", "c"]);
        assert_eq!(filtered.dropped(), 1);
    }

    #[test]
    fn empty_policy_drops_nothing() {
        assert!(FilterPolicy::default().is_empty());
        let record = Record {
            partners: vec!["Acme Corp"],
            start: Some(1900),
            ..Record::default()
        };
        assert_eq!(FilterPolicy::default().check(&record), None);
    }
}
