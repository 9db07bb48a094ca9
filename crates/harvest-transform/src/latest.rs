//! Latest-version selection for records delivered in several versions.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::records::SampleRecord;

/// A record that is one version among several sharing a natural key.
pub trait Versioned {
    fn version_key(&self) -> String;

    /// Effective date; unparsable or missing dates rank below every date.
    fn version_date(&self) -> Option<NaiveDate>;

    /// Secondary ordering for records with the same date.
    fn run_id(&self) -> u64;
}

impl Versioned for SampleRecord {
    fn version_key(&self) -> String {
        self.natural_key()
    }

    fn version_date(&self) -> Option<NaiveDate> {
        self.version()
    }

    fn run_id(&self) -> u64 {
        self.run_id
    }
}

/// Keep only the latest version per natural key.
///
/// The latest is the one with the greatest date, then the greatest run id;
/// on a full tie the first one encountered stays. Output keeps the order in
/// which each key was first seen.
pub fn keep_latest<R: Versioned>(records: impl IntoIterator<Item = R>) -> Vec<R> {
    let mut slots: Vec<R> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in records {
        let key = record.version_key();
        match positions.get(&key) {
            Some(&position) => {
                let current = &slots[position];
                let newer = (record.version_date(), record.run_id())
                    > (current.version_date(), current.run_id());
                if newer {
                    slots[position] = record;
                }
            }
            None => {
                positions.insert(key, slots.len());
                slots.push(record);
            }
        }
    }
    slots
}
