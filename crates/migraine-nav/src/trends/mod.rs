//! Calendar and trend aggregation over diary entries.

mod calendar;
mod summary;

pub use calendar::{calendar_month, CalendarDay};
pub use summary::{
    trend_summary, MedicationUsage, MonthBucket, RegionShare, TagCount, TrendSummary,
    WeekdayCount,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::diary::MigraineEntry;

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("date range start {from} is after end {to}")]
pub struct InvalidDateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, InvalidDateRange> {
        if from > to {
            return Err(InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

pub fn filter_range(entries: &[MigraineEntry], range: &DateRange) -> Vec<MigraineEntry> {
    entries
        .iter()
        .filter(|entry| range.contains(entry.date()))
        .cloned()
        .collect()
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::diary::{EntryId, HeadRegion, MedicationDose, MigraineEntry, ReliefLevel, UserId};

    pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    pub(crate) fn entry(
        id: &str,
        day: NaiveDate,
        hour: u32,
        severity: u8,
        duration_hours: f32,
    ) -> MigraineEntry {
        MigraineEntry {
            id: EntryId(id.to_string()),
            user_id: UserId("user-1".to_string()),
            started_at: day.and_hms_opt(hour, 0, 0).expect("valid time"),
            severity,
            duration_hours,
            region: HeadRegion::Frontal,
            symptoms: Vec::new(),
            triggers: Vec::new(),
            medications: Vec::new(),
            notes: String::new(),
        }
    }

    pub(crate) fn dose(name: &str, relief: Option<ReliefLevel>) -> MedicationDose {
        MedicationDose {
            name: name.to_string(),
            dose: String::new(),
            relief,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{date, entry};
    use super::*;

    #[test]
    fn range_rejects_inverted_bounds() {
        let err = DateRange::new(date(2025, 3, 2), date(2025, 3, 1)).expect_err("inverted");
        assert_eq!(err.from, date(2025, 3, 2));
    }

    #[test]
    fn filter_range_is_inclusive() {
        let entries = vec![
            entry("a", date(2025, 2, 28), 23, 5, 2.0),
            entry("b", date(2025, 3, 1), 0, 5, 2.0),
            entry("c", date(2025, 3, 31), 23, 5, 2.0),
            entry("d", date(2025, 4, 1), 0, 5, 2.0),
        ];
        let range = DateRange::new(date(2025, 3, 1), date(2025, 3, 31)).expect("valid");
        let ids: Vec<_> = filter_range(&entries, &range)
            .into_iter()
            .map(|entry| entry.id.0)
            .collect();
        assert_eq!(ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(range.days(), 31);
    }
}
