use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::diary::MigraineEntry;

/// One cell of the monthly calendar view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub episodes: usize,
    pub max_severity: u8,
    pub total_duration_hours: f32,
}

/// Every day of the month, including days without episodes. `None` for an invalid month.
pub fn calendar_month(entries: &[MigraineEntry], year: i32, month: u32) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let mut by_day: BTreeMap<NaiveDate, CalendarDay> = BTreeMap::new();
    let mut cursor = first;
    while cursor.month() == month {
        by_day.insert(
            cursor,
            CalendarDay {
                date: cursor,
                episodes: 0,
                max_severity: 0,
                total_duration_hours: 0.0,
            },
        );
        cursor = cursor.succ_opt()?;
    }

    for entry in entries {
        if let Some(day) = by_day.get_mut(&entry.date()) {
            day.episodes += 1;
            day.max_severity = day.max_severity.max(entry.severity);
            day.total_duration_hours += entry.duration_hours;
        }
    }

    Some(by_day.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends::fixtures::{date, entry};

    #[test]
    fn february_leap_year_has_twenty_nine_cells() {
        let days = calendar_month(&[], 2024, 2).expect("valid month");
        assert_eq!(days.len(), 29);
        assert!(days.iter().all(|day| day.episodes == 0 && day.max_severity == 0));
    }

    #[test]
    fn episodes_on_the_same_day_are_combined() {
        let entries = vec![
            entry("a", date(2025, 3, 4), 6, 4, 2.0),
            entry("b", date(2025, 3, 4), 18, 8, 5.5),
            entry("c", date(2025, 4, 4), 18, 9, 1.0),
        ];
        let days = calendar_month(&entries, 2025, 3).expect("valid month");
        let fourth = &days[3];
        assert_eq!(fourth.date, date(2025, 3, 4));
        assert_eq!(fourth.episodes, 2);
        assert_eq!(fourth.max_severity, 8);
        assert_eq!(fourth.total_duration_hours, 7.5);
        assert_eq!(days.iter().map(|day| day.episodes).sum::<usize>(), 2);
    }

    #[test]
    fn invalid_month_yields_none() {
        assert!(calendar_month(&[], 2025, 13).is_none());
    }
}
