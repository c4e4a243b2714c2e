use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::{filter_range, round1, DateRange};
use crate::diary::{HeadRegion, MigraineEntry};

const TOP_TAG_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub range: DateRange,
    pub episodes: usize,
    pub migraine_days: usize,
    pub average_severity: f64,
    pub average_duration_hours: f64,
    pub months: Vec<MonthBucket>,
    pub top_triggers: Vec<TagCount>,
    pub top_symptoms: Vec<TagCount>,
    pub regions: Vec<RegionShare>,
    pub medications: Vec<MedicationUsage>,
    pub weekdays: Vec<WeekdayCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub month: String,
    pub episodes: usize,
    pub average_severity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionShare {
    pub region: HeadRegion,
    pub label: &'static str,
    pub episodes: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationUsage {
    pub name: String,
    pub doses: usize,
    pub days_used: usize,
    /// Mean relief on a 0 (none) to 3 (complete) scale over rated doses.
    pub average_relief: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: &'static str,
    pub episodes: usize,
}

pub fn trend_summary(entries: &[MigraineEntry], range: &DateRange) -> TrendSummary {
    let entries = filter_range(entries, range);
    let episodes = entries.len();

    let migraine_days = entries
        .iter()
        .map(MigraineEntry::date)
        .collect::<BTreeSet<NaiveDate>>()
        .len();

    let average_severity = mean(entries.iter().map(|entry| f64::from(entry.severity)));
    let average_duration_hours =
        mean(entries.iter().map(|entry| f64::from(entry.duration_hours)));

    TrendSummary {
        range: *range,
        episodes,
        migraine_days,
        average_severity,
        average_duration_hours,
        months: month_buckets(&entries),
        top_triggers: top_tags(entries.iter().flat_map(|entry| entry.triggers.iter())),
        top_symptoms: top_tags(entries.iter().flat_map(|entry| entry.symptoms.iter())),
        regions: region_shares(&entries),
        medications: medication_usage(&entries),
        weekdays: weekday_counts(&entries),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        round1(sum / count as f64)
    }
}

fn month_buckets(entries: &[MigraineEntry]) -> Vec<MonthBucket> {
    let mut buckets: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for entry in entries {
        buckets
            .entry(entry.started_at.format("%Y-%m").to_string())
            .or_default()
            .push(entry.severity);
    }

    buckets
        .into_iter()
        .map(|(month, severities)| MonthBucket {
            month,
            episodes: severities.len(),
            average_severity: mean(severities.into_iter().map(f64::from)),
        })
        .collect()
}

/// Case-insensitive counts; the first spelling seen is reported.
fn top_tags<'a>(tags: impl Iterator<Item = &'a String>) -> Vec<TagCount> {
    let mut counts: HashMap<String, TagCount> = HashMap::new();
    for tag in tags {
        counts
            .entry(tag.to_lowercase())
            .or_insert_with(|| TagCount {
                name: tag.clone(),
                count: 0,
            })
            .count += 1;
    }

    let mut ranked: Vec<TagCount> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(TOP_TAG_LIMIT);
    ranked
}

fn region_shares(entries: &[MigraineEntry]) -> Vec<RegionShare> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<HeadRegion, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.region).or_default() += 1;
    }

    HeadRegion::ordered()
        .into_iter()
        .filter_map(|region| {
            counts.get(&region).map(|episodes| RegionShare {
                region,
                label: region.label(),
                episodes: *episodes,
                percent: round1(*episodes as f64 * 100.0 / entries.len() as f64),
            })
        })
        .collect()
}

fn medication_usage(entries: &[MigraineEntry]) -> Vec<MedicationUsage> {
    #[derive(Default)]
    struct Tally {
        name: String,
        doses: usize,
        days: BTreeSet<NaiveDate>,
        relief: Vec<u8>,
    }

    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    for entry in entries {
        for medication in &entry.medications {
            let tally = tallies
                .entry(medication.name.to_lowercase())
                .or_insert_with(|| Tally {
                    name: medication.name.clone(),
                    ..Tally::default()
                });
            tally.doses += 1;
            tally.days.insert(entry.date());
            if let Some(relief) = medication.relief {
                tally.relief.push(relief.score());
            }
        }
    }

    let mut usage: Vec<MedicationUsage> = tallies
        .into_values()
        .map(|tally| MedicationUsage {
            name: tally.name,
            doses: tally.doses,
            days_used: tally.days.len(),
            average_relief: if tally.relief.is_empty() {
                None
            } else {
                Some(mean(tally.relief.into_iter().map(f64::from)))
            },
        })
        .collect();
    usage.sort_by(|a, b| b.doses.cmp(&a.doses).then_with(|| a.name.cmp(&b.name)));
    usage
}

fn weekday_counts(entries: &[MigraineEntry]) -> Vec<WeekdayCount> {
    const WEEK: [(Weekday, &str); 7] = [
        (Weekday::Mon, "Mon"),
        (Weekday::Tue, "Tue"),
        (Weekday::Wed, "Wed"),
        (Weekday::Thu, "Thu"),
        (Weekday::Fri, "Fri"),
        (Weekday::Sat, "Sat"),
        (Weekday::Sun, "Sun"),
    ];

    WEEK.into_iter()
        .map(|(weekday, label)| WeekdayCount {
            weekday: label,
            episodes: entries
                .iter()
                .filter(|entry| entry.started_at.weekday() == weekday)
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::ReliefLevel;
    use crate::trends::fixtures::{date, dose, entry};

    fn march() -> DateRange {
        DateRange::new(date(2025, 3, 1), date(2025, 4, 30)).expect("valid range")
    }

    #[test]
    fn empty_range_yields_zeroed_summary() {
        let summary = trend_summary(&[], &march());
        assert_eq!(summary.episodes, 0);
        assert_eq!(summary.average_severity, 0.0);
        assert!(summary.months.is_empty());
        assert!(summary.regions.is_empty());
        assert_eq!(summary.weekdays.len(), 7);
    }

    #[test]
    fn summary_aggregates_entries_in_range() {
        let mut first = entry("a", date(2025, 3, 3), 8, 6, 4.0);
        first.triggers = vec!["Stress".to_string(), "Caffeine".to_string()];
        first.symptoms = vec!["Nausea".to_string()];
        first.medications = vec![dose("Sumatriptan", Some(ReliefLevel::Complete))];

        let mut second = entry("b", date(2025, 3, 3), 20, 8, 3.0);
        second.triggers = vec!["stress".to_string()];
        second.medications = vec![dose("sumatriptan", Some(ReliefLevel::Mild))];

        let mut third = entry("c", date(2025, 4, 10), 9, 5, 8.5);
        third.region = HeadRegion::Occipital;
        third.triggers = vec!["Weather".to_string()];
        third.medications = vec![dose("Ibuprofen", None)];

        let outside = entry("z", date(2025, 5, 1), 9, 10, 30.0);

        let summary = trend_summary(&[first, second, third, outside], &march());

        assert_eq!(summary.episodes, 3);
        assert_eq!(summary.migraine_days, 2);
        assert_eq!(summary.average_severity, 6.3);
        assert_eq!(summary.average_duration_hours, 5.2);

        assert_eq!(summary.months.len(), 2);
        assert_eq!(summary.months[0].month, "2025-03");
        assert_eq!(summary.months[0].average_severity, 7.0);

        assert_eq!(summary.top_triggers[0], TagCount { name: "Stress".to_string(), count: 2 });
        assert_eq!(summary.top_triggers[1].name, "Caffeine");

        assert_eq!(summary.regions[0].region, HeadRegion::Frontal);
        assert_eq!(summary.regions[0].percent, 66.7);

        let suma = &summary.medications[0];
        assert_eq!(suma.name, "Sumatriptan");
        assert_eq!(suma.doses, 2);
        assert_eq!(suma.days_used, 1);
        assert_eq!(suma.average_relief, Some(2.0));
        assert_eq!(summary.medications[1].average_relief, None);

        // 2025-03-03 was a Monday.
        assert_eq!(summary.weekdays[0].episodes, 2);
    }
}
