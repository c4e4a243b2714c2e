//! Rule-based medical alert checklist over recent diary entries.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::diary::MigraineEntry;

const WINDOW_DAYS: i64 = 30;
const ESCALATION_WINDOW_DAYS: i64 = 7;
const CHRONIC_MIGRAINE_DAYS: usize = 15;
const STATUS_MIGRAINOSUS_HOURS: f32 = 72.0;
const TRIPTAN_OVERUSE_DAYS: usize = 10;
const ANALGESIC_OVERUSE_DAYS: usize = 15;
const ESCALATION_DELTA: f64 = 2.0;

const RED_FLAG_SYMPTOMS: [&str; 9] = [
    "worst headache",
    "thunderclap",
    "confusion",
    "weakness",
    "numbness",
    "slurred speech",
    "vision loss",
    "fever",
    "stiff neck",
];

const TRIPTANS_AND_ERGOTS: [&str; 10] = [
    "sumatriptan",
    "rizatriptan",
    "zolmitriptan",
    "eletriptan",
    "naratriptan",
    "almotriptan",
    "frovatriptan",
    "imitrex",
    "maxalt",
    "dihydroergotamine",
];

const SIMPLE_ANALGESICS: [&str; 8] = [
    "ibuprofen",
    "naproxen",
    "acetaminophen",
    "paracetamol",
    "aspirin",
    "excedrin",
    "tylenol",
    "advil",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            AlertSeverity::Critical => "Seek care now",
            AlertSeverity::Warning => "Talk to your doctor",
            AlertSeverity::Info => "Worth watching",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalAlert {
    pub code: &'static str,
    pub severity: AlertSeverity,
    pub severity_label: &'static str,
    pub title: &'static str,
    pub detail: String,
}

impl MedicalAlert {
    fn new(code: &'static str, severity: AlertSeverity, title: &'static str, detail: String) -> Self {
        Self {
            code,
            severity,
            severity_label: severity.label(),
            title,
            detail,
        }
    }
}

/// Evaluates the checklist for the 30 days ending at `today`.
///
/// When `muted` is set only critical alerts are returned.
pub fn evaluate_alerts(entries: &[MigraineEntry], today: NaiveDate, muted: bool) -> Vec<MedicalAlert> {
    let window_start = today - Duration::days(WINDOW_DAYS - 1);
    let recent: Vec<&MigraineEntry> = entries
        .iter()
        .filter(|entry| entry.date() >= window_start && entry.date() <= today)
        .collect();

    let mut alerts = Vec::new();

    let red_flags: BTreeSet<&str> = recent
        .iter()
        .flat_map(|entry| {
            RED_FLAG_SYMPTOMS
                .iter()
                .copied()
                .filter(move |flag| entry.has_symptom(flag))
        })
        .collect();
    if !red_flags.is_empty() {
        alerts.push(MedicalAlert::new(
            "red_flag_symptoms",
            AlertSeverity::Critical,
            "Red-flag symptoms reported",
            format!(
                "You logged {} with a recent headache. These can signal something other than migraine; seek urgent care if they are new or unusual for you.",
                red_flags.into_iter().collect::<Vec<_>>().join(", ")
            ),
        ));
    }

    if let Some(longest) = recent
        .iter()
        .filter(|entry| entry.duration_hours > STATUS_MIGRAINOSUS_HOURS)
        .max_by(|a, b| a.duration_hours.total_cmp(&b.duration_hours))
    {
        alerts.push(MedicalAlert::new(
            "status_migrainosus",
            AlertSeverity::Critical,
            "Attack lasting more than 72 hours",
            format!(
                "An attack starting {} lasted {:.0} hours. Attacks longer than 72 hours need prompt medical treatment.",
                longest.date(),
                longest.duration_hours
            ),
        ));
    }

    let migraine_days = recent
        .iter()
        .map(|entry| entry.date())
        .collect::<BTreeSet<_>>()
        .len();
    if migraine_days >= CHRONIC_MIGRAINE_DAYS {
        alerts.push(MedicalAlert::new(
            "chronic_pattern",
            AlertSeverity::Warning,
            "Chronic migraine pattern",
            format!(
                "{migraine_days} headache days in the last {WINDOW_DAYS} days meets the threshold for chronic migraine; preventive treatment may be appropriate."
            ),
        ));
    }

    let triptan_days = medication_days(&recent, &TRIPTANS_AND_ERGOTS);
    let analgesic_days = medication_days(&recent, &SIMPLE_ANALGESICS);
    if triptan_days >= TRIPTAN_OVERUSE_DAYS || analgesic_days >= ANALGESIC_OVERUSE_DAYS {
        alerts.push(MedicalAlert::new(
            "medication_overuse",
            AlertSeverity::Warning,
            "Possible medication overuse",
            format!(
                "Acute medication on {triptan_days} day(s) for triptans/ergots and {analgesic_days} day(s) for simple analgesics in the last {WINDOW_DAYS} days. Frequent use can cause rebound headaches."
            ),
        ));
    }

    if let Some((previous, current)) = escalation(&recent, today) {
        alerts.push(MedicalAlert::new(
            "escalating_severity",
            AlertSeverity::Info,
            "Severity is rising",
            format!(
                "Average severity rose from {previous:.1} to {current:.1} over the last two weeks."
            ),
        ));
    }

    if muted {
        alerts.retain(|alert| alert.severity == AlertSeverity::Critical);
    }
    alerts.sort_by_key(|alert| alert.severity);
    alerts
}

fn medication_days(entries: &[&MigraineEntry], names: &[&str]) -> usize {
    entries
        .iter()
        .filter(|entry| {
            entry.medications.iter().any(|medication| {
                let name = medication.name.to_ascii_lowercase();
                names.iter().any(|candidate| name.contains(candidate))
            })
        })
        .map(|entry| entry.date())
        .collect::<BTreeSet<_>>()
        .len()
}

fn escalation(entries: &[&MigraineEntry], today: NaiveDate) -> Option<(f64, f64)> {
    let current_start = today - Duration::days(ESCALATION_WINDOW_DAYS - 1);
    let previous_start = current_start - Duration::days(ESCALATION_WINDOW_DAYS);

    let average = |from: NaiveDate, to: NaiveDate| -> Option<f64> {
        let severities: Vec<f64> = entries
            .iter()
            .filter(|entry| entry.date() >= from && entry.date() <= to)
            .map(|entry| f64::from(entry.severity))
            .collect();
        if severities.is_empty() {
            None
        } else {
            Some(severities.iter().sum::<f64>() / severities.len() as f64)
        }
    };

    let current = average(current_start, today)?;
    let previous = average(previous_start, current_start - Duration::days(1))?;
    (current - previous >= ESCALATION_DELTA).then_some((previous, current))
}
