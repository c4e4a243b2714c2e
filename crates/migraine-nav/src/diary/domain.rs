use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Longest episode the diary accepts, one week.
pub const MAX_DURATION_HOURS: f32 = 168.0;

/// Identifier wrapper for diary entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub String);

/// Identifier wrapper for diary owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Where the pain was felt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadRegion {
    Frontal,
    LeftTemporal,
    RightTemporal,
    BilateralTemporal,
    Occipital,
    Vertex,
    BehindEyes,
    WholeHead,
    Neck,
}

impl HeadRegion {
    pub const fn label(self) -> &'static str {
        match self {
            HeadRegion::Frontal => "Frontal",
            HeadRegion::LeftTemporal => "Left temporal",
            HeadRegion::RightTemporal => "Right temporal",
            HeadRegion::BilateralTemporal => "Both temples",
            HeadRegion::Occipital => "Occipital",
            HeadRegion::Vertex => "Top of head",
            HeadRegion::BehindEyes => "Behind the eyes",
            HeadRegion::WholeHead => "Whole head",
            HeadRegion::Neck => "Neck",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let region = match normalized.as_str() {
            "frontal" | "forehead" => HeadRegion::Frontal,
            "left_temporal" => HeadRegion::LeftTemporal,
            "right_temporal" => HeadRegion::RightTemporal,
            "bilateral_temporal" | "both_temples" => HeadRegion::BilateralTemporal,
            "occipital" => HeadRegion::Occipital,
            "vertex" | "top_of_head" => HeadRegion::Vertex,
            "behind_eyes" | "behind_the_eyes" => HeadRegion::BehindEyes,
            "whole_head" => HeadRegion::WholeHead,
            "neck" => HeadRegion::Neck,
            _ => return None,
        };
        Some(region)
    }

    pub const fn ordered() -> [HeadRegion; 9] {
        [
            HeadRegion::Frontal,
            HeadRegion::LeftTemporal,
            HeadRegion::RightTemporal,
            HeadRegion::BilateralTemporal,
            HeadRegion::Occipital,
            HeadRegion::Vertex,
            HeadRegion::BehindEyes,
            HeadRegion::WholeHead,
            HeadRegion::Neck,
        ]
    }
}

/// How much a dose helped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliefLevel {
    None,
    Mild,
    Moderate,
    Complete,
}

impl ReliefLevel {
    pub const fn score(self) -> u8 {
        match self {
            ReliefLevel::None => 0,
            ReliefLevel::Mild => 1,
            ReliefLevel::Moderate => 2,
            ReliefLevel::Complete => 3,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            ReliefLevel::None => "none",
            ReliefLevel::Mild => "mild",
            ReliefLevel::Moderate => "moderate",
            ReliefLevel::Complete => "complete",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Some(ReliefLevel::None),
            "mild" => Some(ReliefLevel::Mild),
            "moderate" => Some(ReliefLevel::Moderate),
            "complete" => Some(ReliefLevel::Complete),
            _ => None,
        }
    }
}

/// Acute or rescue medication taken during an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDose {
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub relief: Option<ReliefLevel>,
}

/// Unvalidated entry payload as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub started_at: NaiveDateTime,
    pub severity: u8,
    pub duration_hours: f32,
    pub region: HeadRegion,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub medications: Vec<MedicationDose>,
    #[serde(default)]
    pub notes: String,
}

impl EntryDraft {
    /// Checks ranges and normalizes free-text lists (trimmed, blanks dropped, deduplicated).
    pub fn validate(mut self) -> Result<Self, DiaryError> {
        if !(1..=10).contains(&self.severity) {
            return Err(DiaryError::Invalid(format!(
                "severity must be between 1 and 10 (got {})",
                self.severity
            )));
        }
        if !self.duration_hours.is_finite()
            || self.duration_hours <= 0.0
            || self.duration_hours > MAX_DURATION_HOURS
        {
            return Err(DiaryError::Invalid(format!(
                "duration must be greater than 0 and at most {MAX_DURATION_HOURS} hours"
            )));
        }
        if self
            .medications
            .iter()
            .any(|medication| medication.name.trim().is_empty())
        {
            return Err(DiaryError::Invalid(
                "medication name must not be blank".to_string(),
            ));
        }

        self.symptoms = normalize_tags(self.symptoms);
        self.triggers = normalize_tags(self.triggers);
        for medication in &mut self.medications {
            medication.name = medication.name.trim().to_string();
            medication.dose = medication.dose.trim().to_string();
        }
        self.notes = self.notes.trim().to_string();
        Ok(self)
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !normalized
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(tag))
        {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

/// A logged migraine episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigraineEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub started_at: NaiveDateTime,
    pub severity: u8,
    pub duration_hours: f32,
    pub region: HeadRegion,
    pub symptoms: Vec<String>,
    pub triggers: Vec<String>,
    pub medications: Vec<MedicationDose>,
    pub notes: String,
}

impl MigraineEntry {
    pub fn from_draft(id: EntryId, user_id: UserId, draft: EntryDraft) -> Self {
        Self {
            id,
            user_id,
            started_at: draft.started_at,
            severity: draft.severity,
            duration_hours: draft.duration_hours,
            region: draft.region,
            symptoms: draft.symptoms,
            triggers: draft.triggers,
            medications: draft.medications,
            notes: draft.notes,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.started_at.date()
    }

    pub fn has_symptom(&self, needle: &str) -> bool {
        self.symptoms
            .iter()
            .any(|symptom| symptom.to_ascii_lowercase().contains(needle))
    }
}

/// Error enumeration for diary operations.
#[derive(Debug, thiserror::Error)]
pub enum DiaryError {
    #[error("invalid entry: {0}")]
    Invalid(String),
    #[error("entry not found")]
    NotFound,
    #[error("entry already exists")]
    Conflict,
    #[error("diary storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EntryDraft {
        EntryDraft {
            started_at: NaiveDate::from_ymd_opt(2025, 3, 4)
                .and_then(|date| date.and_hms_opt(7, 30, 0))
                .expect("valid timestamp"),
            severity: 7,
            duration_hours: 6.5,
            region: HeadRegion::LeftTemporal,
            symptoms: vec![" Nausea ".to_string(), "nausea".to_string(), String::new()],
            triggers: vec!["Poor sleep".to_string()],
            medications: vec![MedicationDose {
                name: " Sumatriptan ".to_string(),
                dose: "50 mg".to_string(),
                relief: Some(ReliefLevel::Moderate),
            }],
            notes: String::new(),
        }
    }

    #[test]
    fn validate_normalizes_tags() {
        let draft = draft().validate().expect("draft is valid");
        assert_eq!(draft.symptoms, vec!["Nausea".to_string()]);
        assert_eq!(draft.medications[0].name, "Sumatriptan");
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut zero_severity = draft();
        zero_severity.severity = 0;
        assert!(matches!(zero_severity.validate(), Err(DiaryError::Invalid(_))));

        let mut long = draft();
        long.duration_hours = 169.0;
        assert!(matches!(long.validate(), Err(DiaryError::Invalid(_))));

        let mut blank_med = draft();
        blank_med.medications[0].name = "  ".to_string();
        assert!(matches!(blank_med.validate(), Err(DiaryError::Invalid(_))));
    }

    #[test]
    fn region_parse_accepts_labels_and_keys() {
        assert_eq!(HeadRegion::parse("Behind the eyes"), Some(HeadRegion::BehindEyes));
        assert_eq!(HeadRegion::parse("left-temporal"), Some(HeadRegion::LeftTemporal));
        assert_eq!(HeadRegion::parse("jaw"), None);
    }
}
