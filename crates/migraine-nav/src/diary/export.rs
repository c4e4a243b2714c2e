//! CSV interchange for sharing a diary with a clinician or moving it between devices.

use std::io::Read;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{DiaryError, EntryDraft, HeadRegion, MedicationDose, MigraineEntry, ReliefLevel};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const LIST_SEPARATOR: char = ';';
const MEDICATION_FIELD_SEPARATOR: char = '|';
const ESCAPE: char = '\\';

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Row { line: usize, message: String },
    Diary(DiaryError),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Csv(err) => write!(f, "invalid diary CSV data: {err}"),
            ExportError::Row { line, message } => write!(f, "diary CSV line {line}: {message}"),
            ExportError::Diary(err) => write!(f, "could not apply diary CSV: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Csv(err) => Some(err),
            ExportError::Row { .. } => None,
            ExportError::Diary(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<DiaryError> for ExportError {
    fn from(err: DiaryError) -> Self {
        Self::Diary(err)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DiaryRow {
    #[serde(rename = "Started At")]
    started_at: String,
    #[serde(rename = "Severity")]
    severity: u8,
    #[serde(rename = "Duration Hours")]
    duration_hours: f32,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Symptoms", default)]
    symptoms: String,
    #[serde(rename = "Triggers", default)]
    triggers: String,
    #[serde(rename = "Medications", default)]
    medications: String,
    #[serde(rename = "Notes", default, deserialize_with = "empty_string_as_default")]
    notes: String,
}

impl DiaryRow {
    fn from_entry(entry: &MigraineEntry) -> Self {
        let medications = entry
            .medications
            .iter()
            .map(|medication| {
                let relief = medication.relief.map(ReliefLevel::key).unwrap_or_default();
                format!(
                    "{}{sep}{}{sep}{}",
                    escape(&medication.name),
                    escape(&medication.dose),
                    relief,
                    sep = MEDICATION_FIELD_SEPARATOR
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            started_at: entry.started_at.format(TIMESTAMP_FORMAT).to_string(),
            severity: entry.severity,
            duration_hours: entry.duration_hours,
            region: entry.region.label().to_string(),
            symptoms: join_list(&entry.symptoms),
            triggers: join_list(&entry.triggers),
            medications,
            notes: entry.notes.clone(),
        }
    }

    fn into_draft(self, line: usize) -> Result<EntryDraft, ExportError> {
        let row_error = |message: String| ExportError::Row { line, message };

        let started_at = NaiveDateTime::parse_from_str(self.started_at.trim(), TIMESTAMP_FORMAT)
            .map_err(|err| row_error(format!("invalid start time '{}': {err}", self.started_at)))?;
        let region = HeadRegion::parse(&self.region)
            .ok_or_else(|| row_error(format!("unknown head region '{}'", self.region)))?;

        let mut medications = Vec::new();
        for cell in split_unescaped(&self.medications, LIST_SEPARATOR)
            .into_iter()
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
        {
            let mut fields = split_unescaped(cell, MEDICATION_FIELD_SEPARATOR)
                .into_iter()
                .map(|field| unescape(field.trim()));
            let name = fields.next().unwrap_or_default();
            let dose = fields.next().unwrap_or_default();
            let relief = match fields.next().filter(|value| !value.is_empty()) {
                Some(raw) => Some(
                    ReliefLevel::parse(&raw)
                        .ok_or_else(|| row_error(format!("unknown relief level '{raw}'")))?,
                ),
                None => None,
            };
            medications.push(MedicationDose { name, dose, relief });
        }

        Ok(EntryDraft {
            started_at,
            severity: self.severity,
            duration_hours: self.duration_hours,
            region,
            symptoms: split_list(&self.symptoms),
            triggers: split_list(&self.triggers),
            medications,
            notes: self.notes,
        })
    }
}

/// Backslash-escapes the escape character and both separators.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ESCAPE | LIST_SEPARATOR | MEDICATION_FIELD_SEPARATOR) {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn unescape(value: &str) -> String {
    let mut plain = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(next) = chars.next() {
                plain.push(next);
            }
        } else {
            plain.push(c);
        }
    }
    plain
}

/// Splits on separators not preceded by an escape; escapes stay in the pieces.
fn split_unescaped(cell: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (index, c) in cell.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == separator {
            pieces.push(&cell[start..index]);
            start = index + c.len_utf8();
        }
    }
    pieces.push(&cell[start..]);
    pieces
}

fn join_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| escape(value))
        .collect::<Vec<_>>()
        .join("; ")
}

fn split_list(cell: &str) -> Vec<String> {
    split_unescaped(cell, LIST_SEPARATOR)
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(unescape)
        .collect()
}

fn empty_string_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

pub(crate) fn write_csv(entries: &[MigraineEntry]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in entries {
        writer.serialize(DiaryRow::from_entry(entry))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(csv::Error::from(err.into_error())))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Row {
        line: 0,
        message: err.to_string(),
    })
}

pub(crate) fn read_csv<R: Read>(reader: R) -> Result<Vec<EntryDraft>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut drafts = Vec::new();
    for (index, record) in csv_reader.deserialize::<DiaryRow>().enumerate() {
        // Header is line 1.
        drafts.push(record?.into_draft(index + 2)?);
    }
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::domain::{EntryId, UserId};
    use chrono::NaiveDate;

    fn entry() -> MigraineEntry {
        MigraineEntry {
            id: EntryId("mig-000042".to_string()),
            user_id: UserId("user-1".to_string()),
            started_at: NaiveDate::from_ymd_opt(2025, 2, 11)
                .and_then(|date| date.and_hms_opt(14, 5, 0))
                .expect("valid timestamp"),
            severity: 8,
            duration_hours: 12.0,
            region: HeadRegion::BehindEyes,
            symptoms: vec!["Nausea".to_string(), "Aura".to_string()],
            triggers: vec!["Red wine".to_string()],
            medications: vec![
                MedicationDose {
                    name: "Rizatriptan".to_string(),
                    dose: "10 mg".to_string(),
                    relief: Some(ReliefLevel::Complete),
                },
                MedicationDose {
                    name: "Ibuprofen".to_string(),
                    dose: String::new(),
                    relief: None,
                },
            ],
            notes: "Woke up with it, \"pounding\"".to_string(),
        }
    }

    #[test]
    fn export_writes_header_and_flattened_lists() {
        let csv = write_csv(&[entry()]).expect("csv written");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Started At,Severity,Duration Hours,Region,Symptoms,Triggers,Medications,Notes")
        );
        let row = lines.next().expect("data row");
        assert!(row.starts_with("2025-02-11 14:05,8,12.0,Behind the eyes,Nausea; Aura,Red wine,"));
        assert!(row.contains("Rizatriptan|10 mg|complete; Ibuprofen||"));
    }

    #[test]
    fn exported_rows_read_back_as_drafts() {
        let csv = write_csv(&[entry()]).expect("csv written");
        let drafts = read_csv(csv.as_bytes()).expect("csv parsed");
        assert_eq!(drafts.len(), 1);
        let draft = &drafts[0];
        assert_eq!(draft.region, HeadRegion::BehindEyes);
        assert_eq!(draft.medications[0].relief, Some(ReliefLevel::Complete));
        assert_eq!(draft.medications[1].relief, None);
        assert_eq!(draft.notes, "Woke up with it, \"pounding\"");

        let mut tricky = entry();
        tricky.symptoms = vec!["Nausea; vomiting".to_string(), "Aura".to_string()];
        tricky.triggers = vec!["C:\\night shift".to_string()];
        tricky.medications[0].dose = "50 mg | repeat after 2h".to_string();
        let csv = write_csv(&[tricky]).expect("csv written");
        let drafts = read_csv(csv.as_bytes()).expect("csv parsed");
        let draft = &drafts[0];
        assert_eq!(draft.symptoms, vec!["Nausea; vomiting".to_string(), "Aura".to_string()]);
        assert_eq!(draft.triggers, vec!["C:\\night shift".to_string()]);
        assert_eq!(draft.medications.len(), 2);
        assert_eq!(draft.medications[0].name, "Rizatriptan");
        assert_eq!(draft.medications[0].dose, "50 mg | repeat after 2h");
        assert_eq!(draft.medications[0].relief, Some(ReliefLevel::Complete));
    }

    #[test]
    fn import_reports_line_of_bad_region() {
        let csv = "Started At,Severity,Duration Hours,Region,Symptoms,Triggers,Medications,Notes\n\
                   2025-02-11 14:05,6,4,Frontal,,,,\n\
                   2025-02-12 09:00,5,3,Elbow,,,,\n";
        let err = read_csv(csv.as_bytes()).expect_err("bad region rejected");
        assert!(matches!(err, ExportError::Row { line: 3, .. }), "{err}");
    }
}
