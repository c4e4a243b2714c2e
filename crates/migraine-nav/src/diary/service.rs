use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::domain::{DiaryError, EntryDraft, EntryId, MigraineEntry, UserId};
use super::export::{self, ExportError};
use super::repository::DiaryRepository;
use crate::alerts::{evaluate_alerts, MedicalAlert};
use crate::trends::{calendar_month, filter_range, trend_summary, CalendarDay, DateRange, TrendSummary};

static ENTRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_entry_id() -> EntryId {
    let id = ENTRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EntryId(format!("mig-{id:06}"))
}

/// Per-user diary operations on top of a repository.
pub struct DiaryService<R> {
    repository: Arc<R>,
}

impl<R> DiaryService<R>
where
    R: DiaryRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create(&self, user: &UserId, draft: EntryDraft) -> Result<MigraineEntry, DiaryError> {
        let draft = draft.validate()?;
        let entry = MigraineEntry::from_draft(next_entry_id(), user.clone(), draft);
        let stored = self.repository.insert(entry)?;
        info!(entry_id = %stored.id.0, severity = stored.severity, "diary entry recorded");
        Ok(stored)
    }

    pub fn update(
        &self,
        user: &UserId,
        id: &EntryId,
        draft: EntryDraft,
    ) -> Result<MigraineEntry, DiaryError> {
        let existing = self.get(user, id)?;
        let draft = draft.validate()?;
        let entry = MigraineEntry::from_draft(existing.id, existing.user_id, draft);
        self.repository.update(entry.clone())?;
        Ok(entry)
    }

    pub fn delete(&self, user: &UserId, id: &EntryId) -> Result<(), DiaryError> {
        self.get(user, id)?;
        self.repository.delete(id)
    }

    /// Entries owned by another user are reported as missing.
    pub fn get(&self, user: &UserId, id: &EntryId) -> Result<MigraineEntry, DiaryError> {
        self.repository
            .fetch(id)?
            .filter(|entry| &entry.user_id == user)
            .ok_or(DiaryError::NotFound)
    }

    pub fn list(
        &self,
        user: &UserId,
        range: Option<&DateRange>,
    ) -> Result<Vec<MigraineEntry>, DiaryError> {
        let entries = self.repository.list_for_user(user)?;
        Ok(match range {
            Some(range) => filter_range(&entries, range),
            None => entries,
        })
    }

    pub fn calendar(
        &self,
        user: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarDay>, DiaryError> {
        let entries = self.repository.list_for_user(user)?;
        calendar_month(&entries, year, month)
            .ok_or_else(|| DiaryError::Invalid(format!("{year}-{month:02} is not a valid month")))
    }

    pub fn trends(&self, user: &UserId, range: &DateRange) -> Result<TrendSummary, DiaryError> {
        let entries = self.repository.list_for_user(user)?;
        Ok(trend_summary(&entries, range))
    }

    pub fn alerts(
        &self,
        user: &UserId,
        today: NaiveDate,
        muted: bool,
    ) -> Result<Vec<MedicalAlert>, DiaryError> {
        let entries = self.repository.list_for_user(user)?;
        Ok(evaluate_alerts(&entries, today, muted))
    }

    pub fn export_csv(&self, user: &UserId) -> Result<String, ExportError> {
        let entries = self.repository.list_for_user(user)?;
        export::write_csv(&entries)
    }

    /// Imports every row or none; rows are validated before anything is stored.
    pub fn import_csv(&self, user: &UserId, csv: &str) -> Result<Vec<MigraineEntry>, ExportError> {
        let drafts = export::read_csv(csv.as_bytes())?
            .into_iter()
            .map(EntryDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let mut stored = Vec::with_capacity(drafts.len());
        for draft in drafts {
            stored.push(self.create(user, draft)?);
        }
        Ok(stored)
    }
}
