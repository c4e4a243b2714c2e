use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{DiaryError, EntryId, MigraineEntry, UserId};

/// Storage abstraction so the diary service can be exercised in isolation.
pub trait DiaryRepository: Send + Sync {
    fn insert(&self, entry: MigraineEntry) -> Result<MigraineEntry, DiaryError>;
    fn update(&self, entry: MigraineEntry) -> Result<(), DiaryError>;
    fn delete(&self, id: &EntryId) -> Result<(), DiaryError>;
    fn fetch(&self, id: &EntryId) -> Result<Option<MigraineEntry>, DiaryError>;
    /// All entries for the user, oldest first.
    fn list_for_user(&self, user: &UserId) -> Result<Vec<MigraineEntry>, DiaryError>;
}

/// Process-local repository used by the service binary and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDiaryRepository {
    entries: Arc<Mutex<BTreeMap<EntryId, MigraineEntry>>>,
}

impl InMemoryDiaryRepository {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<EntryId, MigraineEntry>>, DiaryError> {
        self.entries
            .lock()
            .map_err(|_| DiaryError::Unavailable("diary mutex poisoned".to_string()))
    }
}

impl DiaryRepository for InMemoryDiaryRepository {
    fn insert(&self, entry: MigraineEntry) -> Result<MigraineEntry, DiaryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&entry.id) {
            return Err(DiaryError::Conflict);
        }
        guard.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: MigraineEntry) -> Result<(), DiaryError> {
        let mut guard = self.lock()?;
        match guard.get_mut(&entry.id) {
            Some(existing) => {
                *existing = entry;
                Ok(())
            }
            None => Err(DiaryError::NotFound),
        }
    }

    fn delete(&self, id: &EntryId) -> Result<(), DiaryError> {
        let mut guard = self.lock()?;
        guard.remove(id).map(|_| ()).ok_or(DiaryError::NotFound)
    }

    fn fetch(&self, id: &EntryId) -> Result<Option<MigraineEntry>, DiaryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn list_for_user(&self, user: &UserId) -> Result<Vec<MigraineEntry>, DiaryError> {
        let guard = self.lock()?;
        let mut entries: Vec<MigraineEntry> = guard
            .values()
            .filter(|entry| &entry.user_id == user)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }
}
