//! Migraine diary: entry validation, per-user storage, CSV interchange, and HTTP routes.

pub mod domain;
pub mod export;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    DiaryError, EntryDraft, EntryId, HeadRegion, MedicationDose, MigraineEntry, ReliefLevel,
    UserId, MAX_DURATION_HOURS,
};
pub use export::ExportError;
pub use repository::{DiaryRepository, InMemoryDiaryRepository};
pub use router::{diary_router, DiaryState};
pub use service::DiaryService;
