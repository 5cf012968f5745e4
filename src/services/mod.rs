//! Business logic services.

pub mod auth;
pub mod documents;
pub mod ingestion;
pub mod reaper;
pub mod storage;

pub use documents::{DocumentUpdate, UploadedFile};
pub use ingestion::IngestionClient;
pub use reaper::{ReaperConfig, start_reaper_task};
pub use storage::FileStorage;
