//! Storage layer for checkflow
//!
//! PostgreSQL-backed persistence via sqlx: checklist and question tables,
//! transactional tree construction, review-decision locking, and lineage
//! queries. Schema migrations run at pool construction and are idempotent.

mod error;
mod migrations;
mod pg;
pub mod traits;
mod types;

pub use error::StorageError;
pub use pg::PgStorage;
pub use types::{ChecklistWithQuestions, CreatedChecklist, LineageDetail, ReviewOutcome, VersionRef};
