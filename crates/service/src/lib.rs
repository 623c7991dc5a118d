//! Service layer for checkflow
//!
//! Centralizes business logic between the HTTP handlers and storage:
//! payload validation, ownership and moderation checks, and the wiring of
//! multi-step operations.

#![allow(missing_docs, reason = "consumed only inside the workspace")]
#![allow(clippy::missing_errors_doc, reason = "failure modes live on ServiceError")]
#![allow(missing_debug_implementations, reason = "service structs hold only a store handle")]
#![allow(clippy::missing_docs_in_private_items, reason = "private helpers are short")]

mod catalog_service;
mod checklist_service;
mod error;
mod review_service;
#[cfg(test)]
mod tests;

pub use catalog_service::CatalogService;
pub use checklist_service::ChecklistService;
pub use error::ServiceError;
pub use review_service::ReviewService;
