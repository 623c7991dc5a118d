//! Core types and tree logic for checkflow
//!
//! This crate contains domain types shared across all other crates, plus the
//! pure planning logic for question-tree construction: temp-id resolution,
//! structural link passes, and clone remapping. Nothing in here touches a
//! database; the storage layer executes the plans produced here.

mod actor;
mod checklist;
mod error;
mod input;
mod question;
mod tree;


pub use actor::*;
pub use checklist::*;
pub use error::*;
pub use input::*;
pub use question::*;
pub use tree::*;
