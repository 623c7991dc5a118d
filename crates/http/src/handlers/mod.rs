#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod catalog;
pub mod checklists;
pub mod reviews;
