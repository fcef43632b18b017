//! Domain records for the to-do list.
//!
//! # Responsibility
//! - Define the task item and settings shapes used by every layer.
//! - Own the sort-mode vocabulary and its storage names.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` that is never reused.
//! - At most one settings record exists; its row id is fixed.

pub mod settings;
pub mod task;
