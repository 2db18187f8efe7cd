//! Data models for roster.
//!
//! This module contains the record types shared by both stores:
//!
//! - [`Record`]: an ordered field mapping used by the exchange layer
//! - [`Student`]: the typed, persisted record with a store-assigned id
//! - [`StudentUpdate`]: an explicit merge over the closed set of updatable fields

mod record;
mod student;

pub use record::{FieldKind, Record};
pub(crate) use record::{compare_values, integer_of, kind_name};
pub use student::{Student, StudentDraft, StudentField, StudentId, StudentUpdate};
