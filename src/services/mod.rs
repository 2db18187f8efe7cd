//! Business logic services.
//!
//! Services orchestrate storage backends and the exchange layer:
//! - [`StudentStore`]: persisted typed CRUD and GPA statistics
//! - [`RecordStore`]: loose records with validation, search and sort

mod records;
mod students;

pub use records::RecordStore;
pub use students::StudentStore;
