//! Object counts shown on the monitoring page.
//!
//! No detector runs anywhere in this crate. The counts are a constant table.

mod result;

pub use result::{ObjectClass, ObjectCountSummary, REFERENCE_COUNTS};
