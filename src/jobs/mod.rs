//! Job-queue domain types
//!
//! - [`JobState`] - the closed set of lifecycle states the collector reports
//! - [`JobRecord`] - a backend row, with the timestamps the state scopes read

mod record;
mod state;

pub use record::JobRecord;
pub use state::{JobState, UnknownJobState};
