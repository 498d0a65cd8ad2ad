//! Send-attempt log.
//!
//! One immutable record per dispatch call, appended to a [`LogSink`].
//! The file backend rewrites a single JSON array on each append and assumes
//! a single writing process.

mod error;
mod sink;
mod types;

pub use error::LogError;
pub use sink::{FileLog, LogSink, MemoryLog};
pub use types::{Outcome, PayloadDescriptor, SendAttempt};
