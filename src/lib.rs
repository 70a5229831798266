//! `jobrunner` — a periodic job runner driven entirely by environment
//! configuration.
//!
//! Invoked once per scheduling tick (typically from a periodic cron
//! directory), it selects the `JOB_<n>_*` entries due for the current
//! periodicity, runs them sequentially in ascending id order, signals
//! per-job liveness to external monitoring endpoints, and reports the
//! aggregate outcome over SMTP and a chat webhook after scrubbing
//! embedded credentials. The process exits non-zero iff any job failed.

pub mod config;
pub mod error;
pub mod exec;
pub mod jobs;
pub mod notify;
pub mod redact;
pub mod report;
pub mod runner;
pub mod signal;

pub use error::{Result, RunnerError};
pub use report::RunReport;
