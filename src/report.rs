//! Run report: ordered log lines plus the overall failure flag.

use crate::exec::ExecutionResult;
use crate::redact::redact_line;

/// Accumulates over the whole run; owned exclusively by the orchestrator.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Log lines in emission order.
    pub lines: Vec<String>,
    /// True iff at least one executed job failed.
    pub any_failed: bool,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append the per-job lines and fold the outcome into `any_failed`.
    pub fn record(&mut self, result: &ExecutionResult) {
        let status = if result.succeeded { "OK" } else { "FAILED" };
        let elapsed =
            (result.finished_at - result.started_at).num_milliseconds() as f64 / 1000.0;
        self.push(format!(
            "job {}: `{}` {status} in {elapsed:.1}s",
            result.job_id, result.command
        ));
        let output = result.output.trim_end();
        if !output.is_empty() {
            self.push(output);
        }
        if !result.succeeded {
            self.any_failed = true;
        }
    }

    /// Scrub credentials from every line. Called once, before any line
    /// leaves the process.
    pub fn redact(&mut self) {
        for line in &mut self.lines {
            *line = redact_line(line);
        }
    }

    /// The notification body: all lines joined with newlines.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(succeeded: bool, output: &str) -> ExecutionResult {
        let now = Utc::now();
        ExecutionResult {
            job_id: 1,
            command: "true".to_string(),
            started_at: now,
            finished_at: now,
            succeeded,
            output: output.to_string(),
        }
    }

    #[test]
    fn any_failed_tracks_job_outcomes() {
        let mut report = RunReport::new();
        report.record(&result(true, "fine"));
        assert!(!report.any_failed);
        report.record(&result(false, "boom"));
        assert!(report.any_failed);
        // A later success must not clear the flag.
        report.record(&result(true, ""));
        assert!(report.any_failed);
    }

    #[test]
    fn redact_applies_to_every_line() {
        let mut report = RunReport::new();
        report.record(&result(true, "backing up to s3://key:secret@bucket/x"));
        report.redact();
        assert!(report.body().contains("s3://key:REDACTED@bucket/x"));
        assert!(!report.body().contains("secret"));
    }
}
