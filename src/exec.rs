//! Command execution: one job at a time through `sh -c`.

use chrono::{DateTime, Utc};
use tokio::process::Command;
use tracing::debug;

use crate::config::ConfigMap;
use crate::jobs::{expand, Job};

/// Outcome of a single job execution. Failure is represented here and
/// never raised to the caller.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub job_id: u32,
    /// The command after `${VAR}` expansion, as handed to the shell.
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: bool,
    /// Captured stdout followed by stderr; on failure the error detail
    /// comes first.
    pub output: String,
}

/// Expand and run the job's command, capturing combined output.
///
/// No timeout is enforced on the child; the run blocks until the command
/// finishes or the process is killed externally.
pub async fn run_job(job: &Job, vars: &ConfigMap) -> ExecutionResult {
    let command = expand(&job.command, vars);
    debug!(job_id = job.id, %command, "executing");
    let started_at = Utc::now();

    let (succeeded, output) = match Command::new("sh")
        .arg("-c")
        .arg(&command)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .output()
        .await
    {
        Ok(out) => {
            let captured = combine(&out.stdout, &out.stderr);
            if out.status.success() {
                (true, captured)
            } else {
                let code = out.status.code().unwrap_or(-1);
                let detail = format!("command exited with status {code}");
                (false, prepend(detail, captured))
            }
        }
        Err(e) => (false, format!("failed to launch command: {e}")),
    };

    ExecutionResult {
        job_id: job.id,
        command,
        started_at,
        finished_at: Utc::now(),
        succeeded,
        output,
    }
}

fn combine(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    let err = String::from_utf8_lossy(stderr);
    if !err.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&err);
    }
    text
}

fn prepend(detail: String, captured: String) -> String {
    if captured.is_empty() {
        detail
    } else {
        format!("{detail}\n{captured}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(command: &str) -> Job {
        Job {
            id: 1,
            command: command.to_string(),
            health_url: None,
            status_url: None,
        }
    }

    #[tokio::test]
    async fn zero_exit_succeeds_with_output() {
        let result = run_job(&job("echo hi"), &ConfigMap::new()).await;
        assert!(result.succeeded);
        assert_eq!(result.output.trim_end(), "hi");
        assert!(result.started_at <= result.finished_at);
    }

    #[tokio::test]
    async fn nonzero_exit_fails_with_detail_and_captured_output() {
        let result = run_job(&job("echo partial; exit 3"), &ConfigMap::new()).await;
        assert!(!result.succeeded);
        assert!(result.output.contains("status 3"));
        assert!(result.output.contains("partial"));
    }

    #[tokio::test]
    async fn stderr_is_part_of_the_combined_output() {
        let result = run_job(&job("echo out; echo oops >&2"), &ConfigMap::new()).await;
        assert!(result.succeeded);
        assert!(result.output.contains("out"));
        assert!(result.output.contains("oops"));
    }

    #[tokio::test]
    async fn placeholders_are_expanded_before_execution() {
        let vars: ConfigMap = [("GREETING".to_string(), "hello".to_string())]
            .into_iter()
            .collect();
        let result = run_job(&job("echo ${GREETING}"), &vars).await;
        assert!(result.succeeded);
        assert_eq!(result.command, "echo hello");
        assert_eq!(result.output.trim_end(), "hello");
    }
}
