//! Job selection and command template expansion.
//!
//! A job `<n>` is declared by `JOB_<n>_WHEN` (whitespace-separated
//! periodicity tags) and `JOB_<n>_WHAT` (the command template). Selection
//! scans the configuration snapshot once and returns the due jobs in
//! ascending numeric id order, independent of how the keys were stored;
//! after that no key scanning happens for the rest of the run.

use crate::config::ConfigMap;
use crate::error::{Result, RunnerError};

/// One due job, fully resolved at selection time. `command` is the
/// unexpanded template; expansion happens against the configuration
/// snapshot at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: u32,
    pub command: String,
    /// Health-ping base URL, if configured for this job.
    pub health_url: Option<String>,
    /// Uptime-status push URL, if configured for this job.
    pub status_url: Option<String>,
}

/// Select the jobs due for `periodicity`, sorted ascending by id.
///
/// A due job without a companion `JOB_<n>_WHAT` key is a fatal
/// configuration error. An empty result means the whole run is a no-op.
pub fn select(config: &ConfigMap, periodicity: &str) -> Result<Vec<Job>> {
    let mut due: Vec<u32> = Vec::new();
    for (key, tags) in config {
        let Some(rest) = key.strip_prefix("JOB_") else {
            continue;
        };
        let Some(id_str) = rest.strip_suffix("_WHEN") else {
            continue;
        };
        let Ok(id) = id_str.parse::<u32>() else {
            continue;
        };
        if tags.split_whitespace().any(|tag| tag == periodicity) {
            due.push(id);
        }
    }
    due.sort_unstable();
    due.dedup();

    due.into_iter()
        .map(|id| {
            let command = config
                .get(&format!("JOB_{id}_WHAT"))
                .ok_or(RunnerError::MissingCommand { id })?;
            Ok(Job {
                id,
                command: command.clone(),
                health_url: lookup_url(config, id, periodicity, "HEALTHCHECKS_URL"),
                status_url: lookup_url(config, id, periodicity, "UPTIME_KUMA_URL"),
            })
        })
        .collect()
}

/// Resolve a per-job URL: the periodicity-specific key wins over the
/// generic one.
fn lookup_url(config: &ConfigMap, job_id: u32, periodicity: &str, suffix: &str) -> Option<String> {
    let specific = format!("JOB_{job_id}_{}_{suffix}", periodicity.to_uppercase());
    let generic = format!("JOB_{job_id}_{suffix}");
    config
        .get(&specific)
        .or_else(|| config.get(&generic))
        .filter(|v| !v.is_empty())
        .cloned()
}

/// Substitute `${name}` placeholders from `vars`.
///
/// Safe semantics: unknown placeholders and malformed `${` sequences are
/// left exactly as written, and expansion never fails.
pub fn expand(template: &str, vars: &ConfigMap) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // No closing brace: keep the tail verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
