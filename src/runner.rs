//! Orchestration: selection → sequential execution → signaling → reporting.

use tracing::{error, info};

use crate::config::{ConfigMap, NotificationConfig};
use crate::error::Result;
use crate::exec;
use crate::jobs;
use crate::notify;
use crate::report::RunReport;
use crate::signal::LivenessSignaler;

/// Run one scheduling tick end to end and return the finalized report.
///
/// The report is empty when no job was due. Only configuration errors
/// propagate; job failures are folded into [`RunReport::any_failed`] and
/// transport errors are handled where they occur.
pub async fn run(
    config: &ConfigMap,
    periodicity: &str,
    notify_cfg: &NotificationConfig,
) -> Result<RunReport> {
    let jobs = jobs::select(config, periodicity)?;
    if jobs.is_empty() {
        info!(%periodicity, "no jobs due, nothing to do");
        return Ok(RunReport::new());
    }
    info!(%periodicity, count = jobs.len(), "starting run");

    let signaler = LivenessSignaler::new()?;
    let mut report = RunReport::new();

    for job in &jobs {
        let ping = signaler.before_job(job).await;
        let result = exec::run_job(job, config).await;
        if result.succeeded {
            info!(job_id = job.id, "job succeeded");
        } else {
            error!(job_id = job.id, "job failed");
        }
        report.record(&result);
        signaler
            .after_job(job, ping, &result, report.any_failed)
            .await;
    }

    report.redact();
    notify::email::send(&report, &notify_cfg.smtp, &notify_cfg.email, periodicity).await;
    notify::webhook::send(&report, &notify_cfg.webhook, periodicity).await;

    Ok(report)
}
