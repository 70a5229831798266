//! Liveness signaling: best-effort beacons around each job.
//!
//! Two independent sub-protocols, both optional per job and both
//! fire-and-forget — their failures are logged and never affect the run
//! outcome:
//! - health-ping: `<url>/start` before the job, `<url>` or `<url>/fail`
//!   after it, correlated by a per-job random id;
//! - uptime-status: a single `status=up|down` push after the job.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::exec::ExecutionResult;
use crate::jobs::Job;

/// Fixed timeout for every beacon request.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Health-ping state carried from [`LivenessSignaler::before_job`] to
/// [`LivenessSignaler::after_job`]: the correlation id shared by the
/// start and finish calls.
#[derive(Debug)]
pub struct HealthPing {
    url: String,
    rid: Uuid,
}

pub struct LivenessSignaler {
    client: Client,
}

impl LivenessSignaler {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(PING_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Send the health-ping start beacon if the job has a URL configured.
    /// Returns the state `after_job` needs to close the pair.
    pub async fn before_job(&self, job: &Job) -> Option<HealthPing> {
        let url = job.health_url.clone()?;
        let rid = Uuid::new_v4();
        self.get(&format!("{url}/start"), &[("rid", rid.to_string())])
            .await;
        Some(HealthPing { url, rid })
    }

    /// Close the health-ping pair and push the uptime status.
    ///
    /// `run_failed` reflects the whole run so far, so a job that succeeds
    /// after an earlier failure still pings the fail endpoint.
    pub async fn after_job(
        &self,
        job: &Job,
        ping: Option<HealthPing>,
        result: &ExecutionResult,
        run_failed: bool,
    ) {
        if let Some(ping) = ping {
            let url = if run_failed {
                format!("{}/fail", ping.url)
            } else {
                ping.url
            };
            self.get(&url, &[("rid", ping.rid.to_string())]).await;
        }

        if let Some(url) = &job.status_url {
            let bare = strip_query(url);
            let (status, msg) = if result.succeeded {
                ("up", "OK".to_string())
            } else {
                ("down", result.output.clone())
            };
            self.get(bare, &[("status", status.to_string()), ("msg", msg)])
                .await;
        }
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) {
        match self.client.get(url).query(query).send().await {
            Ok(resp) => debug!(%url, status = %resp.status(), "beacon delivered"),
            Err(e) => warn!(%url, "beacon failed: {e}"),
        }
    }
}

/// Drop any pre-filled query string from a configured push URL; status
/// services hand out URLs with one already attached.
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
