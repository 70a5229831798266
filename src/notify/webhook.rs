//! Chat webhook delivery: one JSON message embed per run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::WebhookConfig;
use crate::report::RunReport;

use super::{local_hostname, wants_report};

/// Embed description cap imposed by chat services.
const DESCRIPTION_MAX: usize = 4095;

const COLOR_OK: u32 = 0x00FF00;
const COLOR_ERROR: u32 = 0xFF0000;

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
pub struct Payload {
    /// Always null — the report travels in the embed.
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub description: String,
    pub author: Author,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct Author {
    pub name: String,
}

/// True when this run should produce a webhook message.
pub fn should_send(webhook: &WebhookConfig, any_failed: bool) -> bool {
    wants_report(webhook.report_success, any_failed) && webhook.url.is_some()
}

/// Build the message payload for a finished run.
pub fn build_payload(
    report: &RunReport,
    periodicity: &str,
    hostname: &str,
    now: DateTime<Utc>,
) -> Payload {
    let (result, color) = if report.any_failed {
        ("ERROR", COLOR_ERROR)
    } else {
        ("OK", COLOR_OK)
    };
    Payload {
        content: None,
        embeds: vec![Embed {
            title: format!("{periodicity} {result}"),
            color,
            description: truncate_chars(&report.body(), DESCRIPTION_MAX),
            author: Author {
                name: hostname.to_string(),
            },
            timestamp: now.to_rfc3339(),
        }],
    }
}

/// Deliver the report to the chat webhook. Failures are logged and
/// swallowed; they never affect the run outcome.
pub async fn send(report: &RunReport, webhook: &WebhookConfig, periodicity: &str) {
    if !should_send(webhook, report.any_failed) {
        debug!("webhook report skipped (gate closed or no URL)");
        return;
    }
    let Some(url) = webhook.url.as_deref() else {
        return;
    };
    let payload = build_payload(report, periodicity, &local_hostname(), Utc::now());

    let client = match reqwest::Client::builder().timeout(SEND_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("webhook client build failed: {e}");
            return;
        }
    };
    match client.post(url).json(&payload).send().await {
        Ok(resp) => info!(status = %resp.status(), "webhook report sent"),
        Err(e) => warn!("webhook report failed: {e}"),
    }
}

/// Character-boundary-safe truncation.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
