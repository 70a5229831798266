//! Configuration: one environment snapshot feeds the whole run.
//!
//! Fixed-name notification settings (`SMTP_*`, `EMAIL_*`, `WEBHOOK_*`) are
//! extracted through figment's `Env` provider into [`NotificationConfig`].
//! The dynamic `JOB_<n>_*` key space cannot be expressed as a fixed struct,
//! so the job selector scans the [`ConfigMap`] snapshot instead. Both views
//! are read-only after startup.

use std::collections::BTreeMap;
use std::path::Path;

use figment::{providers::Env, Figment};
use serde::Deserialize;

use crate::error::{Result, RunnerError};

/// Flat key-value view of the process environment, taken once at startup.
pub type ConfigMap = BTreeMap<String, String>;

/// Snapshot the current process environment.
pub fn env_snapshot() -> ConfigMap {
    std::env::vars().collect()
}

/// Derive the periodicity tag from the path the binary was invoked as.
///
/// The runner is installed once per schedule directory
/// (`/etc/periodic/daily/jobrunner`, `/etc/periodic/hourly/jobrunner`, ...),
/// so the containing directory name is the schedule tag.
pub fn periodicity_from_path(argv0: &Path) -> Option<String> {
    let name = argv0.parent()?.file_name()?.to_str()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Read-only notification settings, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub smtp: SmtpConfig,
    pub email: EmailConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Wrap the connection in TLS from the first byte instead of starting
    /// plaintext with an opportunistic STARTTLS upgrade.
    pub implicit_tls: bool,
    /// Report successful runs too, not only failures.
    pub report_success: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Subject template; `{hostname}`, `{periodicity}` and `{result}` are
    /// substituted at send time.
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub report_success: bool,
}

/// Env-shaped settings. Field names match the environment keys lowercased,
/// which is how figment's `Env` provider exposes them. Everything is read
/// as a string so an empty or malformed value can be handled explicitly.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default, deserialize_with = "scalar_string")]
    smtp_host: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    smtp_port: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    smtp_user: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    smtp_pass: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    smtp_tls: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    smtp_report_success: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    email_from: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    email_to: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    email_subject: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    webhook_url: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    webhook_report_success: Option<String>,
}

/// Figment's `Env` provider type-infers values (`"465"` becomes an integer,
/// `"true"` a bool); fold any scalar back into the string form the raw
/// environment variable held.
fn scalar_string<'de, D>(de: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        UInt(u64),
        Float(f64),
        Bool(bool),
    }
    Ok(Option::<Scalar>::deserialize(de)?.map(|s| match s {
        Scalar::Str(v) => v,
        Scalar::Int(v) => v.to_string(),
        Scalar::UInt(v) => v.to_string(),
        Scalar::Float(v) => v.to_string(),
        Scalar::Bool(v) => v.to_string(),
    }))
}

impl NotificationConfig {
    /// Load the notification settings from the process environment.
    pub fn load() -> Result<Self> {
        let raw: RawSettings = Figment::new()
            .merge(Env::raw())
            .extract()
            .map_err(|e| RunnerError::Config(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let port = match non_empty(raw.smtp_port) {
            Some(p) => Some(p.trim().parse::<u16>().map_err(|_| {
                RunnerError::Config(format!("SMTP_PORT is not a valid port: {p}"))
            })?),
            None => None,
        };
        Ok(Self {
            smtp: SmtpConfig {
                host: non_empty(raw.smtp_host),
                port,
                user: non_empty(raw.smtp_user),
                pass: non_empty(raw.smtp_pass),
                implicit_tls: truthy(raw.smtp_tls.as_deref()),
                report_success: truthy(raw.smtp_report_success.as_deref()),
            },
            email: EmailConfig {
                from: non_empty(raw.email_from),
                to: non_empty(raw.email_to),
                subject: non_empty(raw.email_subject),
            },
            webhook: WebhookConfig {
                url: non_empty(raw.webhook_url),
                report_success: truthy(raw.webhook_report_success.as_deref()),
            },
        })
    }
}

/// `1` and `true` (any case) are truthy; everything else, including an
/// absent variable, is falsy.
pub fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true")
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
