//! SMTP delivery of the finalized run report.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use crate::config::{EmailConfig, SmtpConfig};
use crate::error::Result;
use crate::report::RunReport;

use super::{local_hostname, wants_report};

const SMTP_TIMEOUT: Duration = Duration::from_secs(5);

/// True when this run should produce an email: the report gate passes and
/// every required setting (host, port, from, to, subject) is present.
pub fn should_send(smtp: &SmtpConfig, email: &EmailConfig, any_failed: bool) -> bool {
    wants_report(smtp.report_success, any_failed)
        && smtp.host.is_some()
        && smtp.port.is_some()
        && email.from.is_some()
        && email.to.is_some()
        && email.subject.is_some()
}

/// Render the subject template: `{hostname}`, `{periodicity}` and
/// `{result}` are substituted; anything else is left as written.
pub fn render_subject(
    template: &str,
    hostname: &str,
    periodicity: &str,
    any_failed: bool,
) -> String {
    let result = if any_failed { "ERROR" } else { "OK" };
    template
        .replace("{hostname}", hostname)
        .replace("{periodicity}", periodicity)
        .replace("{result}", result)
}

/// Deliver the report by email. Transport failures are logged and
/// swallowed; they never affect the run outcome.
pub async fn send(report: &RunReport, smtp: &SmtpConfig, email: &EmailConfig, periodicity: &str) {
    if !should_send(smtp, email, report.any_failed) {
        debug!("email report skipped (gate closed or settings incomplete)");
        return;
    }
    match deliver(report, smtp, email, periodicity).await {
        Ok(()) => info!("email report sent"),
        Err(e) => warn!("email report failed: {e}"),
    }
}

async fn deliver(
    report: &RunReport,
    smtp: &SmtpConfig,
    email: &EmailConfig,
    periodicity: &str,
) -> Result<()> {
    // should_send already verified these are present.
    let (Some(host), Some(port), Some(from), Some(to), Some(subject)) = (
        smtp.host.as_deref(),
        smtp.port,
        email.from.as_deref(),
        email.to.as_deref(),
        email.subject.as_deref(),
    ) else {
        return Ok(());
    };

    let subject = render_subject(subject, &local_hostname(), periodicity, report.any_failed);
    let message = Message::builder()
        .from(from.parse::<Mailbox>()?)
        .to(to.parse::<Mailbox>()?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(report.body())?;

    let tls = TlsParameters::new(host.to_string())?;
    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        .port(port)
        .timeout(Some(SMTP_TIMEOUT))
        .tls(if smtp.implicit_tls {
            Tls::Wrapper(tls)
        } else {
            // Plaintext, upgraded when the server advertises STARTTLS.
            Tls::Opportunistic(tls)
        });
    if let Some(user) = smtp.user.as_deref() {
        builder = builder.credentials(Credentials::new(
            user.to_string(),
            smtp.pass.clone().unwrap_or_default(),
        ));
    }

    builder.build().send(message).await?;
    Ok(())
}
