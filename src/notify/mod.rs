//! Aggregate report delivery: email and chat webhook.
//!
//! Both notifiers share the same gate — send when the run failed, or
//! always when the channel is configured to report successes — and both
//! swallow their own transport errors.

pub mod email;
pub mod webhook;

/// Name of the local host, used in email subjects and the webhook author
/// field.
pub fn local_hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

/// Shared gate: report when the run failed or when the channel is
/// configured to report successes too.
pub fn wants_report(report_success: bool, any_failed: bool) -> bool {
    report_success || any_failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_truth_table() {
        assert!(!wants_report(false, false));
        assert!(wants_report(false, true));
        assert!(wants_report(true, false));
        assert!(wants_report(true, true));
    }
}
