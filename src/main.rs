use std::path::PathBuf;

use tracing::{error, warn};

use jobrunner::config::{self, NotificationConfig};
use jobrunner::runner;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobrunner=info".into()),
        )
        .init();

    let periodicity = std::env::args()
        .next()
        .map(PathBuf::from)
        .and_then(|p| std::path::absolute(&p).ok())
        .and_then(|p| config::periodicity_from_path(&p))
        .unwrap_or_else(|| {
            warn!("could not derive periodicity from invocation path, assuming daily");
            "daily".to_string()
        });

    let config = config::env_snapshot();
    let notify_cfg = match NotificationConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    match runner::run(&config, &periodicity, &notify_cfg).await {
        Ok(report) if report.any_failed => {
            error!("run finished with failed jobs");
            std::process::exit(1);
        }
        Ok(_) => {}
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    }
}
