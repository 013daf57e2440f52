use backlog_probe::config::load_config;
use backlog_probe::error::report;
use backlog_probe::http_probe::prelude::*;

#[tokio::main]
async fn main() {
    backlog_probe::init_logging("info");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", report(&e));
            std::process::exit(1);
        }
    };

    let probe = match ConcurrentProbe::from_config(&config.probe) {
        Ok(probe) => probe,
        Err(e) => {
            log::error!("{}", report(&e));
            std::process::exit(1);
        }
    };

    // Per-task failures are part of the measurement, the exit code stays 0.
    let results = probe.run().await;
    for result in results.iter() {
        if let ProbeOutcome::NoResponse { reason } = &result.outcome {
            log::debug!("task {}: {}", result.task_id, reason);
        }
    }
}
