use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use tokio::time::sleep;
use url::Url;

use crate::config::ProbeConfig;
use crate::error::ProbeError;

use super::prelude::*;

const USER_AGENT: &str = "backlog-probe/1.0";

/// Launches `task_count` GET requests against one URL, `launch_delay` apart,
/// and waits for all of them.
pub struct ConcurrentProbe {
    client: Client,
    url: String,
    task_count: usize,
    launch_delay: Duration,
}

impl ConcurrentProbe {
    pub fn new(
        url: &str,
        task_count: usize,
        launch_delay: Duration,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ProbeError> {
        let parsed = Url::parse(url).map_err(|source| ProbeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        // No idle pooling: every task must open its own connection,
        // a reused keep-alive socket would never touch the accept queue.
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(0);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProbeError::Client)?;

        Ok(ConcurrentProbe {
            client,
            url: url.to_string(),
            task_count,
            launch_delay,
        })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        Self::new(
            &config.url,
            config.task_count,
            config.launch_delay(),
            config.request_timeout(),
        )
    }

    /// The tasks a run launches, in launch order.
    pub fn tasks(&self) -> Vec<ProbeTask> {
        (1..=self.task_count)
            .map(|id| ProbeTask {
                id,
                url: self.url.clone(),
                launch_delay: if id == 1 {
                    Duration::ZERO
                } else {
                    self.launch_delay
                },
            })
            .collect()
    }

    /// Runs every task and returns one result per task, sorted by task id.
    ///
    /// Each task prints its own line as soon as its request finished, so the
    /// console shows completion order while the returned vector is in launch order.
    /// Failed requests are recorded, never retried, and do not stop the run.
    pub async fn run(&self) -> Vec<ProbeResult> {
        let mut barrier = JoinBarrier::new();
        let started = Instant::now();

        for task in self.tasks() {
            if !task.launch_delay.is_zero() {
                sleep(task.launch_delay).await;
            }

            let launched = LaunchStamp {
                at_micros: Utc::now().timestamp_micros(),
                offset: started.elapsed(),
            };
            log::debug!("Launching task {} at +{:?}", task.id, launched.offset);

            let completion = barrier.register();
            let client = self.client.clone();
            tokio::spawn(async move {
                let result = probe_url(&client, &task, launched).await;
                println!("{result}");
                completion.complete(result);
            });
        }

        let mut results = barrier.wait().await;
        results.sort_by_key(|r| r.task_id);

        let responded = results.iter().filter(|r| r.is_response()).count();
        log::info!(
            "Probe of {} finished: {} responded, {} without response",
            self.url,
            responded,
            results.len() - responded
        );
        results
    }
}
