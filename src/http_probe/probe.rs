use std::time::Instant;

use chrono::Utc;
use reqwest::{StatusCode, Version};

use crate::error::{ProbeError, report};

use super::prelude::*;

/// Formats a status the way an HTTP status line reads, e.g. `200 OK`.
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_str(), reason),
        None => status.as_str().to_string(),
    }
}

pub fn http_version(version: Version) -> String {
    match version {
        Version::HTTP_09 => "HTTP/0.9".to_string(),
        Version::HTTP_10 => "HTTP/1.0".to_string(),
        Version::HTTP_11 => "HTTP/1.1".to_string(),
        Version::HTTP_2 => "HTTP/2.0".to_string(),
        Version::HTTP_3 => "HTTP/3.0".to_string(),
        _ => "UNKNOWN".to_string(),
    }
}

/// Sends one GET for `task` and records what came back.
/// The response body is never read; dropping the response closes it.
pub async fn probe_url(
    client: &reqwest::Client,
    task: &ProbeTask,
    launched: LaunchStamp,
) -> ProbeResult {
    let start = Instant::now();
    let status_result = client.get(&task.url).send().await;
    let observed_at_micros = Utc::now().timestamp_micros();
    let http_duration = start.elapsed();

    let outcome = match status_result {
        Ok(resp) => {
            log::debug!(
                "task {} got {} from {} in {:.3}ms",
                task.id,
                resp.status(),
                task.url,
                http_duration.as_secs_f64() * 1000.0
            );
            ProbeOutcome::Response {
                status_line: status_line(resp.status()),
                http_version: http_version(resp.version()),
            }
        }
        Err(e) => {
            let err = ProbeError::NoResponse(e);
            let reason = report(&err);
            log::debug!("task {} failed after {:?}: {}", task.id, http_duration, reason);
            ProbeOutcome::NoResponse { reason }
        }
    };

    ProbeResult {
        task_id: task.id,
        launched_at_micros: launched.at_micros,
        launch_offset: launched.offset,
        observed_at_micros,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn status_line_includes_reason_phrase() {
        assert_eq!(status_line(StatusCode::OK), "200 OK");
        assert_eq!(status_line(StatusCode::FORBIDDEN), "403 Forbidden");
        assert_eq!(status_line(StatusCode::NOT_FOUND), "404 Not Found");
    }

    #[test]
    fn status_line_without_known_reason() {
        let status = StatusCode::from_u16(599).expect("valid status code");
        assert_eq!(status_line(status), "599");
    }

    #[test]
    fn versions_are_named() {
        assert_eq!(http_version(Version::HTTP_11), "HTTP/1.1");
        assert_eq!(http_version(Version::HTTP_2), "HTTP/2.0");
    }

    #[tokio::test]
    async fn refused_connection_is_no_response() {
        // bind then drop, nothing listens on the port afterwards
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let task = ProbeTask {
            id: 1,
            url: format!("http://{addr}/"),
            launch_delay: Duration::ZERO,
        };
        let launched = LaunchStamp {
            at_micros: Utc::now().timestamp_micros(),
            offset: Duration::ZERO,
        };

        let result = probe_url(&reqwest::Client::new(), &task, launched).await;
        assert_eq!(result.task_id, 1);
        assert!(!result.is_response());
        match result.outcome {
            ProbeOutcome::NoResponse { reason } => {
                assert!(reason.starts_with("No response from server"))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
