use std::fmt;
use std::time::Duration;

/// One unit of work: a single GET against `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTask {
    /// 1-based sequence number, also the launch order.
    pub id: usize,
    pub url: String,
    /// Delay before this task is launched, relative to the previous one.
    pub launch_delay: Duration,
}

/// When a task was launched, on both clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchStamp {
    pub at_micros: i64,
    pub offset: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Response {
        /// Status code and reason phrase, e.g. `200 OK`.
        status_line: String,
        http_version: String,
    },
    NoResponse {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub task_id: usize,
    /// Wall clock microseconds since the epoch at launch.
    pub launched_at_micros: i64,
    /// Monotonic offset of the launch from the start of the probe.
    pub launch_offset: Duration,
    /// Wall clock microseconds since the epoch when the outcome was observed.
    pub observed_at_micros: i64,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn is_response(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Response { .. })
    }

    pub fn status_line(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Response { status_line, .. } => Some(status_line),
            ProbeOutcome::NoResponse { .. } => None,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ProbeOutcome::Response {
                status_line,
                http_version,
            } => write!(
                f,
                "[task {}] ✅ Status: {}, Version: {}, Observed at: {}us",
                self.task_id, status_line, http_version, self.observed_at_micros
            ),
            ProbeOutcome::NoResponse { .. } => {
                write!(f, "[task {}] ❌ No response from server.", self.task_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: ProbeOutcome) -> ProbeResult {
        ProbeResult {
            task_id: 2,
            launched_at_micros: 1_700_000_000_000_000,
            launch_offset: Duration::from_millis(1),
            observed_at_micros: 1_700_000_000_000_750,
            outcome,
        }
    }

    #[test]
    fn response_line_carries_status_and_timestamp() {
        let r = result(ProbeOutcome::Response {
            status_line: "200 OK".to_string(),
            http_version: "HTTP/1.1".to_string(),
        });

        assert!(r.is_response());
        assert_eq!(r.status_line(), Some("200 OK"));
        assert_eq!(
            r.to_string(),
            "[task 2] ✅ Status: 200 OK, Version: HTTP/1.1, Observed at: 1700000000000750us"
        );
    }

    #[test]
    fn failure_line_is_a_short_notice() {
        let r = result(ProbeOutcome::NoResponse {
            reason: "connection refused".to_string(),
        });

        assert!(!r.is_response());
        assert_eq!(r.status_line(), None);
        assert_eq!(r.to_string(), "[task 2] ❌ No response from server.");
    }
}
