//! Run poller: waits for a generation run to reach a terminal status.
//!
//! The poll interval starts at `initial_interval` and grows geometrically up
//! to `max_interval`. The whole wait is bounded by `timeout` unless it is
//! `None`, in which case polling continues until the run ends.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use wabridge_types::assistant::{AssistantError, GeneratedReply, MessageRole, Run, RunStatus};
use wabridge_types::config::PollSettings;

use super::api::AssistantApi;

/// How many recent messages to scan for the assistant's reply.
const REPLY_SCAN_LIMIT: u32 = 10;

/// Lower bound on a configured poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Polling cadence and bound for [`RunPoller`].
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    /// Constant interval, no timeout.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            timeout: None,
        }
    }

    /// Interval to wait after one of length `current`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let factor = if self.multiplier.is_finite() && self.multiplier >= 1.0 {
            self.multiplier
        } else {
            1.0
        };
        Duration::try_from_secs_f64(current.as_secs_f64() * factor)
            .map_or(self.max_interval, |next| next.min(self.max_interval))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollSettings::default())
    }
}

impl From<&PollSettings> for PollPolicy {
    fn from(settings: &PollSettings) -> Self {
        let initial_interval =
            Duration::from_millis(settings.initial_interval_ms).max(MIN_POLL_INTERVAL);
        Self {
            initial_interval,
            max_interval: Duration::from_millis(settings.max_interval_ms).max(initial_interval),
            multiplier: settings.multiplier,
            timeout: (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs)),
        }
    }
}

/// Polls run status until terminal, then extracts the generated text.
pub struct RunPoller {
    policy: PollPolicy,
}

impl RunPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Block until `run` finishes and return the assistant's reply.
    ///
    /// A run that is already terminal costs no status query; otherwise one
    /// query is made per poll. A failed run is reported without listing
    /// messages. Only a message written by this run counts as its reply.
    pub async fn await_completion<A: AssistantApi>(
        &self,
        api: &A,
        run: Run,
    ) -> Result<GeneratedReply, AssistantError> {
        let started = Instant::now();
        // A timeout too large to represent as an instant never expires.
        let deadline = self.policy.timeout.and_then(|t| started.checked_add(t));
        let mut interval = self.policy.initial_interval;
        let mut run = run;
        let mut polls: u32 = 0;

        while !run.status.is_terminal() {
            let now = Instant::now();
            let wait = match deadline {
                Some(deadline) if now >= deadline => {
                    warn!(run_id = %run.id, status = %run.status, polls, "Run did not finish in time");
                    return Err(AssistantError::TimedOut {
                        run_id: run.id,
                        waited: now - started,
                    });
                }
                Some(deadline) => interval.min(deadline - now),
                None => interval,
            };

            tokio::time::sleep(wait).await;
            run = api.retrieve_run(&run.session_id, &run.id).await?;
            polls += 1;
            interval = self.policy.next_interval(interval);
            debug!(run_id = %run.id, status = %run.status, polls, "Polled run status");
        }

        match run.status {
            RunStatus::Completed => {
                let messages = api.list_messages(&run.session_id, REPLY_SCAN_LIMIT).await?;
                let reply = messages
                    .into_iter()
                    .find(|m| m.role == MessageRole::Assistant && m.run_id.as_ref() == Some(&run.id))
                    .ok_or_else(|| AssistantError::EmptyReply {
                        session_id: run.session_id.clone(),
                    })?;
                info!(run_id = %run.id, polls, "Generated message: {}", reply.text);
                Ok(GeneratedReply {
                    session_id: run.session_id,
                    run_id: run.id,
                    text: reply.text,
                })
            }
            RunStatus::Failed => {
                let detail = run
                    .last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no error detail reported".to_string());
                warn!(run_id = %run.id, %detail, "Assistant run failed");
                Err(AssistantError::RunFailed { detail })
            }
            status => {
                warn!(run_id = %run.id, %status, "Assistant run ended without a reply");
                Err(AssistantError::RunEnded { status })
            }
        }
    }
}
