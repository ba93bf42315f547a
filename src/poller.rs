use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::avatar::{AvatarVideoApi, JobStatus, JobStatusReport};
use crate::error::{GenerationError, Result};

/// Injectable time source so polling is deterministic in tests
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// States of one polled video job
#[derive(Debug, Clone, PartialEq)]
enum PollState {
    /// Still waiting on the provider; counts status checks issued so far
    Processing { attempts: u32 },
    Succeeded { video_url: String },
    Failed { message: String },
    TimedOut { attempts: u32 },
}

/// Fixed-interval status poller over one provider-side video job.
///
/// Terminal outcomes only: the caller gets a video URL or an error, never
/// an intermediate status. Transport failures on the status endpoint are
/// not retried; only a still-processing job is re-checked.
pub struct StatusPoller {
    interval: Duration,
    max_attempts: u32,
}

impl StatusPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Transition rule: one status report advances the state machine
    fn advance(&self, state: PollState, report: &JobStatusReport) -> PollState {
        let attempts = match state {
            PollState::Processing { attempts } => attempts + 1,
            terminal => return terminal,
        };

        match report.status {
            JobStatus::Succeeded => PollState::Succeeded {
                video_url: report.video_url.clone().unwrap_or_default(),
            },
            JobStatus::Failed => PollState::Failed {
                message: report
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "provider reported failure without a message".to_string()),
            },
            JobStatus::Processing if attempts >= self.max_attempts => {
                PollState::TimedOut { attempts }
            }
            JobStatus::Processing => PollState::Processing { attempts },
        }
    }

    /// Poll until the job reaches a terminal state or the attempt ceiling
    pub async fn poll(
        &self,
        api: &dyn AvatarVideoApi,
        sleeper: &dyn Sleeper,
        video_id: &str,
    ) -> Result<String> {
        let mut state = PollState::Processing { attempts: 0 };

        loop {
            let report = api.check_status(video_id).await?;
            state = self.advance(state, &report);

            match &state {
                PollState::Succeeded { video_url } => {
                    if video_url.is_empty() {
                        return Err(GenerationError::StatusCheck(
                            "provider reported success without a video URL".to_string(),
                        ));
                    }
                    info!("🎉 Video job {} succeeded: {}", video_id, video_url);
                    return Ok(video_url.clone());
                }
                PollState::Failed { message } => {
                    return Err(GenerationError::ProviderJobFailed(message.clone()));
                }
                PollState::TimedOut { attempts } => {
                    return Err(GenerationError::PollingTimeout(format!(
                        "no terminal status after {} checks",
                        attempts
                    )));
                }
                PollState::Processing { attempts } => {
                    debug!(
                        "Video job {} still processing (check {}/{})",
                        video_id, attempts, self.max_attempts
                    );
                    sleeper.sleep(self.interval).await;
                }
            }
        }
    }
}
