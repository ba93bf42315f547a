use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Advisory progress for one in-flight generation request
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    /// 0-100; only reaches 100 when completion is marked explicitly
    pub percent: u8,
    pub message: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            percent: 0,
            message: "Starting".to_string(),
        }
    }
}

/// Shared handle to the progress of one request
#[derive(Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<RwLock<ProgressState>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit phase boundary; never moves the percentage backwards
    pub async fn set(&self, percent: u8, message: &str) {
        let mut state = self.inner.write().await;
        state.percent = state.percent.max(percent.min(100));
        state.message = message.to_string();
        info!("📊 {}% - {}", state.percent, state.message);
    }

    /// Mark the request finished
    pub async fn complete(&self, message: &str) {
        self.set(100, message).await;
    }

    pub async fn snapshot(&self) -> ProgressState {
        self.inner.read().await.clone()
    }

    /// One ticker step: creep toward the ceiling without crossing it
    async fn tick(&self, ceiling: u8, message: &str) {
        let mut state = self.inner.write().await;
        if state.percent >= 100 {
            return;
        }
        if state.percent < ceiling {
            state.percent += 1;
        }
        state.message = message.to_string();
        debug!("Progress tick: {}% - {}", state.percent, state.message);
    }
}

/// Phase messages shown while the provider renders, in order
const TICK_MESSAGES: [&str; 4] = [
    "Preparing your podcast video",
    "Teaching the host to talk",
    "Rendering video frames",
    "Almost there",
];

/// How many ticks each message is shown before moving to the next
const TICKS_PER_MESSAGE: u64 = 15;

/// Percentage the ticker may approach but never reach on its own
const TICK_CEILING: u8 = 95;

fn message_for_tick(ticks: u64) -> &'static str {
    let index = (ticks / TICKS_PER_MESSAGE) as usize;
    TICK_MESSAGES[index.min(TICK_MESSAGES.len() - 1)]
}

/// Independent ticking task advancing a request's progress while the
/// orchestrator awaits network calls. Purely cosmetic: it never blocks the
/// pipeline and is stopped unconditionally when its guard drops.
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn start(tracker: ProgressTracker) -> ProgressGuard {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(2));
            let mut ticks: u64 = 0;
            loop {
                interval.tick().await;
                tracker.tick(TICK_CEILING, message_for_tick(ticks)).await;
                ticks += 1;
            }
        });

        ProgressGuard { handle }
    }
}

/// Aborts the ticking task when dropped, on every exit path of the owner
pub struct ProgressGuard {
    handle: JoinHandle<()>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
