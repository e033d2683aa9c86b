use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Inclusive millisecond range used to pace consecutive steps of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Pause {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    /// Uniform pick in `[min_ms, max_ms]`.
    pub fn sample(&self) -> Duration {
        let ms = if self.min_ms >= self.max_ms {
            self.min_ms
        } else {
            rand::thread_rng().gen_range(self.min_ms..=self.max_ms)
        };
        Duration::from_millis(ms)
    }
}

/// Sleeps for `duration` unless `token` is cancelled first.
///
/// Returns `true` when the full duration elapsed, `false` on cancellation.
pub async fn cancellable_sleep(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = sleep(duration) => true,
    }
}
