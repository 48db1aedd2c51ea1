use std::time::Duration;
use tokio::time::Instant;

/// Spaces out the start of successive requests within one batch.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    spacing: Duration,
}

impl Pacer {
    #[must_use]
    pub const fn new(spacing: Duration) -> Self {
        Self { spacing }
    }

    /// Offset from batch start at which request `index` may be issued.
    #[must_use]
    pub fn delay_for(&self, index: usize) -> Duration {
        self.spacing
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Fixes the start of a new batch at the current instant.
    #[must_use]
    pub fn start(&self) -> PacedBatch {
        PacedBatch {
            pacer: *self,
            started_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PacedBatch {
    pacer: Pacer,
    started_at: Instant,
}

impl PacedBatch {
    /// Suspends until `index * spacing` has elapsed since the batch started.
    pub async fn pace(&self, index: usize) {
        let delay = self.pacer.delay_for(index);
        if delay.is_zero() {
            return;
        }
        tokio::time::sleep_until(self.started_at + delay).await;
    }
}
