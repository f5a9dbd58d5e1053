//! Backpressure for the shared inference service.
//!
//! `PacedBackend` wraps any `InferenceBackend` and guarantees:
//! - at most one `generate` call is in flight (the gate is held across the call)
//! - at least `delay` elapses between the end of one call and the start of the next

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::InferenceError;
use crate::inference::{GenerateOptions, InferenceBackend};

pub struct PacedBackend {
    inner: Arc<dyn InferenceBackend>,
    delay: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl PacedBackend {
    pub fn new(inner: Arc<dyn InferenceBackend>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            last_finished: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl InferenceBackend for PacedBackend {
    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, InferenceError> {
        let mut last = self.last_finished.lock().await;
        if let Some(finished) = *last {
            tokio::time::sleep_until(finished + self.delay).await;
        }
        let result = self.inner.generate(prompt, options).await;
        *last = Some(Instant::now());
        result
    }
}
