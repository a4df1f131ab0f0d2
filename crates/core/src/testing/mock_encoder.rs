//! Mock encoder for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use crate::encoder::{ConversionCallback, EncodeOutcome, EncodeRequest, Encoder, EncoderError};

/// Mock implementation of the Encoder trait.
///
/// Provides controllable behavior for testing:
/// - Emit scripted progress callbacks
/// - Pause before a progress step until [`resume`](Self::resume) is called
/// - Simulate failure or a panic
/// - Record requests for assertions
///
/// Clones share the recorded requests and the pause gate, so a test can keep
/// a clone after handing the encoder to an orchestrator.
///
/// # Example
///
/// ```rust,ignore
/// use squeezer_core::testing::MockEncoder;
///
/// let encoder = MockEncoder::new()
///     .with_progress(vec![(1024, 0.5), (2048, 1.0)])
///     .with_output_bytes(2048);
/// let handle = encoder.clone();
///
/// // hand `encoder` to the orchestrator, run a job
///
/// let requests = handle.recorded_requests().await;
/// assert_eq!(requests.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEncoder {
    progress: Vec<(i64, f32)>,
    output_bytes: Option<usize>,
    last_frame_timestamp_us: i64,
    failure: Option<String>,
    panic: bool,
    pause_before: Option<usize>,
    resume: Arc<Notify>,
    requests: Arc<RwLock<Vec<EncodeRequest>>>,
}

impl MockEncoder {
    /// Create a mock encoder that succeeds without progress or output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress callbacks `(available_bytes, progress)` sent in order.
    pub fn with_progress(mut self, steps: Vec<(i64, f32)>) -> Self {
        self.progress = steps;
        self
    }

    /// Writes an output file of `bytes` bytes on success.
    pub fn with_output_bytes(mut self, bytes: usize) -> Self {
        self.output_bytes = Some(bytes);
        self
    }

    pub fn with_last_frame_timestamp(mut self, timestamp_us: i64) -> Self {
        self.last_frame_timestamp_us = timestamp_us;
        self
    }

    /// Fails after the scripted progress.
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Panics instead of encoding.
    pub fn with_panic(mut self) -> Self {
        self.panic = true;
        self
    }

    /// Waits for [`resume`](Self::resume) before progress step `step`.
    /// A step equal to the number of steps pauses before finishing.
    pub fn pause_before(mut self, step: usize) -> Self {
        self.pause_before = Some(step);
        self
    }

    /// Lets a paused conversion continue.
    pub fn resume(&self) {
        self.resume.notify_one();
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<EncodeRequest> {
        self.requests.read().await.clone()
    }

    async fn maybe_pause(&self, step: usize) {
        if self.pause_before == Some(step) {
            self.resume.notified().await;
        }
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        request: EncodeRequest,
        callback: Arc<dyn ConversionCallback>,
    ) -> Result<EncodeOutcome, EncoderError> {
        self.requests.write().await.push(request.clone());

        if self.panic {
            panic!("mock encoder panicked");
        }

        for (step, &(bytes, progress)) in self.progress.iter().enumerate() {
            self.maybe_pause(step).await;
            if callback.is_canceled() {
                return Err(EncoderError::Cancelled);
            }
            callback.on_progress(bytes, progress);
            tokio::task::yield_now().await;
        }

        self.maybe_pause(self.progress.len()).await;
        if callback.is_canceled() {
            return Err(EncoderError::Cancelled);
        }

        if let Some(reason) = &self.failure {
            return Err(EncoderError::conversion_failed(reason.clone(), None));
        }

        if let Some(bytes) = self.output_bytes {
            tokio::fs::write(&request.output_path, vec![0u8; bytes]).await?;
        }

        Ok(EncodeOutcome {
            last_frame_timestamp_us: self.last_frame_timestamp_us,
        })
    }
}
