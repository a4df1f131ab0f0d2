//! Trait definitions for the encoder module.

use async_trait::async_trait;
use std::sync::Arc;

use super::error::EncoderError;
use super::types::{EncodeOutcome, EncodeRequest};

/// Hooks the encoder calls back into while it writes the output.
///
/// Both methods may be called from the encoder's worker thread.
pub trait ConversionCallback: Send + Sync {
    /// Whether the job was canceled. Encoders poll this at least once per
    /// written chunk and stop as soon as it returns `true`.
    fn is_canceled(&self) -> bool;

    /// Reports output progress. A negative `available_bytes` means the
    /// encoder does not know the output size.
    fn on_progress(&self, available_bytes: i64, progress: f32);
}

/// An encoder that transcodes a source according to a compression plan.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Encodes `request.source_path` into `request.output_path`.
    ///
    /// Returns [`EncoderError::Cancelled`] when it stopped because the
    /// callback reported cancellation.
    async fn convert(
        &self,
        request: EncodeRequest,
        callback: Arc<dyn ConversionCallback>,
    ) -> Result<EncodeOutcome, EncoderError>;

    /// Validates that the encoder is properly configured and ready.
    async fn validate(&self) -> Result<(), EncoderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::EditDescriptors;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct ChunkedEncoder {
        chunks: usize,
    }

    #[async_trait]
    impl Encoder for ChunkedEncoder {
        fn name(&self) -> &str {
            "chunked"
        }

        async fn convert(
            &self,
            _request: EncodeRequest,
            callback: Arc<dyn ConversionCallback>,
        ) -> Result<EncodeOutcome, EncoderError> {
            for i in 1..=self.chunks {
                if callback.is_canceled() {
                    return Err(EncoderError::Cancelled);
                }
                callback.on_progress(i as i64 * 100, i as f32 / self.chunks as f32);
            }
            Ok(EncodeOutcome {
                last_frame_timestamp_us: 33_333,
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        canceled: AtomicBool,
        seen: Mutex<Vec<i64>>,
    }

    impl ConversionCallback for Recorder {
        fn is_canceled(&self) -> bool {
            self.canceled.load(Ordering::SeqCst)
        }

        fn on_progress(&self, available_bytes: i64, _progress: f32) {
            self.seen.lock().unwrap().push(available_bytes);
            if available_bytes >= 200 {
                self.canceled.store(true, Ordering::SeqCst);
            }
        }
    }

    fn request() -> EncodeRequest {
        EncodeRequest {
            source_path: PathBuf::from("/in.mp4"),
            output_path: PathBuf::from("/out.mp4"),
            rotation: 0,
            target_width: 640,
            target_height: 480,
            framerate: 25,
            target_bitrate_bps: 400_000,
            original_bitrate_bps: 500_000,
            trim_start_ms: -1,
            trim_end_ms: -1,
            avatar_start_ms: -1,
            needs_compress: true,
            duration_ms: 1_000,
            edits: EditDescriptors::default(),
        }
    }

    #[tokio::test]
    async fn test_encoder_stops_on_cancel() {
        let encoder = ChunkedEncoder { chunks: 5 };
        let recorder = Arc::new(Recorder::default());
        let result = encoder.convert(request(), recorder.clone()).await;

        assert!(matches!(result, Err(EncoderError::Cancelled)));
        assert_eq!(*recorder.seen.lock().unwrap(), vec![100, 200]);
    }

    #[tokio::test]
    async fn test_default_validate() {
        let encoder = ChunkedEncoder { chunks: 1 };
        assert!(encoder.validate().await.is_ok());
        assert_eq!(encoder.name(), "chunked");
    }
}
