//! Conversion job state and the callback handed to the encoder.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

use super::types::{ConversionEvent, JobState};
use crate::encoder::ConversionCallback;
use crate::metrics;
use crate::planner::{CompressionPlan, EditDescriptors};

/// Output paths owned by jobs that have not finished yet.
pub(crate) type ActiveOutputs = Arc<Mutex<HashSet<PathBuf>>>;

/// Exclusive claim on an output path, released on drop.
#[derive(Debug)]
pub(crate) struct OutputLease {
    path: PathBuf,
    active: ActiveOutputs,
}

impl OutputLease {
    /// Claims `path`, or returns `None` when another job owns it.
    pub(crate) fn acquire(active: &ActiveOutputs, path: &Path) -> Option<Self> {
        let mut outputs = active.lock().unwrap_or_else(PoisonError::into_inner);
        if !outputs.insert(path.to_path_buf()) {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            active: Arc::clone(active),
        })
    }
}

impl Drop for OutputLease {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}

/// Cancels a job from any thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    canceled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// A single conversion, from preparation to its terminal state.
///
/// Created by [`ConversionOrchestrator::prepare`](super::ConversionOrchestrator::prepare)
/// and consumed by [`ConversionOrchestrator::run`](super::ConversionOrchestrator::run).
/// While the job exists its output path is reserved.
#[derive(Debug)]
pub struct ConversionJob {
    pub(crate) id: String,
    pub(crate) source_path: PathBuf,
    pub(crate) output_path: PathBuf,
    pub(crate) plan: CompressionPlan,
    pub(crate) edits: EditDescriptors,
    pub(crate) state: JobState,
    pub(crate) canceled: Arc<AtomicBool>,
    pub(crate) last_reported_size: Arc<AtomicI64>,
    pub(crate) last_frame_timestamp_us: i64,
    pub(crate) created_at: DateTime<Utc>,
    /// Held by the encoder task while it runs.
    pub(crate) lease: Option<OutputLease>,
}

impl ConversionJob {
    pub(crate) fn new(
        source_path: PathBuf,
        plan: CompressionPlan,
        edits: EditDescriptors,
        lease: OutputLease,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_path,
            output_path: lease.path.clone(),
            plan,
            edits,
            state: JobState::Pending,
            canceled: Arc::new(AtomicBool::new(false)),
            last_reported_size: Arc::new(AtomicI64::new(0)),
            last_frame_timestamp_us: 0,
            created_at: Utc::now(),
            lease: Some(lease),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn plan(&self) -> &CompressionPlan {
        &self.plan
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Handle that cancels this job, usable after the job was moved into `run`.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            canceled: Arc::clone(&self.canceled),
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// The callback a running job hands to the encoder.
pub(crate) struct JobCallback {
    pub(crate) job_id: String,
    pub(crate) output_path: PathBuf,
    pub(crate) canceled: Arc<AtomicBool>,
    pub(crate) last_reported_size: Arc<AtomicI64>,
    pub(crate) force_updates: bool,
    pub(crate) events: mpsc::Sender<ConversionEvent>,
}

impl JobCallback {
    fn output_size(&self) -> i64 {
        std::fs::metadata(&self.output_path)
            .map(|m| m.len() as i64)
            .unwrap_or(0)
    }
}

impl ConversionCallback for JobCallback {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    fn on_progress(&self, available_bytes: i64, progress: f32) {
        if self.is_canceled() {
            metrics::PROGRESS_EVENTS.with_label_values(&["canceled"]).inc();
            return;
        }

        let size = if available_bytes < 0 {
            self.output_size()
        } else {
            available_bytes
        };

        if !self.force_updates && self.last_reported_size.load(Ordering::SeqCst) == size {
            metrics::PROGRESS_EVENTS
                .with_label_values(&["unchanged"])
                .inc();
            return;
        }

        let event = ConversionEvent::Progress {
            job_id: self.job_id.clone(),
            output_path: self.output_path.clone(),
            available_bytes: size,
            progress,
        };

        // Non-blocking send
        match self.events.try_send(event) {
            Ok(()) => {
                // Only a delivered size counts as reported
                self.last_reported_size.store(size, Ordering::SeqCst);
                metrics::PROGRESS_EVENTS
                    .with_label_values(&["forwarded"])
                    .inc();
                debug!("Job {} progress {:.3} ({} bytes)", self.job_id, progress, size);
            }
            Err(_) => {
                metrics::PROGRESS_EVENTS.with_label_values(&["dropped"]).inc();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn callback(
        output_path: PathBuf,
        force_updates: bool,
    ) -> (JobCallback, mpsc::Receiver<ConversionEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let callback = JobCallback {
            job_id: "job-1".to_string(),
            output_path,
            canceled: Arc::new(AtomicBool::new(false)),
            last_reported_size: Arc::new(AtomicI64::new(0)),
            force_updates,
            events: tx,
        };
        (callback, rx)
    }

    fn sizes(rx: &mut mpsc::Receiver<ConversionEvent>) -> Vec<i64> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ConversionEvent::Progress {
                available_bytes, ..
            } = event
            {
                out.push(available_bytes);
            }
        }
        out
    }

    #[test]
    fn test_lease_is_exclusive_until_dropped() {
        let active: ActiveOutputs = Arc::default();
        let path = Path::new("/cache/out.mp4");

        let lease = OutputLease::acquire(&active, path).unwrap();
        assert!(OutputLease::acquire(&active, path).is_none());
        assert!(OutputLease::acquire(&active, Path::new("/cache/other.mp4")).is_some());

        drop(lease);
        assert!(OutputLease::acquire(&active, path).is_some());
    }

    #[test]
    fn test_cancel_handle_shares_flag() {
        let active: ActiveOutputs = Arc::default();
        let lease = OutputLease::acquire(&active, Path::new("/cache/out.mp4")).unwrap();
        let plan = crate::testing::fixtures::plan_1080p();
        let job = ConversionJob::new(
            PathBuf::from("/videos/in.mp4"),
            plan,
            EditDescriptors::default(),
            lease,
        );

        let handle = job.cancel_handle();
        let other = handle.clone();
        assert!(!job.is_canceled());
        other.cancel();
        assert!(job.is_canceled());
        assert!(handle.is_canceled());
        assert_eq!(job.state(), JobState::Pending);
        assert_eq!(job.output_path(), Path::new("/cache/out.mp4"));
    }

    #[test]
    fn test_duplicate_sizes_are_suppressed() {
        let (cb, mut rx) = callback(PathBuf::from("/nonexistent/out.mp4"), false);
        cb.on_progress(100, 0.1);
        cb.on_progress(100, 0.2);
        cb.on_progress(250, 0.3);
        cb.on_progress(250, 0.4);
        cb.on_progress(300, 0.5);
        assert_eq!(sizes(&mut rx), vec![100, 250, 300]);
    }

    #[test]
    fn test_forced_updates_forward_everything() {
        let (cb, mut rx) = callback(PathBuf::from("/nonexistent/out.mp4"), true);
        cb.on_progress(100, 0.1);
        cb.on_progress(100, 0.2);
        cb.on_progress(0, 0.3);
        assert_eq!(sizes(&mut rx), vec![100, 100, 0]);
    }

    #[test]
    fn test_unknown_size_reads_output_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.mp4");
        std::fs::write(&output, vec![0u8; 1234]).unwrap();

        let (cb, mut rx) = callback(output, false);
        cb.on_progress(-1, 0.5);
        assert_eq!(sizes(&mut rx), vec![1234]);
    }

    #[test]
    fn test_no_progress_after_cancel() {
        let (cb, mut rx) = callback(PathBuf::from("/nonexistent/out.mp4"), true);
        cb.on_progress(100, 0.1);
        cb.canceled.store(true, Ordering::SeqCst);
        cb.on_progress(200, 0.2);
        assert!(cb.is_canceled());
        assert_eq!(sizes(&mut rx), vec![100]);
    }

    #[test]
    fn test_full_channel_drops_progress() {
        let (tx, mut rx) = mpsc::channel(1);
        let cb = JobCallback {
            job_id: "job-1".to_string(),
            output_path: PathBuf::from("/nonexistent/out.mp4"),
            canceled: Arc::new(AtomicBool::new(false)),
            last_reported_size: Arc::new(AtomicI64::new(0)),
            force_updates: false,
            events: tx,
        };
        cb.on_progress(10, 0.1);
        cb.on_progress(20, 0.2);
        assert_eq!(sizes(&mut rx), vec![10]);
    }

    #[test]
    fn test_dropped_size_is_sent_again() {
        let (tx, mut rx) = mpsc::channel(1);
        let cb = JobCallback {
            job_id: "job-1".to_string(),
            output_path: PathBuf::from("/nonexistent/out.mp4"),
            canceled: Arc::new(AtomicBool::new(false)),
            last_reported_size: Arc::new(AtomicI64::new(0)),
            force_updates: false,
            events: tx,
        };
        cb.on_progress(10, 0.1);
        cb.on_progress(20, 0.2);
        assert_eq!(sizes(&mut rx), vec![10]);

        // 20 never reached the receiver, so it is not a duplicate
        cb.on_progress(20, 0.3);
        assert_eq!(sizes(&mut rx), vec![20]);
        assert_eq!(cb.last_reported_size.load(Ordering::SeqCst), 20);
    }
}
