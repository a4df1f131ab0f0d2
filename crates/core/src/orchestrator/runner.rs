//! Conversion orchestrator implementation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::encoder::{EncodeOutcome, EncodeRequest, Encoder, EncoderError};
use crate::metrics;
use crate::state::FlagStore;

use super::config::OrchestratorConfig;
use super::job::{ActiveOutputs, ConversionJob, JobCallback, OutputLease};
use super::types::{
    ConversionEvent, ConversionReport, ConversionRequest, JobState, OrchestratorError,
};

/// Spawned encoder task of a running job.
///
/// Dropping it before the task finished cancels the job and aborts the task,
/// so an abandoned `run` does not leave an encoder writing in the background.
/// The output lease lives inside the task and is released only once the task
/// is gone.
struct EncoderTask<T> {
    handle: JoinHandle<T>,
    canceled: Arc<AtomicBool>,
}

impl<T> Drop for EncoderTask<T> {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            self.canceled.store(true, Ordering::SeqCst);
            self.handle.abort();
        }
    }
}

/// Drives single conversion jobs through the encoder.
///
/// Each job owns its output file until it reaches a terminal state; the
/// orchestrator refuses to prepare a second job for a path that is still
/// in use.
pub struct ConversionOrchestrator {
    config: OrchestratorConfig,
    encoder: Arc<dyn Encoder>,
    flags: Arc<dyn FlagStore>,
    active_outputs: ActiveOutputs,
}

impl ConversionOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        encoder: Arc<dyn Encoder>,
        flags: Arc<dyn FlagStore>,
    ) -> Self {
        Self {
            config,
            encoder,
            flags,
            active_outputs: ActiveOutputs::default(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Number of jobs that still own their output file.
    pub fn active_jobs(&self) -> usize {
        self.active_outputs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Prepares a job writing to a fresh file in the cache directory.
    ///
    /// The file name carries a random suffix after the timestamp, so jobs
    /// prepared within the same millisecond never share an output.
    pub async fn prepare(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionJob, OrchestratorError> {
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let output_path = self.config.cache_dir.join(
            self.config
                .output_file_name(Utc::now().timestamp_millis(), &unique),
        );
        self.prepare_with_output(request, output_path).await
    }

    /// Prepares a job writing to `output_path`.
    ///
    /// A leftover file at that path is deleted.
    pub async fn prepare_with_output(
        &self,
        request: ConversionRequest,
        output_path: PathBuf,
    ) -> Result<ConversionJob, OrchestratorError> {
        if request.source_path.as_os_str().is_empty() {
            return Err(OrchestratorError::EmptySourcePath);
        }

        let lease = OutputLease::acquire(&self.active_outputs, &output_path).ok_or_else(|| {
            OrchestratorError::OutputBusy {
                path: output_path.clone(),
            }
        })?;

        match tokio::fs::remove_file(&output_path).await {
            Ok(()) => {
                metrics::STALE_OUTPUTS_DELETED.inc();
                info!("Deleted stale output {:?}", output_path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(OrchestratorError::Io {
                    path: output_path,
                    source: e,
                })
            }
        }

        let job = ConversionJob::new(request.source_path, request.plan, request.edits, lease);
        info!(
            "Prepared job {}: {:?} -> {:?}",
            job.id(),
            job.source_path(),
            job.output_path()
        );
        Ok(job)
    }

    /// Runs a prepared job to its terminal state.
    ///
    /// Progress is forwarded to `events` without blocking. Unless the job was
    /// canceled, exactly one [`ConversionEvent::Finished`] follows. Encoder
    /// failures and panics end the job as [`JobState::Failed`]; they are not
    /// returned as errors.
    pub async fn run(
        &self,
        mut job: ConversionJob,
        events: mpsc::Sender<ConversionEvent>,
    ) -> Result<ConversionReport, OrchestratorError> {
        if job.state != JobState::Pending {
            return Err(OrchestratorError::InvalidState {
                expected: JobState::Pending,
                actual: job.state,
            });
        }

        let started = Instant::now();
        job.state = JobState::Running;
        info!(
            "Job {} running with {} (reencode={})",
            job.id,
            self.encoder.name(),
            job.plan.needs_reencode
        );

        let request =
            EncodeRequest::from_plan(&job.source_path, job.output_path(), &job.plan, &job.edits);
        let callback = Arc::new(JobCallback {
            job_id: job.id.clone(),
            output_path: job.output_path().to_path_buf(),
            canceled: Arc::clone(&job.canceled),
            last_reported_size: Arc::clone(&job.last_reported_size),
            force_updates: self.config.force_progress_updates,
            events: events.clone(),
        });

        // The encoder runs on its own task so a panic ends the job instead of the caller.
        let encoder = Arc::clone(&self.encoder);
        let lease = job.lease.take();
        let mut task = EncoderTask {
            handle: tokio::spawn(async move {
                let result = encoder.convert(request, callback).await;
                (result, lease)
            }),
            canceled: Arc::clone(&job.canceled),
        };
        let result: Result<EncodeOutcome, EncoderError> = match (&mut task.handle).await {
            Ok((result, lease)) => {
                job.lease = lease;
                result
            }
            Err(e) => {
                error!("Encoder task for job {} failed: {}", job.id, e);
                Err(EncoderError::conversion_failed(
                    format!("encoder task failed: {}", e),
                    None,
                ))
            }
        };

        let mut failure = None;
        job.state = if job.is_canceled() {
            JobState::Canceled
        } else {
            match result {
                Ok(outcome) => {
                    job.last_frame_timestamp_us = outcome.last_frame_timestamp_us;
                    JobState::Succeeded
                }
                Err(e) => {
                    warn!("Job {} failed: {}", job.id, e);
                    failure = Some(e.to_string());
                    JobState::Failed
                }
            }
        };

        let final_size = tokio::fs::metadata(job.output_path())
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        if job.state != JobState::Canceled {
            let event = ConversionEvent::Finished {
                job_id: job.id.clone(),
                output_path: job.output_path().to_path_buf(),
                final_size,
                progress: 1.0,
                last_frame_timestamp_us: job.last_frame_timestamp_us,
                error: job.state == JobState::Failed,
                plan: job.plan.clone(),
            };
            if events.send(event).await.is_err() {
                warn!("Event receiver for job {} is gone", job.id);
            }
        }

        if job.state == JobState::Succeeded {
            if let Err(e) = self.flags.set_previous_ok(true).await {
                warn!("Failed to store previous-run flag: {}", e);
            }
        }

        let elapsed = started.elapsed();
        metrics::CONVERSIONS
            .with_label_values(&[job.state.as_str()])
            .inc();
        metrics::CONVERSION_DURATION
            .with_label_values(&[job.state.as_str()])
            .observe(elapsed.as_secs_f64());

        info!(
            "Job {} {} after {} ms ({} bytes)",
            job.id,
            job.state,
            elapsed.as_millis(),
            final_size
        );

        Ok(ConversionReport {
            job_id: job.id.clone(),
            output_path: job.output_path().to_path_buf(),
            state: job.state,
            final_size,
            last_frame_timestamp_us: job.last_frame_timestamp_us,
            error: failure,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    /// Prepares and runs a job.
    pub async fn run_to_completion(
        &self,
        request: ConversionRequest,
        events: mpsc::Sender<ConversionEvent>,
    ) -> Result<ConversionReport, OrchestratorError> {
        let job = self.prepare(request).await?;
        self.run(job, events).await
    }
}
