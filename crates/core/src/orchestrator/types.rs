//! Types for the conversion orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::planner::{CompressionPlan, EditDescriptors};

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The request has no source file.
    #[error("source path is empty")]
    EmptySourcePath,

    /// Another active job writes to the same output file.
    #[error("output path is in use by another job: {}", path.display())]
    OutputBusy { path: PathBuf },

    /// Invalid job state for operation.
    #[error("invalid job state: expected {expected}, got {actual}")]
    InvalidState { expected: JobState, actual: JobState },

    /// A stale output file could not be removed.
    #[error("failed to prepare output {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lifecycle of a conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl JobState {
    /// Whether the job has finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source_path: PathBuf,
    pub plan: CompressionPlan,
    pub edits: EditDescriptors,
}

/// Events sent to the caller while a job runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversionEvent {
    /// The output grew.
    Progress {
        job_id: String,
        output_path: PathBuf,
        available_bytes: i64,
        progress: f32,
    },
    /// The job succeeded or failed. Sent exactly once, never for canceled jobs.
    Finished {
        job_id: String,
        output_path: PathBuf,
        final_size: u64,
        progress: f32,
        last_frame_timestamp_us: i64,
        error: bool,
        plan: CompressionPlan,
    },
}

impl ConversionEvent {
    pub fn job_id(&self) -> &str {
        match self {
            Self::Progress { job_id, .. } | Self::Finished { job_id, .. } => job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Outcome of a job, returned by the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub job_id: String,
    pub output_path: PathBuf,
    pub state: JobState,
    pub final_size: u64,
    pub last_frame_timestamp_us: i64,
    /// Encoder failure message for failed jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}
