//! Conversion lifecycle orchestration.
//!
//! A job goes `Pending → Running → {Succeeded, Failed, Canceled}`:
//! - **prepare**: allocates the output file and reserves it for the job
//! - **run**: drives the encoder, deduplicates its progress callbacks and
//!   reports the terminal state exactly once (canceled jobs stay silent)
//!
//! # Example
//!
//! ```ignore
//! use squeezer_core::orchestrator::{ConversionOrchestrator, ConversionRequest};
//!
//! let orchestrator = ConversionOrchestrator::new(config, encoder, flags);
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//!
//! let job = orchestrator.prepare(request).await?;
//! let cancel = job.cancel_handle();
//! tokio::spawn(async move {
//!     while let Some(event) = rx.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//! let report = orchestrator.run(job, tx).await?;
//! ```

mod config;
mod job;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use job::{CancelHandle, ConversionJob};
pub use runner::ConversionOrchestrator;
pub use types::{ConversionEvent, ConversionReport, ConversionRequest, JobState, OrchestratorError};
