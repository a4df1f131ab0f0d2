//! Mock metadata probe for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::probe::{MetadataProbe, ProbeReport};

/// Mock implementation of the MetadataProbe trait.
///
/// Unknown paths get the default report, which is empty unless set.
#[derive(Debug, Default)]
pub struct MockProbe {
    reports: Arc<RwLock<HashMap<PathBuf, ProbeReport>>>,
    default_report: Arc<RwLock<ProbeReport>>,
    calls: AtomicUsize,
}

impl MockProbe {
    /// Create a new mock probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report for a specific path.
    pub async fn set_report(&self, path: impl AsRef<Path>, report: ProbeReport) {
        self.reports
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), report);
    }

    /// Set the report for paths without their own.
    pub async fn set_default_report(&self, report: ProbeReport) {
        *self.default_report.write().await = report;
    }

    /// Number of probes performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProbe for MockProbe {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> ProbeReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(report) = self.reports.read().await.get(path) {
            return *report;
        }
        *self.default_report.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_by_path() {
        let probe = MockProbe::new();
        probe
            .set_report(
                "/videos/a.mp4",
                ProbeReport {
                    width: 1920,
                    height: 1080,
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(probe.probe(Path::new("/videos/a.mp4")).await.width, 1920);
        assert!(probe.probe(Path::new("/videos/b.mp4")).await.is_empty());
        assert_eq!(probe.call_count(), 2);
    }
}
