//! Bulk generation with a fixed pause between items
//!
//! The resolution provider enforces implicit rate limits, so a batch never
//! runs items concurrently and waits `delay` between two consecutive items.
//! One failing item does not stop the batch.

use crate::error::ErrorKind;
use crate::service::SmartLinkService;
use smlcore::MetadataOverrides;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Default pause between two items (1 second)
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest {
    pub source_url: String,
    pub country_code: Option<String>,
    pub overrides: MetadataOverrides,
}

impl BatchRequest {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    pub fn with_country(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    /// Parses a list with one source URL per line. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse_list(text: &str) -> Vec<BatchRequest> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(BatchRequest::new)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Created {
        source_url: String,
        public_url: String,
        path: PathBuf,
    },
    Failed {
        source_url: String,
        kind: ErrorKind,
        message: String,
    },
}

impl BatchOutcome {
    pub fn source_url(&self) -> &str {
        match self {
            BatchOutcome::Created { source_url, .. } | BatchOutcome::Failed { source_url, .. } => {
                source_url
            }
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, BatchOutcome::Created { .. })
    }
}

/// Per-item outcomes, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_created()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.created()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

impl SmartLinkService {
    /// Generates every request in order, sleeping `delay` between two items
    pub async fn create_batch(&self, requests: &[BatchRequest], delay: Duration) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, request) in requests.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let overrides = (!request.overrides.is_empty()).then_some(&request.overrides);
            let outcome = match self
                .create_from_url(&request.source_url, request.country_code.as_deref(), overrides)
                .await
            {
                Ok(link) => BatchOutcome::Created {
                    source_url: request.source_url.clone(),
                    public_url: link.public_url,
                    path: link.artifact.path,
                },
                Err(e) => {
                    warn!("Batch item {} failed: {}", request.source_url, e);
                    BatchOutcome::Failed {
                        source_url: request.source_url.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            "Batch finished: {} created, {} failed",
            report.created(),
            report.failed()
        );
        report
    }
}
