//! Settlement status resolver
//!
//! Answers "has this intent been paid yet" for single fingerprints and
//! batches. Batch checks prefer the upstream bulk endpoint and decompose
//! into bounded-parallel single checks when bulk is unavailable. When the
//! fallback policy is enabled, upstream outages surface as resolutions
//! explicitly tagged synthetic instead of errors; a synthetic result is
//! never authoritative.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::payment::{PaymentStatus, StatusResolution};
use crate::infrastructure::adapters::{PaymentInfo, PaymentNetwork};
use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::PaymentMetrics;

/// One fingerprint's place in a batch resolution. Amount and timestamp are
/// passed through from the upstream bulk response when it supplied them.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub fingerprint: String,
    #[serde(flatten)]
    pub resolution: StatusResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

pub struct StatusService {
    config: Arc<AppConfig>,
    network: Arc<dyn PaymentNetwork>,
    metrics: Arc<PaymentMetrics>,
}

impl StatusService {
    pub fn new(
        config: Arc<AppConfig>,
        network: Arc<dyn PaymentNetwork>,
        metrics: Arc<PaymentMetrics>,
    ) -> Self {
        Self {
            config,
            network,
            metrics,
        }
    }

    /// Resolve a single fingerprint against the upstream network
    pub async fn check_one(&self, fingerprint: &str) -> AppResult<StatusResolution> {
        if fingerprint.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "md5 fingerprint is required".to_string(),
            ));
        }

        let result = self
            .network
            .check_transaction(fingerprint)
            .await
            .map(|response| {
                StatusResolution::confirmed(response.normalized(), response.settlement_hash())
            });

        let resolution = self.resolve_with_policy(fingerprint, result)?;
        self.record(&resolution);
        Ok(resolution)
    }

    /// Resolve a batch of fingerprints.
    ///
    /// The output contains exactly one entry per input fingerprint, in input
    /// order. The bulk endpoint is tried first; if it is unavailable the
    /// batch decomposes into single checks with bounded concurrency, and
    /// each failed member degrades independently under the fallback policy.
    pub async fn check_batch(&self, fingerprints: &[String]) -> AppResult<Vec<BatchEntry>> {
        if fingerprints.is_empty() {
            return Err(AppError::InvalidRequest(
                "md5_hashes must not be empty".to_string(),
            ));
        }
        if fingerprints.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::InvalidRequest(
                "md5_hashes must not contain empty entries".to_string(),
            ));
        }

        match self.network.bulk_check(fingerprints).await {
            Ok(entries) => {
                let mut by_hash: HashMap<String, BatchEntry> = entries
                    .into_iter()
                    .map(|e| {
                        let status = PaymentStatus::from_upstream_label(&e.status)
                            .unwrap_or(PaymentStatus::Unknown);
                        (
                            e.md5_hash.clone(),
                            BatchEntry {
                                fingerprint: e.md5_hash,
                                resolution: StatusResolution::confirmed(status, e.transaction_id),
                                amount: e.amount,
                                timestamp: e.timestamp,
                            },
                        )
                    })
                    .collect();

                // reassemble in input order; fingerprints the upstream left
                // out of its response are not confirmed anything
                let results = fingerprints
                    .iter()
                    .map(|fp| {
                        by_hash.remove(fp).unwrap_or_else(|| BatchEntry {
                            fingerprint: fp.clone(),
                            resolution: StatusResolution::synthetic_unknown(),
                            amount: None,
                            timestamp: None,
                        })
                    })
                    .collect::<Vec<_>>();

                for entry in &results {
                    self.record(&entry.resolution);
                }
                Ok(results)
            }
            Err(e) if e.is_fallback_eligible() => {
                warn!(
                    count = fingerprints.len(),
                    "Bulk settlement check unavailable, decomposing into single checks: {}", e
                );
                self.check_batch_decomposed(fingerprints).await
            }
            Err(e) => Err(e),
        }
    }

    /// Fan the batch out as single checks, at most `batch_concurrency` in
    /// flight at once. A failed member degrades to a tagged synthetic entry
    /// instead of poisoning the whole batch.
    async fn check_batch_decomposed(&self, fingerprints: &[String]) -> AppResult<Vec<BatchEntry>> {
        let concurrency = self.config.bakong.batch_concurrency.max(1);

        let resolved: HashMap<String, StatusResolution> =
            stream::iter(fingerprints.iter().cloned())
                .map(|fp| {
                    let network = self.network.clone();
                    async move {
                        let resolution = match network.check_transaction(&fp).await {
                            Ok(response) => StatusResolution::confirmed(
                                response.normalized(),
                                response.settlement_hash(),
                            ),
                            Err(e) => {
                                warn!(
                                    fingerprint = %fp,
                                    "Batch member check failed, degrading to synthetic: {}", e
                                );
                                StatusResolution::synthetic_unknown()
                            }
                        };
                        (fp, resolution)
                    }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        let mut results = Vec::with_capacity(fingerprints.len());
        for fp in fingerprints {
            let resolution = resolved
                .get(fp)
                .cloned()
                .unwrap_or_else(StatusResolution::synthetic_unknown);
            self.record(&resolution);
            results.push(BatchEntry {
                fingerprint: fp.clone(),
                resolution,
                amount: None,
                timestamp: None,
            });
        }
        Ok(results)
    }

    /// Full upstream detail for one fingerprint; passed through unmodified
    pub async fn payment_info(&self, fingerprint: &str) -> AppResult<PaymentInfo> {
        if fingerprint.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "md5 fingerprint is required".to_string(),
            ));
        }
        self.network.payment_info(fingerprint).await
    }

    /// Apply the outage fallback policy to one resolution attempt. Only
    /// upstream unavailability degrades, and only when fallback is enabled;
    /// the substitute is always a tagged synthetic UNKNOWN.
    fn resolve_with_policy(
        &self,
        fingerprint: &str,
        result: AppResult<StatusResolution>,
    ) -> AppResult<StatusResolution> {
        match result {
            Ok(resolution) => Ok(resolution),
            Err(e) if e.is_fallback_eligible() && self.config.fallback.enabled => {
                info!(
                    fingerprint = %fingerprint,
                    "Upstream unavailable, returning synthetic UNKNOWN: {}", e
                );
                Ok(StatusResolution::synthetic_unknown())
            }
            Err(e) => Err(e),
        }
    }

    fn record(&self, resolution: &StatusResolution) {
        self.metrics
            .status_checks
            .with_label_values(&[resolution.status.as_str()])
            .inc();
        if resolution.synthetic {
            self.metrics.synthetic_results.inc();
        }
    }
}
