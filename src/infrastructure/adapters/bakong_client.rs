//! Bakong open API adapter
//!
//! HTTP communication with the upstream Bakong payment network. All three
//! settlement-lookup endpoints go through this single adapter so the token
//! header, JSON body handling, and error mapping exist in exactly one place.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::payment::PaymentStatus;
use crate::shared::error::{AppError, AppResult};

/// Response of `POST /v1/check_transaction_by_md5`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckTransactionResponse {
    #[serde(rename = "responseCode")]
    pub response_code: i64,
    #[serde(rename = "responseMessage")]
    pub response_message: Option<String>,
    pub data: Option<SettlementData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementData {
    /// Settlement hash assigned by the network once funds moved
    pub hash: Option<String>,
    #[serde(rename = "fromAccountId")]
    pub from_account_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

impl CheckTransactionResponse {
    /// Normalize the upstream success markers into the unified enum.
    /// A zero response code plus a settlement hash means the payment
    /// completed; code 1 is the network's "not found yet".
    pub fn normalized(&self) -> PaymentStatus {
        let settled = self
            .data
            .as_ref()
            .and_then(|d| d.hash.as_deref())
            .map(|h| !h.is_empty())
            .unwrap_or(false);

        if self.response_code == 0 && settled {
            PaymentStatus::Paid
        } else if self.response_code == 1 {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Unknown
        }
    }

    pub fn settlement_hash(&self) -> Option<String> {
        self.data.as_ref().and_then(|d| d.hash.clone())
    }
}

/// One entry of `POST /v1/bulk_check_payment_status`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkStatusEntry {
    pub md5_hash: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub amount: Option<f64>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct BulkStatusResponse {
    results: Option<Vec<BulkStatusEntry>>,
}

/// Response of `GET /v1/payment_info/{md5}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub status: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub merchant_name: Option<String>,
    pub bill_number: Option<String>,
    pub created_at: Option<String>,
    pub paid_at: Option<String>,
    pub payer_info: Option<serde_json::Value>,
}

/// Upstream payment network capability
#[async_trait]
pub trait PaymentNetwork: Send + Sync {
    async fn check_transaction(&self, fingerprint: &str) -> AppResult<CheckTransactionResponse>;

    async fn bulk_check(&self, fingerprints: &[String]) -> AppResult<Vec<BulkStatusEntry>>;

    async fn payment_info(&self, fingerprint: &str) -> AppResult<PaymentInfo>;
}

/// HTTP adapter for the Bakong open API
pub struct BakongClient {
    config: Arc<AppConfig>,
    client: reqwest::Client,
}

impl BakongClient {
    /// Create the adapter. The HTTP client is built once at startup and
    /// shared across requests.
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.bakong.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn token(&self) -> AppResult<&str> {
        self.config
            .bakong
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::UpstreamUnavailable("Bakong API token not configured".to_string())
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.bakong.api_url.trim_end_matches('/'), path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let max_retries = self.config.bakong.max_retries;
        let mut last_error: Option<String> = None;

        for attempt in 0..=max_retries {
            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .map_err(|e| {
                                AppError::UpstreamUnavailable(format!(
                                    "Failed to parse upstream response: {}",
                                    e
                                ))
                            });
                    }
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(AppError::NotFound(
                            "payment information not found upstream".to_string(),
                        ));
                    }
                    if status.is_client_error() {
                        // 4xx will not improve with retries
                        return Err(AppError::UpstreamUnavailable(format!(
                            "upstream rejected request: {}",
                            status
                        )));
                    }
                    last_error = Some(format!("HTTP error: {}", status));
                }
                Err(e) => {
                    last_error = Some(format!("Request failed: {}", e));
                }
            }

            if attempt < max_retries {
                debug!(
                    "Upstream request failed, retrying... (attempt {}/{})",
                    attempt + 1,
                    max_retries + 1
                );
                tokio::time::sleep(Duration::from_millis(100 * (attempt + 1) as u64)).await;
            }
        }

        Err(AppError::UpstreamUnavailable(format!(
            "upstream request failed after {} attempts: {:?}",
            max_retries + 1,
            last_error
        )))
    }
}

#[async_trait]
impl PaymentNetwork for BakongClient {
    async fn check_transaction(&self, fingerprint: &str) -> AppResult<CheckTransactionResponse> {
        let token = self.token()?.to_string();
        let url = self.url("/v1/check_transaction_by_md5");
        let body = serde_json::json!({ "md5": fingerprint });

        info!(fingerprint = %fingerprint, "Checking transaction settlement upstream");

        self.execute(|| {
            self.client
                .post(&url)
                .bearer_auth(&token)
                .header("Content-Type", "application/json")
                .json(&body)
        })
        .await
    }

    async fn bulk_check(&self, fingerprints: &[String]) -> AppResult<Vec<BulkStatusEntry>> {
        let token = self.token()?.to_string();
        let url = self.url("/v1/bulk_check_payment_status");
        let body = serde_json::json!({ "md5_hashes": fingerprints });

        info!(count = fingerprints.len(), "Bulk-checking settlement upstream");

        let response: BulkStatusResponse = self
            .execute(|| {
                self.client
                    .post(&url)
                    .bearer_auth(&token)
                    .header("Content-Type", "application/json")
                    .json(&body)
            })
            .await?;

        Ok(response.results.unwrap_or_default())
    }

    async fn payment_info(&self, fingerprint: &str) -> AppResult<PaymentInfo> {
        let token = self.token()?.to_string();
        let url = self.url(&format!("/v1/payment_info/{}", fingerprint));

        info!(fingerprint = %fingerprint, "Fetching payment info upstream");

        self.execute(|| self.client.get(&url).bearer_auth(&token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_requires_settlement_hash() {
        let paid = CheckTransactionResponse {
            response_code: 0,
            response_message: None,
            data: Some(SettlementData {
                hash: Some("deadbeef".to_string()),
                from_account_id: None,
                amount: None,
                currency: None,
            }),
        };
        assert_eq!(paid.normalized(), PaymentStatus::Paid);

        // zero response code without a hash is not proof of settlement
        let no_hash = CheckTransactionResponse {
            response_code: 0,
            response_message: None,
            data: None,
        };
        assert_eq!(no_hash.normalized(), PaymentStatus::Unknown);

        let pending = CheckTransactionResponse {
            response_code: 1,
            response_message: Some("Transaction could not be found".to_string()),
            data: None,
        };
        assert_eq!(pending.normalized(), PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_token_degrades_without_network_io() {
        let config = Arc::new(AppConfig::default());
        let client = BakongClient::new(config).unwrap();

        let err = client.check_transaction("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }
}
