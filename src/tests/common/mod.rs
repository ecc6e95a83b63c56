//! Shared test utilities: a programmable payment network and fixtures

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::infrastructure::adapters::{
    BulkStatusEntry, CheckTransactionResponse, PaymentInfo, PaymentNetwork, SettlementData,
};
use crate::shared::error::{AppError, AppResult};

/// Programmable stand-in for the Bakong open API.
///
/// Fingerprints registered with `with_paid`/`with_pending` get fixed
/// answers; everything else resolves as the network's "not found yet".
/// `with_outage` makes every call fail and `without_bulk` disables only
/// the bulk endpoint so decomposition paths can be exercised.
pub struct MockPaymentNetwork {
    paid: HashMap<String, String>,
    pending: HashSet<String>,
    failing: HashSet<String>,
    outage: bool,
    bulk_available: bool,
    check_calls: AtomicUsize,
    bulk_calls: AtomicUsize,
}

impl MockPaymentNetwork {
    pub fn new() -> Self {
        Self {
            paid: HashMap::new(),
            pending: HashSet::new(),
            failing: HashSet::new(),
            outage: false,
            bulk_available: true,
            check_calls: AtomicUsize::new(0),
            bulk_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_paid(mut self, fingerprint: &str, transaction_id: &str) -> Self {
        self.paid
            .insert(fingerprint.to_string(), transaction_id.to_string());
        self
    }

    pub fn with_pending(mut self, fingerprint: &str) -> Self {
        self.pending.insert(fingerprint.to_string());
        self
    }

    /// Make single checks for this fingerprint fail while the rest of the
    /// network keeps answering
    pub fn with_failing(mut self, fingerprint: &str) -> Self {
        self.failing.insert(fingerprint.to_string());
        self
    }

    pub fn with_outage(mut self) -> Self {
        self.outage = true;
        self
    }

    pub fn without_bulk(mut self) -> Self {
        self.bulk_available = false;
        self
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockPaymentNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentNetwork for MockPaymentNetwork {
    async fn check_transaction(&self, fingerprint: &str) -> AppResult<CheckTransactionResponse> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if self.outage {
            return Err(AppError::UpstreamUnavailable("mock outage".to_string()));
        }
        if self.failing.contains(fingerprint) {
            return Err(AppError::UpstreamUnavailable(format!(
                "mock failure for {}",
                fingerprint
            )));
        }

        if let Some(transaction_id) = self.paid.get(fingerprint) {
            Ok(CheckTransactionResponse {
                response_code: 0,
                response_message: Some("Success".to_string()),
                data: Some(SettlementData {
                    hash: Some(transaction_id.clone()),
                    from_account_id: Some("payer@devbank".to_string()),
                    amount: Some(12.50),
                    currency: Some("USD".to_string()),
                }),
            })
        } else {
            Ok(CheckTransactionResponse {
                response_code: 1,
                response_message: Some("Transaction could not be found".to_string()),
                data: None,
            })
        }
    }

    async fn bulk_check(&self, fingerprints: &[String]) -> AppResult<Vec<BulkStatusEntry>> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if self.outage {
            return Err(AppError::UpstreamUnavailable("mock outage".to_string()));
        }
        if !self.bulk_available {
            return Err(AppError::UpstreamUnavailable(
                "bulk endpoint disabled".to_string(),
            ));
        }

        Ok(fingerprints
            .iter()
            .filter_map(|fp| {
                if let Some(transaction_id) = self.paid.get(fp) {
                    Some(BulkStatusEntry {
                        md5_hash: fp.clone(),
                        status: "PAID".to_string(),
                        transaction_id: Some(transaction_id.clone()),
                        amount: Some(12.50),
                        timestamp: Some(1_700_000_000),
                    })
                } else if self.pending.contains(fp) {
                    Some(BulkStatusEntry {
                        md5_hash: fp.clone(),
                        status: "PENDING".to_string(),
                        transaction_id: None,
                        amount: None,
                        timestamp: None,
                    })
                } else {
                    None
                }
            })
            .collect())
    }

    async fn payment_info(&self, fingerprint: &str) -> AppResult<PaymentInfo> {
        if self.outage {
            return Err(AppError::UpstreamUnavailable("mock outage".to_string()));
        }

        match self.paid.get(fingerprint) {
            Some(transaction_id) => Ok(PaymentInfo {
                status: Some("PAID".to_string()),
                transaction_id: Some(transaction_id.clone()),
                amount: Some(12.50),
                currency: Some("USD".to_string()),
                merchant_name: Some("Baby Bear".to_string()),
                bill_number: Some("BILL100".to_string()),
                created_at: None,
                paid_at: None,
                payer_info: None,
            }),
            None => Err(AppError::NotFound(
                "payment information not found upstream".to_string(),
            )),
        }
    }
}
