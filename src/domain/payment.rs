//! Payment domain models and types

use serde::{Deserialize, Serialize};

/// Supported settlement currencies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Khr,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Khr => "KHR",
        }
    }

    /// ISO 4217 numeric code used in the KHQR currency field
    pub fn numeric_code(&self) -> &'static str {
        match self {
            Currency::Usd => "840",
            Currency::Khr => "116",
        }
    }

    /// KHR amounts are whole riel; USD carries two decimals
    pub fn format_amount(&self, amount: f64) -> String {
        match self {
            Currency::Usd => format!("{:.2}", amount),
            Currency::Khr => format!("{}", amount.round() as i64),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "KHR" => Ok(Currency::Khr),
            _ => Err(format!("unsupported currency: {}", s)),
        }
    }
}

/// Normalized settlement status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Unpaid,
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Unknown => "UNKNOWN",
        }
    }

    /// Map the upstream's heterogeneous status labels onto the unified enum.
    /// Returns `None` for labels we do not recognize at all.
    pub fn from_upstream_label(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "PAID" | "SUCCESS" => Some(PaymentStatus::Paid),
            "PENDING" => Some(PaymentStatus::Pending),
            "UNPAID" | "FAILED" => Some(PaymentStatus::Unpaid),
            "UNKNOWN" => Some(PaymentStatus::Unknown),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

/// Merchant identity encoded into every KHQR payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerchantIdentity {
    /// Bakong account id, e.g. `merchant@bank`
    pub account_id: String,
    pub name: String,
    pub city: String,
    pub phone_number: Option<String>,
    pub store_label: Option<String>,
    pub terminal_label: Option<String>,
}

/// A payment intent created at checkout time.
///
/// Immutable once created; the order holds the fingerprint as a foreign
/// reference, never a mutable copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Content hash of the canonical payload; the correlation key between
    /// QR generation and settlement lookup
    pub fingerprint: String,

    /// The QR-encodable string; opaque to this service, only round-tripped
    pub qr_payload: String,

    pub amount: f64,
    pub currency: Currency,
    pub bill_number: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A settlement status resolution handed to callers.
///
/// `synthetic` marks results fabricated by the fallback policy while the
/// upstream was unavailable. A synthetic result must never be treated as
/// authoritative payment confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResolution {
    pub status: PaymentStatus,
    pub synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl StatusResolution {
    pub fn confirmed(status: PaymentStatus, transaction_id: Option<String>) -> Self {
        Self {
            status,
            synthetic: false,
            transaction_id,
        }
    }

    pub fn synthetic_unknown() -> Self {
        Self {
            status: PaymentStatus::Unknown,
            synthetic: true,
            transaction_id: None,
        }
    }

    /// Only a non-synthetic PAID resolution may drive fulfillment
    pub fn is_authoritative_paid(&self) -> bool {
        !self.synthetic && self.status.is_paid()
    }
}
