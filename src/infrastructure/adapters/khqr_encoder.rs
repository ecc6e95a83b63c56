//! KHQR encoder capability
//!
//! Builds the EMV-style tag/length/value payload for a Bakong KHQR payment
//! and derives its MD5 fingerprint. The fingerprint is the correlation key
//! between QR generation and settlement lookup, so the payload is a pure
//! function of its inputs: no clock, no randomness. (Real dynamic KHQR
//! carries a creation-timestamp tag; it is omitted here deliberately.)

use md5::{Digest, Md5};

use crate::domain::payment::{Currency, MerchantIdentity};
use crate::shared::error::{AppError, AppResult};

// EMV merchant-presented-mode tags
const TAG_PAYLOAD_FORMAT: &str = "00";
const TAG_POINT_OF_INITIATION: &str = "01";
const TAG_MERCHANT_ACCOUNT: &str = "29";
const TAG_MERCHANT_CATEGORY: &str = "52";
const TAG_CURRENCY: &str = "53";
const TAG_AMOUNT: &str = "54";
const TAG_COUNTRY: &str = "58";
const TAG_MERCHANT_NAME: &str = "59";
const TAG_MERCHANT_CITY: &str = "60";
const TAG_ADDITIONAL_DATA: &str = "62";
const TAG_CRC: &str = "63";

const SUB_ACCOUNT_ID: &str = "00";
const SUB_BILL_NUMBER: &str = "01";
const SUB_MOBILE_NUMBER: &str = "02";
const SUB_STORE_LABEL: &str = "05";
const SUB_TERMINAL_LABEL: &str = "07";

/// Canonical inputs for one payment request
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub merchant: MerchantIdentity,
    pub amount: f64,
    pub currency: Currency,
    pub bill_number: String,
}

/// Encoder output: the QR payload and its content fingerprint
#[derive(Debug, Clone)]
pub struct EncodedQr {
    pub qr_payload: String,
    pub fingerprint: String,
}

/// Encoder capability consumed by the intent builder
pub trait QrEncoder: Send + Sync {
    fn encode(&self, request: &EncodeRequest) -> AppResult<EncodedQr>;
}

/// In-process KHQR encoder
pub struct KhqrEncoder;

impl KhqrEncoder {
    pub fn new() -> Self {
        Self
    }

    fn validate(request: &EncodeRequest) -> AppResult<()> {
        let merchant = &request.merchant;

        if !merchant.account_id.contains('@') || merchant.account_id.len() > 32 {
            return Err(encoding_error(
                "KHQR_ACCOUNT_ID_INVALID",
                "bakong account id must be account@bank, at most 32 characters",
            ));
        }
        if merchant.name.is_empty() || merchant.name.len() > 25 {
            return Err(encoding_error(
                "KHQR_MERCHANT_NAME_INVALID",
                "merchant name must be 1-25 characters",
            ));
        }
        if merchant.city.is_empty() || merchant.city.len() > 15 {
            return Err(encoding_error(
                "KHQR_MERCHANT_CITY_INVALID",
                "merchant city must be 1-15 characters",
            ));
        }
        if request.bill_number.is_empty() || request.bill_number.len() > 25 {
            return Err(encoding_error(
                "KHQR_BILL_NUMBER_INVALID",
                "bill number must be 1-25 characters",
            ));
        }
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(encoding_error(
                "KHQR_AMOUNT_INVALID",
                "amount must be a positive number",
            ));
        }

        Ok(())
    }
}

impl Default for KhqrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrEncoder for KhqrEncoder {
    fn encode(&self, request: &EncodeRequest) -> AppResult<EncodedQr> {
        Self::validate(request)?;

        let merchant = &request.merchant;

        let mut payload = String::new();
        push_tlv(&mut payload, TAG_PAYLOAD_FORMAT, "01")?;
        // "12" marks a dynamic QR: one scan, one payment
        push_tlv(&mut payload, TAG_POINT_OF_INITIATION, "12")?;

        let mut account = String::new();
        push_tlv(&mut account, SUB_ACCOUNT_ID, &merchant.account_id)?;
        push_tlv(&mut payload, TAG_MERCHANT_ACCOUNT, &account)?;

        push_tlv(&mut payload, TAG_MERCHANT_CATEGORY, "5999")?;
        push_tlv(&mut payload, TAG_CURRENCY, request.currency.numeric_code())?;
        push_tlv(
            &mut payload,
            TAG_AMOUNT,
            &request.currency.format_amount(request.amount),
        )?;
        push_tlv(&mut payload, TAG_COUNTRY, "KH")?;
        push_tlv(&mut payload, TAG_MERCHANT_NAME, &merchant.name)?;
        push_tlv(&mut payload, TAG_MERCHANT_CITY, &merchant.city)?;

        let mut additional = String::new();
        push_tlv(&mut additional, SUB_BILL_NUMBER, &request.bill_number)?;
        if let Some(phone) = &merchant.phone_number {
            push_tlv(&mut additional, SUB_MOBILE_NUMBER, phone)?;
        }
        if let Some(store) = &merchant.store_label {
            push_tlv(&mut additional, SUB_STORE_LABEL, store)?;
        }
        if let Some(terminal) = &merchant.terminal_label {
            push_tlv(&mut additional, SUB_TERMINAL_LABEL, terminal)?;
        }
        push_tlv(&mut payload, TAG_ADDITIONAL_DATA, &additional)?;

        // CRC is computed over everything up to and including its own
        // tag and length
        payload.push_str(TAG_CRC);
        payload.push_str("04");
        let crc = crc16_ccitt(payload.as_bytes());
        payload.push_str(&format!("{:04X}", crc));

        let mut hasher = Md5::new();
        hasher.update(payload.as_bytes());
        let fingerprint = hex::encode(hasher.finalize());

        Ok(EncodedQr {
            qr_payload: payload,
            fingerprint,
        })
    }
}

fn encoding_error(code: &str, message: &str) -> AppError {
    AppError::Encoding {
        code: code.to_string(),
        message: message.to_string(),
    }
}

fn push_tlv(out: &mut String, tag: &str, value: &str) -> AppResult<()> {
    let len = value.len();
    if len == 0 || len > 99 {
        return Err(encoding_error(
            "KHQR_FIELD_LENGTH_INVALID",
            &format!("field {} must be 1-99 bytes, got {}", tag, len),
        ));
    }
    out.push_str(tag);
    out.push_str(&format!("{:02}", len));
    out.push_str(value);
    Ok(())
}

/// CRC-16/CCITT-FALSE, the checksum EMV QR payloads carry in tag 63
fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
