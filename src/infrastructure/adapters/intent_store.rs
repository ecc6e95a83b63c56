//! Payment intent store
//!
//! Keeps created intents addressable by fingerprint. Redis is an optional
//! mirror; the in-memory map is always active, so the service keeps working
//! when the cache is disabled or unreachable.

use std::collections::HashMap;
use std::sync::Arc;

use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::payment::PaymentIntent;
use crate::shared::error::{AppError, AppResult};

#[derive(Clone)]
pub struct IntentStore {
    redis: Option<Arc<ConnectionManager>>,
    memory: Arc<tokio::sync::RwLock<HashMap<String, PaymentIntent>>>,
    ttl_seconds: u64,
}

impl IntentStore {
    pub fn new(redis: Option<Arc<ConnectionManager>>, ttl_seconds: u64) -> Self {
        Self {
            redis,
            memory: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            ttl_seconds,
        }
    }

    /// Connect the Redis mirror if the cache is enabled. Connection
    /// failures degrade to memory-only operation instead of aborting
    /// startup.
    pub async fn connect(config: &AppConfig) -> Self {
        let redis = if config.cache.enabled {
            match redis::Client::open(config.cache.redis_url.as_str()) {
                Ok(client) => match ConnectionManager::new(client).await {
                    Ok(manager) => Some(Arc::new(manager)),
                    Err(e) => {
                        warn!("Redis unavailable, intent store is memory-only: {}", e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Invalid Redis URL, intent store is memory-only: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self::new(redis, config.cache.intent_ttl_seconds)
    }

    fn key(fingerprint: &str) -> String {
        format!("intents:{}", fingerprint)
    }

    pub async fn put(&self, intent: &PaymentIntent) -> AppResult<()> {
        let serialized = serde_json::to_vec(intent)
            .map_err(|e| AppError::Internal(format!("serialize intent: {}", e)))?;

        if let Some(redis) = &self.redis {
            let mut conn = (**redis).clone();
            let key = Self::key(&intent.fingerprint);
            let _: () = conn
                .set_ex(key, serialized, self.ttl_seconds)
                .await
                .map_err(|e| AppError::Internal(format!("redis set: {}", e)))?;
        }

        // Always mirror to memory
        self.memory
            .write()
            .await
            .insert(intent.fingerprint.clone(), intent.clone());
        Ok(())
    }

    pub async fn get(&self, fingerprint: &str) -> AppResult<Option<PaymentIntent>> {
        if let Some(redis) = &self.redis {
            let mut conn = (**redis).clone();
            let key = Self::key(fingerprint);
            let data: Option<Vec<u8>> = conn
                .get(key)
                .await
                .map_err(|e| AppError::Internal(format!("redis get: {}", e)))?;
            if let Some(bytes) = data {
                let intent: PaymentIntent = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::Internal(format!("deserialize intent: {}", e)))?;
                self.memory
                    .write()
                    .await
                    .insert(fingerprint.to_string(), intent.clone());
                return Ok(Some(intent));
            }
        }
        Ok(self.memory.read().await.get(fingerprint).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::Currency;

    #[tokio::test]
    async fn test_memory_roundtrip_without_redis() {
        let store = IntentStore::new(None, 3600);
        let intent = PaymentIntent {
            fingerprint: "abc123".to_string(),
            qr_payload: "000201...".to_string(),
            amount: 12.50,
            currency: Currency::Usd,
            bill_number: "BILL100".to_string(),
            created_at: chrono::Utc::now(),
        };

        store.put(&intent).await.unwrap();
        let loaded = store.get("abc123").await.unwrap().unwrap();
        assert_eq!(loaded.bill_number, "BILL100");
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
