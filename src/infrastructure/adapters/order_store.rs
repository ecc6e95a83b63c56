//! Order record store
//!
//! Read/update access to order payment state. The store contract is the
//! concurrency-correctness mechanism of the whole flow: a transition is a
//! single conditional update executed atomically, so a resolver poll and a
//! webhook racing on the same fingerprint cannot lose updates.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::order::{Order, PaymentTransition, TransitionOutcome};
use crate::shared::error::{AppError, AppResult};

/// Order persistence capability
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> AppResult<()>;

    async fn get(&self, order_id: &str) -> AppResult<Option<Order>>;

    /// Look up the order holding the given PaymentIntent fingerprint
    async fn find_by_transaction(&self, fingerprint: &str) -> AppResult<Option<Order>>;

    /// Apply a payment-state transition as one atomic conditional update.
    /// Returns the stored order after the update together with whether
    /// anything changed.
    async fn apply_transition(
        &self,
        order_id: &str,
        transition: &PaymentTransition,
    ) -> AppResult<(Order, TransitionOutcome)>;
}

/// In-memory order store.
///
/// The write lock around the read-check-write section is what makes
/// `apply_transition` the atomic single-document conditional update the
/// state machine relies on.
pub struct InMemoryOrderStore {
    orders: Arc<tokio::sync::RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> AppResult<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_id) {
            return Err(AppError::InvalidRequest(format!(
                "order {} already exists",
                order.order_id
            )));
        }
        orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> AppResult<Option<Order>> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn find_by_transaction(&self, fingerprint: &str) -> AppResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|o| o.payment.transaction_id.as_deref() == Some(fingerprint))
            .cloned())
    }

    async fn apply_transition(
        &self,
        order_id: &str,
        transition: &PaymentTransition,
    ) -> AppResult<(Order, TransitionOutcome)> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", order_id)))?;

        match order.payment.apply(transition)? {
            TransitionOutcome::Applied(next) => {
                info!(
                    order_id = %order_id,
                    from = %order.payment.status.as_str(),
                    to = %next.status.as_str(),
                    "Order payment state transition"
                );
                order.payment = next.clone();
                order.updated_at = chrono::Utc::now();
                Ok((order.clone(), TransitionOutcome::Applied(next)))
            }
            TransitionOutcome::Unchanged => Ok((order.clone(), TransitionOutcome::Unchanged)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderPaymentState, OrderPaymentStatus, PaymentMethod};
    use crate::domain::payment::{Currency, PaymentStatus};

    fn instant_qr_order(order_id: &str, fingerprint: &str) -> Order {
        let now = chrono::Utc::now();
        Order {
            order_id: order_id.to_string(),
            amount: 12.50,
            currency: Currency::Usd,
            bill_number: "BILL100".to_string(),
            payment: OrderPaymentState::new_for(
                PaymentMethod::InstantQr,
                Some(fingerprint.to_string()),
                None,
            )
            .unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_by_transaction() {
        let store = InMemoryOrderStore::new();
        store.insert(instant_qr_order("o1", "abc123")).await.unwrap();

        let found = store.find_by_transaction("abc123").await.unwrap().unwrap();
        assert_eq!(found.order_id, "o1");
        assert!(store.find_by_transaction("zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transition_is_conditional() {
        let store = InMemoryOrderStore::new();
        store.insert(instant_qr_order("o1", "abc123")).await.unwrap();

        let (order, outcome) = store
            .apply_transition("o1", &PaymentTransition::Settle(PaymentStatus::Paid))
            .await
            .unwrap();
        assert_eq!(order.payment.status, OrderPaymentStatus::Paid);
        assert!(matches!(outcome, TransitionOutcome::Applied(_)));

        // second delivery of the same signal is a no-op
        let (order, outcome) = store
            .apply_transition("o1", &PaymentTransition::Settle(PaymentStatus::Paid))
            .await
            .unwrap();
        assert_eq!(order.payment.status, OrderPaymentStatus::Paid);
        assert_eq!(outcome, TransitionOutcome::Unchanged);

        // contradictory signal is rejected without mutation
        let err = store
            .apply_transition("o1", &PaymentTransition::Settle(PaymentStatus::Unpaid))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition { .. }));
        let unchanged = store.get("o1").await.unwrap().unwrap();
        assert_eq!(unchanged.payment.status, OrderPaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_concurrent_settlement_applies_once() {
        let store = Arc::new(InMemoryOrderStore::new());
        store.insert(instant_qr_order("o1", "abc123")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .apply_transition("o1", &PaymentTransition::Settle(PaymentStatus::Paid))
                    .await
            }));
        }

        let mut applied = 0;
        for handle in handles {
            let (_, outcome) = handle.await.unwrap().unwrap();
            if matches!(outcome, TransitionOutcome::Applied(_)) {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }
}
