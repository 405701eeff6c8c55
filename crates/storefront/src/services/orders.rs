//! Order service: payment processing and order history.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bizoe_core::{NewOrder, Order, OrderId, OrderNumber, UserId};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

/// Errors from the order service.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The payment processor did not answer (simulated network failure).
    #[error("order service unavailable")]
    Unavailable,
}

/// Order processing port.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Charge the payment method and record the order.
    async fn place_order(&self, order: NewOrder) -> Result<Order, OrderError>;

    /// Orders placed by `user_id`, newest first.
    async fn orders_for(&self, user_id: UserId) -> Result<Vec<Order>, OrderError>;
}

/// Keeps orders in memory and always approves the payment after a delay.
#[derive(Debug)]
pub struct MockOrderService {
    latency: Duration,
    orders: RwLock<Vec<Order>>,
    next_id: AtomicI32,
    available: AtomicBool,
}

impl MockOrderService {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            orders: RwLock::new(Vec::new()),
            next_id: AtomicI32::new(1),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage of the payment processor.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    fn check_available(&self) -> Result<(), OrderError> {
        if self.available.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(OrderError::Unavailable)
        }
    }
}

#[async_trait]
impl OrderService for MockOrderService {
    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    async fn place_order(&self, order: NewOrder) -> Result<Order, OrderError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.check_available()?;

        let now = Utc::now();
        let id = OrderId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let order = order.into_order(id, OrderNumber::generate(now, Uuid::new_v4()), now);
        self.orders.write().await.push(order.clone());

        tracing::info!(order_number = %order.number, total = %order.total, "Order placed");
        Ok(order)
    }

    async fn orders_for(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        self.check_available()?;
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .rev()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bizoe_core::{Address, CartTotals, OrderStatus, PaymentStatus};

    use super::*;

    fn new_order(user_id: i32) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user_id),
            items: Vec::new(),
            shipping_address: Address::default(),
            billing_address: Address::default(),
            payment_method: "visa_4242".to_string(),
            totals: CartTotals::empty(),
        }
    }

    #[tokio::test]
    async fn test_place_order_confirms_and_pays() {
        let orders = MockOrderService::new(Duration::ZERO);
        let order = orders.place_order(new_order(1)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(order.number.as_str().starts_with("BIZOE-"));
    }

    #[tokio::test]
    async fn test_history_is_per_user_and_newest_first() {
        let orders = MockOrderService::new(Duration::ZERO);
        let first = orders.place_order(new_order(1)).await.unwrap();
        orders.place_order(new_order(2)).await.unwrap();
        let third = orders.place_order(new_order(1)).await.unwrap();

        let history = orders.orders_for(UserId::new(1)).await.unwrap();
        let ids: Vec<_> = history.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);
        assert!(orders.orders_for(UserId::new(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let orders = MockOrderService::new(Duration::ZERO);
        orders.set_available(false);
        assert!(matches!(
            orders.place_order(new_order(1)).await,
            Err(OrderError::Unavailable)
        ));
    }
}
