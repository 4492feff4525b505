use crate::error::ReservationError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An order created with the payment provider for a fixed-amount charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Provider's order id (e.g. `order_Nxy123`).
    pub id: String,
    pub booking_id: Uuid,
    /// Amount in the currency's minor unit (paise).
    pub amount: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order with the provider. Must not mutate any local
    /// state; the caller persists the returned reference only on success.
    async fn create_order(
        &self,
        booking_id: Uuid,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ReservationError>;

    /// Public key id handed to the checkout widget.
    fn key_id(&self) -> &str;

    /// Check the checkout callback signature against the order/payment
    /// pair. Implementations must compare in constant time.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}
