use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use sprint_core::error::ReservationError;
use sprint_core::payment::{GatewayOrder, PaymentGateway};
use tracing::info;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 over `"{order_id}|{payment_id}"`, the checkout
/// callback signature scheme.
pub fn sign_payload(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn verify_payload(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    // verify_slice is constant-time.
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Razorpay Orders API client.
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OrderCreated {
    id: String,
    amount: i64,
    currency: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id,
            key_secret,
            base_url,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        booking_id: Uuid,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ReservationError> {
        let body = serde_json::json!({
            "amount": amount,
            "currency": currency,
            "receipt": receipt,
            "notes": { "booking_id": booking_id },
        });

        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(ReservationError::gateway)?;

        if !response.status().is_success() {
            return Err(ReservationError::Gateway(format!(
                "order creation returned {}",
                response.status()
            )));
        }

        let order: OrderCreated = response.json().await.map_err(ReservationError::gateway)?;
        info!(order_id = %order.id, %booking_id, "gateway order created");

        Ok(GatewayOrder {
            id: order.id,
            booking_id,
            amount: order.amount,
            currency: order.currency,
            created_at: Utc::now(),
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_payload(&self.key_secret, order_id, payment_id, signature)
    }
}

/// In-process gateway for tests: same signature scheme, no network.
pub struct MockGateway {
    key_id: String,
    key_secret: String,
    fail_orders: bool,
}

impl MockGateway {
    pub fn new(key_id: &str, key_secret: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            fail_orders: false,
        }
    }

    /// Simulate an upstream outage on order creation.
    pub fn failing(key_id: &str, key_secret: &str) -> Self {
        Self {
            fail_orders: true,
            ..Self::new(key_id, key_secret)
        }
    }

    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        sign_payload(&self.key_secret, order_id, payment_id)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        booking_id: Uuid,
        amount: i64,
        currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder, ReservationError> {
        if self.fail_orders {
            return Err(ReservationError::Gateway(
                "simulated gateway outage".to_string(),
            ));
        }

        Ok(GatewayOrder {
            id: format!("order_mock_{}", booking_id.simple()),
            booking_id,
            amount,
            currency: currency.to_string(),
            created_at: Utc::now(),
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_payload(&self.key_secret, order_id, payment_id, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";

    #[test]
    fn signature_round_trip() {
        let sig = sign_payload(SECRET, "order_abc", "pay_xyz");
        assert!(verify_payload(SECRET, "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn tampered_payment_id_is_rejected() {
        let sig = sign_payload(SECRET, "order_abc", "pay_xyz");
        assert!(!verify_payload(SECRET, "order_abc", "pay_other", &sig));
        assert!(!verify_payload("other_secret", "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(!verify_payload(SECRET, "order_abc", "pay_xyz", "not-hex!"));
        assert!(!verify_payload(SECRET, "order_abc", "pay_xyz", ""));
    }

    #[tokio::test]
    async fn mock_gateway_orders_and_verifies() {
        let gateway = MockGateway::new("rzp_test_key", SECRET);
        let booking_id = Uuid::new_v4();

        let order = gateway
            .create_order(booking_id, 499_900, "INR", "LC-ABC123")
            .await
            .unwrap();
        assert!(order.id.starts_with("order_mock_"));
        assert_eq!(order.amount, 499_900);

        let sig = gateway.sign(&order.id, "pay_1");
        assert!(gateway.verify_signature(&order.id, "pay_1", &sig));
        assert!(!gateway.verify_signature(&order.id, "pay_2", &sig));
    }

    #[tokio::test]
    async fn failing_mock_surfaces_gateway_error() {
        let gateway = MockGateway::failing("rzp_test_key", SECRET);
        let err = gateway
            .create_order(Uuid::new_v4(), 499_900, "INR", "LC-ABC123")
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Gateway(_)));
    }
}
