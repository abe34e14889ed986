use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

pub mod stripe_client;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use stripe_client::StripeGateway;
#[cfg(any(test, feature = "test-utils"))]
pub use fake::FakePaymentGateway;

/// Processor-side status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

impl ChargeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::RequiresPaymentMethod => "requires_payment_method",
            ChargeStatus::RequiresConfirmation => "requires_confirmation",
            ChargeStatus::RequiresAction => "requires_action",
            ChargeStatus::Processing => "processing",
            ChargeStatus::RequiresCapture => "requires_capture",
            ChargeStatus::Canceled => "canceled",
            ChargeStatus::Succeeded => "succeeded",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

/// What a client needs to confirm a charge with the processor's hosted UI.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentHandle {
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSheet {
    #[serde(flatten)]
    pub intent: PaymentIntentHandle,
    pub customer_id: String,
}

#[derive(Debug, Clone)]
pub struct PaymentIntentInfo {
    pub id: String,
    pub status: ChargeStatus,
    pub amount_cents: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, request: ChargeRequest) -> Result<PaymentIntentHandle>;

    /// Creates a processor customer and an intent attached to it.
    async fn create_payment_sheet(&self, request: ChargeRequest) -> Result<PaymentSheet>;

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntentInfo>;
}
