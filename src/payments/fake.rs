use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    payments::{
        ChargeRequest, ChargeStatus, PaymentGateway, PaymentIntentHandle, PaymentIntentInfo,
        PaymentSheet,
    },
};

/// In-memory processor. Intents start as `RequiresPaymentMethod`; tests move
/// them along with [`FakePaymentGateway::set_status`].
#[derive(Default)]
pub struct FakePaymentGateway {
    intents: RwLock<HashMap<String, PaymentIntentInfo>>,
    next_id: AtomicU64,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an intent directly, as if the client had already confirmed it.
    pub async fn insert_intent(&self, id: &str, status: ChargeStatus, amount_cents: i64, currency: &str) {
        self.intents.write().await.insert(
            id.to_string(),
            PaymentIntentInfo {
                id: id.to_string(),
                status,
                amount_cents,
                currency: currency.to_string(),
                metadata: HashMap::new(),
            },
        );
    }

    pub async fn set_status(&self, id: &str, status: ChargeStatus) -> bool {
        match self.intents.write().await.get_mut(id) {
            Some(intent) => {
                intent.status = status;
                true
            }
            None => false,
        }
    }

    pub async fn intent(&self, id: &str) -> Option<PaymentIntentInfo> {
        self.intents.read().await.get(id).cloned()
    }

    async fn store(&self, request: ChargeRequest) -> PaymentIntentHandle {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("pi_fake_{}", n);
        let handle = PaymentIntentHandle {
            payment_intent_id: id.clone(),
            client_secret: format!("{}_secret_fake", id),
            amount_cents: request.amount_cents,
            currency: request.currency.clone(),
        };
        self.intents.write().await.insert(
            id.clone(),
            PaymentIntentInfo {
                id,
                status: ChargeStatus::RequiresPaymentMethod,
                amount_cents: request.amount_cents,
                currency: request.currency,
                metadata: request.metadata,
            },
        );
        handle
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_payment_intent(&self, request: ChargeRequest) -> Result<PaymentIntentHandle> {
        Ok(self.store(request).await)
    }

    async fn create_payment_sheet(&self, request: ChargeRequest) -> Result<PaymentSheet> {
        let n = self.next_id.load(Ordering::SeqCst) + 1;
        Ok(PaymentSheet {
            intent: self.store(request).await,
            customer_id: format!("cus_fake_{}", n),
        })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntentInfo> {
        self.intents
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::Payment(format!("No such payment intent: {}", id)))
    }
}
