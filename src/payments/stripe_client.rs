use async_trait::async_trait;
use stripe::{
    Client, CreateCustomer, CreatePaymentIntent, CreatePaymentIntentAutomaticPaymentMethods,
    Currency, Customer, PaymentIntent, PaymentIntentId, PaymentIntentStatus,
};

use crate::{
    error::{AppError, Result},
    payments::{
        ChargeRequest, ChargeStatus, PaymentGateway, PaymentIntentHandle, PaymentIntentInfo,
        PaymentSheet,
    },
};

pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(api_key),
        }
    }

    fn parse_currency(currency: &str) -> Result<Currency> {
        match currency.to_lowercase().as_str() {
            "eur" => Ok(Currency::EUR),
            "usd" => Ok(Currency::USD),
            "gbp" => Ok(Currency::GBP),
            "chf" => Ok(Currency::CHF),
            other => Err(AppError::Internal(format!("Unsupported currency: {}", other))),
        }
    }

    fn intent_params(request: &ChargeRequest) -> Result<CreatePaymentIntent<'_>> {
        let mut params = CreatePaymentIntent::new(
            request.amount_cents,
            Self::parse_currency(&request.currency)?,
        );
        params.description = Some(&request.description);
        params.metadata = Some(request.metadata.clone());
        params.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
            enabled: true,
            allow_redirects: None,
        });
        Ok(params)
    }

    fn to_handle(intent: PaymentIntent) -> Result<PaymentIntentHandle> {
        let client_secret = intent
            .client_secret
            .ok_or_else(|| AppError::External("No client secret returned".to_string()))?;

        Ok(PaymentIntentHandle {
            payment_intent_id: intent.id.to_string(),
            client_secret,
            amount_cents: intent.amount,
            currency: intent.currency.to_string(),
        })
    }

    fn map_status(status: PaymentIntentStatus) -> ChargeStatus {
        match status {
            PaymentIntentStatus::RequiresPaymentMethod => ChargeStatus::RequiresPaymentMethod,
            PaymentIntentStatus::RequiresConfirmation => ChargeStatus::RequiresConfirmation,
            PaymentIntentStatus::RequiresAction => ChargeStatus::RequiresAction,
            PaymentIntentStatus::Processing => ChargeStatus::Processing,
            PaymentIntentStatus::RequiresCapture => ChargeStatus::RequiresCapture,
            PaymentIntentStatus::Canceled => ChargeStatus::Canceled,
            PaymentIntentStatus::Succeeded => ChargeStatus::Succeeded,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(&self, request: ChargeRequest) -> Result<PaymentIntentHandle> {
        let params = Self::intent_params(&request)?;

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        tracing::info!("Payment intent created: {}", intent.id);
        Self::to_handle(intent)
    }

    async fn create_payment_sheet(&self, request: ChargeRequest) -> Result<PaymentSheet> {
        let customer = Customer::create(&self.client, CreateCustomer::new())
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;
        tracing::info!("Stripe customer created: {}", customer.id);

        let mut params = Self::intent_params(&request)?;
        params.customer = Some(customer.id.clone());

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;
        tracing::info!("Payment intent created: {}", intent.id);

        Ok(PaymentSheet {
            intent: Self::to_handle(intent)?,
            customer_id: customer.id.to_string(),
        })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntentInfo> {
        let intent_id = id
            .parse::<PaymentIntentId>()
            .map_err(|_| AppError::BadRequest("Invalid payment intent id".to_string()))?;

        let intent = PaymentIntent::retrieve(&self.client, &intent_id, &[])
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        Ok(PaymentIntentInfo {
            id: intent.id.to_string(),
            status: Self::map_status(intent.status),
            amount_cents: intent.amount,
            currency: intent.currency.to_string(),
            metadata: intent.metadata,
        })
    }
}
