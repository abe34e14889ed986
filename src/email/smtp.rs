use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::SmtpConfig,
    email::{Mailer, OutgoingEmail},
    error::{AppError, Result},
};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| AppError::Internal(format!("Invalid SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid recipient: {}", email.to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::External(format!("SMTP delivery failed: {}", e)))?;

        tracing::debug!("Email sent via SMTP");
        Ok(())
    }
}
