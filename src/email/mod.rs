use async_trait::async_trait;

use crate::error::Result;

pub mod smtp;

pub use smtp::SmtpMailer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// Used when no SMTP relay is configured. Logs the message instead of
/// delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email delivery not configured; message body follows\n{}",
            email.body
        );
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingMailer;

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use super::*;
    use tokio::sync::Mutex;

    /// Keeps every message in memory.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, email: OutgoingEmail) -> Result<()> {
            self.sent.lock().await.push(email);
            Ok(())
        }
    }
}
