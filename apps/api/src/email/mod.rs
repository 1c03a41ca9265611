//! Outgoing mail. Delivery is best-effort: failures are logged, never
//! surfaced to the request that triggered them.

pub mod templates;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info};

use crate::config::SmtpConfig;

#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mail delivery backend. `AppState` carries an `Arc<dyn Mailer>`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// Sends through an SMTP relay.
pub struct SmtpMailer {
    transport: Arc<SmtpTransport>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(build_transport(config)?),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse::<Mailbox>()
                    .context("SMTP_FROM is not a valid mailbox")?,
            )
            .to(mail
                .to
                .parse::<Mailbox>()
                .context("Recipient is not a valid mailbox")?)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body)
            .context("Failed to build email")?;

        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("Mail task failed to execute")?
            .map_err(|e| anyhow!("SMTP send failed: {e}"))?;
        Ok(())
    }
}

/// Used when SMTP is not configured: mail is written to the log instead.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        info!(
            "SMTP not configured; mail to {} ({}):\n{}",
            mail.to, mail.subject, mail.html_body
        );
        Ok(())
    }
}

pub fn build_mailer(config: Option<&SmtpConfig>) -> Result<Arc<dyn Mailer>> {
    match config {
        Some(smtp) => {
            info!("SMTP mailer configured for {}:{}", smtp.host, smtp.port);
            Ok(Arc::new(SmtpMailer::new(smtp)?))
        }
        None => {
            info!("SMTP not configured; outgoing mail will be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Fire-and-forget delivery on a background task.
pub fn send_in_background(mailer: Arc<dyn Mailer>, mail: OutgoingMail) {
    tokio::spawn(async move {
        let to = mail.to.clone();
        match mailer.send(mail).await {
            Ok(()) => info!("Email sent to {to}"),
            Err(e) => error!("Could not send email to {to}: {e:#}"),
        }
    });
}

fn build_transport(config: &SmtpConfig) -> Result<SmtpTransport> {
    let creds = Credentials::new(config.username.clone(), config.password.clone());
    Ok(SmtpTransport::starttls_relay(&config.host)
        .with_context(|| format!("Invalid SMTP host '{}'", config.host))?
        .port(config.port)
        .credentials(creds)
        .build())
}

/// Opens a connection to the relay and verifies it accepts us.
pub fn check_smtp_connection(config: &SmtpConfig) -> Result<()> {
    let transport = build_transport(config)?;
    match transport.test_connection() {
        Ok(true) => Ok(()),
        Ok(false) => Err(anyhow!(
            "SMTP server {}:{} refused the connection",
            config.host,
            config.port
        )),
        Err(e) => Err(anyhow!(
            "SMTP connection to {}:{} failed: {e}",
            config.host,
            config.port
        )),
    }
}

/// `check_smtp_connection` off the async runtime, for the `smtp-check` command.
pub async fn verify_smtp_relay(config: SmtpConfig) -> Result<()> {
    tokio::task::spawn_blocking(move || check_smtp_connection(&config))
        .await
        .context("SMTP check task panicked")?
        .context("SMTP connection FAILED")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Captures mail instead of sending it.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<()> {
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_log_mailer_never_fails() {
        let mail = OutgoingMail {
            to: "dana@example.com".to_string(),
            subject: "Hi".to_string(),
            html_body: "<p>Hi</p>".to_string(),
        };
        assert!(LogMailer.send(mail).await.is_ok());
    }

    #[tokio::test]
    async fn test_background_send_reaches_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        send_in_background(
            mailer.clone(),
            OutgoingMail {
                to: "dana@example.com".to_string(),
                subject: "Verify".to_string(),
                html_body: String::new(),
            },
        );
        for _ in 0..50 {
            if !mailer.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(mailer.sent.lock().unwrap()[0].subject, "Verify");
    }

    #[test]
    fn test_build_mailer_without_smtp_logs() {
        assert!(build_mailer(None).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_an_error() {
        let config = SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "habayta".to_string(),
            password: "secret".to_string(),
            from: "jobs@habayta.example".to_string(),
        };
        let err = verify_smtp_relay(config).await.unwrap_err();
        assert!(format!("{err:#}").starts_with("SMTP connection FAILED"));
    }
}
