use super::Notifier;
use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends the digest to the account it authenticates as, over STARTTLS.
pub struct SmtpNotifier {
    config: SmtpConfig,
    user: Option<String>,
    pass: Option<String>,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig, user: Option<String>, pass: Option<String>) -> Self {
        Self { config, user, pass }
    }

    fn credentials(&self) -> AppResult<(&str, &str)> {
        match (self.user.as_deref(), self.pass.as_deref()) {
            (Some(user), Some(pass)) => Ok((user, pass)),
            _ => Err(AppError::Mail(
                "EMAIL_USER and EMAIL_PASS must both be set".to_string(),
            )),
        }
    }

    fn build_message(&self, user: &str, subject: &str, html: &str) -> AppResult<Message> {
        let mailbox: Mailbox = user.parse()?;
        Ok(Message::builder()
            .from(mailbox.clone())
            .to(mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_html(&self, subject: &str, html: &str) -> AppResult<()> {
        let (user, pass) = self.credentials()?;
        let message = self.build_message(user, subject, html)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
            .port(self.config.port)
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .build();

        log::debug!(
            "Sending '{}' via {}:{}",
            subject,
            self.config.host,
            self.config.port
        );
        mailer.send(message).await?;
        log::info!("Email sent successfully");
        Ok(())
    }
}
