//! Email service for sending password reset links via SMTP.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::info;

use codingbit_core::Config;

/// Sends password recovery mail. Absent when SMTP is not configured; the
/// forgot-password endpoint then answers normally without sending anything.
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl EmailService {
    /// Create the email service from config. Returns `None` if SMTP_HOST or
    /// SMTP_FROM is missing.
    pub fn from_config(config: &Config) -> Option<Self> {
        let host = config.smtp_host.as_deref()?;
        let from = config.smtp_from.as_deref()?.to_string();
        let port = config.smtp_port.unwrap_or(587);

        let credentials = match (&config.smtp_user, &config.smtp_password) {
            (Some(user), Some(password)) => {
                Some(Credentials::new(user.clone(), password.clone()))
            }
            _ => None,
        };

        let mailer = if config.smtp_tls {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .port(port);
            if let Some(credentials) = credentials {
                builder = builder.credentials(credentials);
            }
            info!(host = %host, port = port, "Email service initialized (SMTP with STARTTLS)");
            builder.build()
        } else {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            if let Some(credentials) = credentials {
                builder = builder.credentials(credentials);
            }
            info!(host = %host, port = port, "Email service initialized (SMTP)");
            builder.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
        })
    }

    /// Send the password reset mail. When no frontend URL is configured the
    /// raw token is sent instead of a link.
    pub async fn send_password_reset(
        &self,
        to: &str,
        token: &str,
        reset_link: Option<&str>,
    ) -> Result<(), String> {
        let to_addr: Mailbox = to
            .parse()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;
        let from_addr: Mailbox = self
            .from
            .parse()
            .map_err(|e| format!("Invalid SMTP_FROM: {}", e))?;

        let body = match reset_link {
            Some(link) => format!(
                "A password reset was requested for this address.\n\n\
                 Open the link below to choose a new password:\n{}\n\n\
                 If you did not request this, you can ignore this email.",
                link
            ),
            None => format!(
                "A password reset was requested for this address.\n\n\
                 Use this token to choose a new password:\n{}\n\n\
                 If you did not request this, you can ignore this email.",
                token
            ),
        };

        let email = Message::builder()
            .from(from_addr)
            .to(to_addr)
            .subject("Reset your password")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| e.to_string())?;

        self.mailer.send(email).await.map_err(|e| e.to_string())?;
        info!("Password reset email sent");
        Ok(())
    }
}
