//! Email Service
//!
//! Outbound delivery is an external collaborator, so the lifecycle service
//! depends only on the [`Mailer`] trait. [`SmtpMailer`] is the production
//! implementation; [`LogMailer`] stands in when SMTP is not configured.

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tera::{Context, Tera};

use crate::config::EmailConfig;
use crate::utils::error::{AppError, AppResult};

/// Outbound email boundary for OTP and password-reset messages
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a verification OTP to a registrant
    async fn send_otp_email(&self, to: &str, full_name: &str, code: u32) -> AppResult<()>;

    /// Send a password-reset OTP
    async fn send_reset_email(&self, to: &str, full_name: &str, code: u32) -> AppResult<()>;
}

/// SMTP-backed mailer with embedded templates
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    templates: Tera,
    from: Mailbox,
}

const OTP_HTML: &str = r#"
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <p>Hello {{ full_name }},</p>
  <p>Your verification code for the recruitment portal is:</p>
  <p style="font-size: 28px; font-weight: bold; letter-spacing: 4px;">{{ code }}</p>
  <p>The code expires in {{ expires_in_minutes }} minutes.</p>
  <p>If you did not request this, you can ignore this email.</p>
</body>
</html>
"#;

const OTP_TEXT: &str = r#"
Hello {{ full_name }},

Your verification code for the recruitment portal is: {{ code }}

The code expires in {{ expires_in_minutes }} minutes.

If you did not request this, you can ignore this email.
"#;

const RESET_HTML: &str = r#"
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <p>Hello {{ full_name }},</p>
  <p>We received a request to reset your password. Use this code to continue:</p>
  <p style="font-size: 28px; font-weight: bold; letter-spacing: 4px;">{{ code }}</p>
  <p>The code expires in {{ expires_in_minutes }} minutes.</p>
  <p>If you did not request a reset, no action is needed.</p>
</body>
</html>
"#;

const RESET_TEXT: &str = r#"
Hello {{ full_name }},

We received a request to reset your password. Use this code to continue: {{ code }}

The code expires in {{ expires_in_minutes }} minutes.

If you did not request a reset, no action is needed.
"#;

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Internal(format!("failed to configure SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let mut templates = Tera::default();
        for (name, body) in [
            ("otp_email.html", OTP_HTML),
            ("otp_email.txt", OTP_TEXT),
            ("reset_email.html", RESET_HTML),
            ("reset_email.txt", RESET_TEXT),
        ] {
            templates
                .add_raw_template(name, body)
                .map_err(|e| AppError::Internal(format!("bad email template {}: {}", name, e)))?;
        }

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| AppError::Internal(format!("bad from address: {}", e)))?;

        Ok(Self {
            transport,
            templates,
            from,
        })
    }

    async fn send(
        &self,
        to: &str,
        full_name: &str,
        code: u32,
        subject: &str,
        template: &str,
    ) -> AppResult<()> {
        let mut context = Context::new();
        context.insert("full_name", full_name);
        context.insert("code", &format!("{:06}", code));
        context.insert(
            "expires_in_minutes",
            &crate::utils::security::OTP_TTL_MINUTES,
        );

        let html = self
            .templates
            .render(&format!("{}.html", template), &context)
            .map_err(|e| AppError::Internal(format!("template render failed: {}", e)))?;
        let text = self
            .templates
            .render(&format!("{}.txt", template), &context)
            .map_err(|e| AppError::Internal(format!("template render failed: {}", e)))?;

        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| AppError::Validation(format!("invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| AppError::Internal(format!("message build failed: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("email send failed: {}", e)))?;

        log::debug!("sent {} email to {}", template, to);
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp_email(&self, to: &str, full_name: &str, code: u32) -> AppResult<()> {
        self.send(to, full_name, code, "Verify your email address", "otp_email")
            .await
    }

    async fn send_reset_email(&self, to: &str, full_name: &str, code: u32) -> AppResult<()> {
        self.send(to, full_name, code, "Reset your password", "reset_email")
            .await
    }
}

/// Development mailer: logs instead of sending
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp_email(&self, to: &str, _full_name: &str, code: u32) -> AppResult<()> {
        log::info!("SMTP disabled; verification OTP for {} not sent", to);
        log::debug!("verification OTP for {}: {:06}", to, code);
        Ok(())
    }

    async fn send_reset_email(&self, to: &str, _full_name: &str, code: u32) -> AppResult<()> {
        log::info!("SMTP disabled; reset OTP for {} not sent", to);
        log::debug!("reset OTP for {}: {:06}", to, code);
        Ok(())
    }
}
