use std::time::Duration;

use anyhow::{Context, anyhow};
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use marquee_config::EmailConfig;
use tracing::{info, instrument, warn};

const SEND_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Outbound account notifications.
///
/// With SMTP disabled every message is logged instead of delivered, which
/// keeps development and test runs free of a mail server.
#[derive(Clone, Debug)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, activation_token))]
    pub async fn send_welcome(
        &self,
        to_email: &str,
        to_name: &str,
        user_id: i64,
        activation_token: &str,
    ) -> anyhow::Result<()> {
        let text_body = format!(
            "Hi {to_name},\n\n\
             Thanks for signing up for a Marquee account. For future reference, your user ID \
             number is {user_id}.\n\n\
             Please send a request to the `PUT /v1/users/activated` endpoint with the following \
             JSON body to activate your account:\n\n\
             {{\"token\": \"{activation_token}\"}}\n\n\
             Please note that this is a one-time use token and it will expire in 3 days.\n\n\
             Thanks,\n\
             The Marquee Team"
        );
        let html_body = token_template(
            "Welcome to Marquee",
            &format!(
                "Thanks for signing up for a Marquee account. For future reference, your user ID number is {user_id}."
            ),
            "PUT /v1/users/activated",
            activation_token,
            "3 days",
        );

        self.send_email(to_email, "Welcome to Marquee!", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, activation_token))]
    pub async fn send_activation(
        &self,
        to_email: &str,
        activation_token: &str,
    ) -> anyhow::Result<()> {
        let text_body = format!(
            "Hi,\n\n\
             Please send a `PUT /v1/users/activated` request with the following JSON body to \
             activate your account:\n\n\
             {{\"token\": \"{activation_token}\"}}\n\n\
             Please note that this is a one-time use token and it will expire in 3 days.\n\n\
             Thanks,\n\
             The Marquee Team"
        );
        let html_body = token_template(
            "Activate your account",
            "Here is a new activation token for your Marquee account.",
            "PUT /v1/users/activated",
            activation_token,
            "3 days",
        );

        self.send_email(to_email, "Activate your Marquee account", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, reset_token))]
    pub async fn send_password_reset(
        &self,
        to_email: &str,
        reset_token: &str,
    ) -> anyhow::Result<()> {
        let text_body = format!(
            "Hi,\n\n\
             Please send a `PUT /v1/users/password` request with the following JSON body to set \
             a new password:\n\n\
             {{\"password\": \"your new password\", \"token\": \"{reset_token}\"}}\n\n\
             Please note that this is a one-time use token and it will expire in 45 minutes. If \
             you need another token please make a `POST /v1/tokens/password-reset` request.\n\n\
             Thanks,\n\
             The Marquee Team"
        );
        let html_body = token_template(
            "Reset your password",
            "We received a request to reset the password on your Marquee account.",
            "PUT /v1/users/password",
            reset_token,
            "45 minutes",
        );

        self.send_email(to_email, "Reset your Marquee password", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, text_body, html_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> anyhow::Result<()> {
        if !self.config.enabled {
            info!(to = %to_email, subject = %subject, body = %text_body, "email delivery disabled, logging message");
            return Ok(());
        }

        let email = Message::builder()
            .from(
                self.config
                    .sender
                    .parse()
                    .context("invalid sender address")?,
            )
            .to(to_email.parse().context("invalid recipient address")?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .context("failed to build email")?;

        let mailer = self.transport()?;

        let mut last_error = None;
        for attempt in 1..=SEND_ATTEMPTS {
            let mailer = mailer.clone();
            let message = email.clone();
            let result = tokio::task::spawn_blocking(move || mailer.send(&message))
                .await
                .context("email task join error")?;

            match result {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!(attempt, error = %e, "failed to send email");
                    last_error = Some(e);
                    if attempt < SEND_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(match last_error {
            Some(e) => anyhow!(e).context("failed to send email"),
            None => anyhow!("failed to send email"),
        })
    }

    fn transport(&self) -> anyhow::Result<SmtpTransport> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .context("failed to create SMTP relay")?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

fn token_template(title: &str, intro: &str, endpoint: &str, token: &str, expiry: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; color: #333333;">
    <h2 style="margin: 0 0 20px 0;">{title}</h2>
    <p>Hi,</p>
    <p>{intro}</p>
    <p>Please send a <code>{endpoint}</code> request with the following token:</p>
    <pre style="background-color: #f4f4f4; padding: 12px;"><code>{token}</code></pre>
    <p><strong>This is a one-time use token and it will expire in {expiry}.</strong></p>
    <p>Thanks,<br>The Marquee Team</p>
</body>
</html>"#
    )
}
