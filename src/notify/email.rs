//! Email reminder subscriber and SMTP transport

use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use rust_decimal::Decimal;
use std::str::FromStr;

#[cfg(test)]
use mockall::automock;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    notify::{DeliveryStatus, OverdueEvent, OverdueSubscriber},
    store::codec::DATE_FORMAT,
};

/// External send capability consumed by the reminder subscriber
#[cfg_attr(test, automock)]
pub trait MailTransport {
    fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// SMTP transport built on lettre
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Circulib");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Notification(format!("Invalid recipient address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            // Use STARTTLS for secure connection
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        mailer_builder
            .build()
            .send(&email)
            .map_err(|e| AppError::Notification(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Reference subscriber: one reminder email per overdue event
///
/// A blank contact address is a logged skip, not an error.
pub struct EmailReminder {
    transport: Box<dyn MailTransport>,
}

impl EmailReminder {
    pub fn new(transport: Box<dyn MailTransport>) -> Self {
        Self { transport }
    }

    fn compose_body(event: &OverdueEvent) -> String {
        let mut body = format!(
            "Hello {},\n\nThe following items on your account are overdue:\n\n",
            event.username
        );
        let mut total = Decimal::ZERO;
        for item in &event.items {
            let due = item
                .due_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| "unknown".to_string());
            body.push_str(&format!(
                "- {} (due {}, fine {})\n",
                item.title, due, item.fine_amount
            ));
            total += item.fine_amount;
        }
        body.push_str(&format!(
            "\nTotal outstanding: {}\n\nPlease return the items or settle the fine at the library desk.\n",
            total
        ));
        body
    }
}

impl OverdueSubscriber for EmailReminder {
    fn name(&self) -> &str {
        "email-reminder"
    }

    fn deliver(&self, event: &OverdueEvent) -> AppResult<DeliveryStatus> {
        if event.contact_address.trim().is_empty() {
            tracing::info!(user = %event.username, "no contact address on file, reminder skipped");
            return Ok(DeliveryStatus::Skipped);
        }

        let subject = "Overdue library items";
        let body = Self::compose_body(event);
        self.transport.send(&event.contact_address, subject, &body)?;

        tracing::info!(
            user = %event.username,
            items = event.items.len(),
            "overdue reminder sent"
        );
        Ok(DeliveryStatus::Sent)
    }
}
