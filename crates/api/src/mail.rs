// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound transactional email.
//!
//! Templates are rendered here, at the delivery boundary, where the
//! recipient's address and name are known. Two senders are provided: one
//! that only logs, for development, and one that relays through SMTP.

use std::future::Future;

use fieldbook::EmailTemplate;
use fieldbook_domain::User;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use tracing::{debug, info};

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Errors raised while sending email.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },
    #[error("Failed to build email: {0}")]
    Build(String),
    #[error("Failed to send email: {0}")]
    Send(String),
}

/// Sends rendered email.
pub trait Mailer: Send + Sync {
    /// Sends one email.
    ///
    /// # Errors
    ///
    /// Returns a `MailError` if the message cannot be built or delivered.
    fn send(&self, email: &Email) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// Writes email to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

impl Mailer for ConsoleMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "Email (console delivery)");
        debug!(body = %email.text, "Email body");
        Ok(())
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender, as `Name <address>` or a bare address.
    pub from: String,
}

/// Sends email through an SMTP relay using TLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Creates a mailer for the configured relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender address or relay host is invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = parse_mailbox(&config.from)?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
            .map_err(|e| MailError::Build(format!("SMTP relay error: {e}")))?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let message: Message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        debug!(to = %email.to, subject = %email.subject, "Email relayed");
        Ok(())
    }
}

/// The sender chosen at startup.
#[derive(Clone)]
pub enum AnyMailer {
    Console(ConsoleMailer),
    Smtp(SmtpMailer),
}

impl Mailer for AnyMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        match self {
            Self::Console(mailer) => mailer.send(email).await,
            Self::Smtp(mailer) => mailer.send(email).await,
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| MailError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })
}

/// What an email is about, beyond its template.
#[derive(Debug, Clone, Copy)]
pub struct EmailContext<'a> {
    pub recipient: &'a User,
    /// One-sentence summary of the reservation or facility.
    pub summary: &'a str,
    /// Booking reference shown on tickets.
    pub reference: Option<&'a str>,
    /// Absolute link the recipient can follow.
    pub link: Option<&'a str>,
}

/// Renders `template` for one recipient.
#[must_use]
pub fn render_email(template: &EmailTemplate, context: &EmailContext<'_>) -> Email {
    let (subject, mut lines): (String, Vec<String>) = match template {
        EmailTemplate::Ticket => (
            String::from("Your booking ticket"),
            vec![
                context.summary.to_string(),
                String::from("Please show this ticket at the facility."),
            ],
        ),
        EmailTemplate::Cancellation => (
            String::from("Your reservation was cancelled"),
            vec![context.summary.to_string()],
        ),
        EmailTemplate::StatusChange {
            previous,
            current,
            reason,
        } => (
            String::from("Your reservation status changed"),
            vec![
                context.summary.to_string(),
                format!("Status: {} to {}", previous.label(), current.label()),
                format!("Reason: {reason}"),
            ],
        ),
    };
    if let Some(reference) = context.reference {
        lines.push(format!("Reference: {reference}"));
    }
    if let Some(link) = context.link {
        lines.push(format!("Details: {link}"));
    }

    let greeting: String = format!("Hello {},", context.recipient.display_name);
    let text: String = format!("{greeting}\n\n{}\n", lines.join("\n"));

    let paragraphs: String = lines
        .iter()
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect::<Vec<String>>()
        .join("\n");
    let html: String = format!(
        "<!DOCTYPE html>\n<html>\n<body style=\"font-family: Arial, sans-serif; color: #333;\">\n<h2>{}</h2>\n<p>{}</p>\n{paragraphs}\n</body>\n</html>\n",
        escape_html(&subject),
        escape_html(&greeting),
    );

    Email {
        to: context.recipient.email.clone(),
        subject,
        html,
        text,
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped: String = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
