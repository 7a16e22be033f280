// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-effort delivery of notices after a committed state change.
//!
//! Nothing here can fail the originating request. Every failure is logged
//! and counted in the returned [`DispatchReport`].

use fieldbook::Notice;
use fieldbook_domain::{Notification, NotificationId, User};
use fieldbook_persistence::Store;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::mail::{Email, EmailContext, MailError, Mailer, render_email};

/// Warning attached to responses when delivery partly failed.
pub const NOTIFICATION_WARNING: &str = "status updated, but notification failed";

/// Summary of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub notifications_written: usize,
    pub emails_sent: usize,
    /// One line per failed write or send.
    pub failures: Vec<String>,
}

impl DispatchReport {
    /// The warning to surface to the caller, if anything failed.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        if self.failures.is_empty() {
            None
        } else {
            Some(String::from(NOTIFICATION_WARNING))
        }
    }
}

/// Writes notification records and sends the emails attached to notices.
pub struct NotificationDispatcher<M> {
    store: Store,
    mailer: M,
    app_base_url: String,
}

impl<M: Mailer> NotificationDispatcher<M> {
    /// Creates a dispatcher. Links are built under `app_base_url`.
    #[must_use]
    pub fn new(store: Store, mailer: M, app_base_url: &str) -> Self {
        Self {
            store,
            mailer,
            app_base_url: app_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The configured mailer.
    #[must_use]
    pub const fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Absolute URL for a path under the application.
    #[must_use]
    pub fn link(&self, path: &str) -> String {
        format!("{}{path}", self.app_base_url)
    }

    /// Delivers every notice.
    pub async fn dispatch(&self, notices: &[Notice], now: OffsetDateTime) -> DispatchReport {
        let mut report: DispatchReport = DispatchReport::default();
        for notice in notices {
            self.deliver(notice, now, &mut report).await;
        }
        if !report.failures.is_empty() {
            warn!(
                failures = report.failures.len(),
                notifications_written = report.notifications_written,
                emails_sent = report.emails_sent,
                "Notification dispatch incomplete"
            );
        }
        report
    }

    async fn deliver(&self, notice: &Notice, now: OffsetDateTime, report: &mut DispatchReport) {
        let link: Option<String> = notice.link_path.as_deref().map(|path| self.link(path));
        let message: String = link.as_ref().map_or_else(
            || notice.message.clone(),
            |link| format!("{} View it at {link}", notice.message),
        );

        let notification: Notification = Notification {
            id: NotificationId::generate(),
            user_id: notice.recipient.clone(),
            kind: notice.kind,
            title: notice.title.clone(),
            message,
            related_id: notice.related_id.clone(),
            read: false,
            created_at: now,
        };
        match self.store.create_notification(&notification).await {
            Ok(()) => {
                report.notifications_written += 1;
                debug!(
                    user_id = %notice.recipient,
                    kind = %notice.kind,
                    "Notification written"
                );
            }
            Err(e) => {
                warn!(user_id = %notice.recipient, error = %e, "Failed to write notification");
                report
                    .failures
                    .push(format!("notification for {}: {e}", notice.recipient));
            }
        }

        if notice.emails.is_empty() {
            return;
        }
        let recipient: User = match self.store.get_user(&notice.recipient).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(user_id = %notice.recipient, "Email recipient not found");
                report
                    .failures
                    .push(format!("email recipient {} not found", notice.recipient));
                return;
            }
            Err(e) => {
                warn!(user_id = %notice.recipient, error = %e, "Failed to load email recipient");
                report
                    .failures
                    .push(format!("email recipient {}: {e}", notice.recipient));
                return;
            }
        };

        for template in &notice.emails {
            let context: EmailContext<'_> = EmailContext {
                recipient: &recipient,
                summary: &notice.message,
                reference: notice.related_id.as_deref(),
                link: link.as_deref(),
            };
            let email: Email = render_email(template, &context);
            match self.send_email(&email).await {
                Ok(()) => report.emails_sent += 1,
                Err(e) => report.failures.push(format!("email to {}: {e}", email.to)),
            }
        }
    }

    /// Sends one email, logging a failure.
    ///
    /// # Errors
    ///
    /// Returns the mailer's error.
    pub async fn send_email(&self, email: &Email) -> Result<(), MailError> {
        match self.mailer.send(email).await {
            Ok(()) => {
                debug!(to = %email.to, subject = %email.subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                warn!(to = %email.to, subject = %email.subject, error = %e, "Failed to send email");
                Err(e)
            }
        }
    }
}
