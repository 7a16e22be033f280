// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldbook_domain::{NotificationKind, ReservationStatus, UserId};

/// Emails that may accompany a notice.
///
/// Rendering happens at the delivery boundary, where recipient addresses and
/// display names are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Booking ticket for a confirmed reservation.
    Ticket,
    /// Cancellation of a reservation.
    Cancellation,
    /// Administrative status override with its reason.
    StatusChange {
        previous: ReservationStatus,
        current: ReservationStatus,
        reason: String,
    },
}

/// A message to deliver to one user after a successful state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: Option<String>,
    /// Path under the application base URL the recipient can follow.
    pub link_path: Option<String>,
    pub emails: Vec<EmailTemplate>,
}

impl Notice {
    /// Creates an in-app notice with no link and no email.
    #[must_use]
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related_id: Option<String>,
    ) -> Self {
        Self {
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            related_id,
            link_path: None,
            emails: Vec::new(),
        }
    }

    /// Adds a link path.
    #[must_use]
    pub fn with_link(mut self, path: String) -> Self {
        self.link_path = Some(path);
        self
    }

    /// Adds an email to send alongside the in-app notification.
    #[must_use]
    pub fn with_email(mut self, email: EmailTemplate) -> Self {
        self.emails.push(email);
        self
    }
}
