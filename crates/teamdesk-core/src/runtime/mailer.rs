// crates/teamdesk-core/src/runtime/mailer.rs
// ============================================================================
// Module: Teamdesk Invite Mailer
// Description: Log-only invite delivery.
// Purpose: Stand in for a mail transport in deployments without one.
// Dependencies: crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! [`LoggingInviteMailer`] records that an invite would have been sent. The
//! accept link carries the invite token, so only the recipient and the
//! organization are logged.

use async_trait::async_trait;

use crate::interfaces::InviteEmail;
use crate::interfaces::InviteMailer;
use crate::interfaces::MailerError;

/// Invite mailer that only logs delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInviteMailer;

#[async_trait]
impl InviteMailer for LoggingInviteMailer {
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), MailerError> {
        tracing::info!(
            to = %email.to,
            organization = email.organization_name.as_deref().unwrap_or(""),
            inviter = %email.inviter_name,
            "invite email queued (no transport configured)"
        );
        Ok(())
    }
}
