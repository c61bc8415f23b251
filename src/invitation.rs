//! Invitation expiry evaluation.

use crate::models::{InvitationStatus, OrganizationInvitation};
use crate::utils::now_ms;

/// Default invitation lifetime: one day, in milliseconds.
pub const DEFAULT_INVITE_EXPIRY_MS: u64 = 86_400_000;

/// Project an invitation through the expiry window.
///
/// A pure projection, never a persistence write; callers decide whether to
/// persist the transition. `Some(0)` disables expiry entirely. Only a
/// `pending` invitation can expire: when its age exceeds the window (default
/// [`DEFAULT_INVITE_EXPIRY_MS`]) the returned copy is `expired`.
#[must_use]
pub fn apply_expiry(
    mut invitation: OrganizationInvitation,
    expiry_ms: Option<u64>,
) -> OrganizationInvitation {
    if expiry_ms == Some(0) {
        return invitation;
    }
    if invitation.status == InvitationStatus::Pending {
        let expiry = expiry_ms.unwrap_or(DEFAULT_INVITE_EXPIRY_MS);
        if now_ms().saturating_sub(invitation.created_at) > expiry {
            invitation.status = InvitationStatus::Expired;
        }
    }
    invitation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    const TWO_DAYS_MS: u64 = 2 * 86_400_000;

    fn invitation(status: InvitationStatus, age_ms: u64) -> OrganizationInvitation {
        OrganizationInvitation {
            email: "invitee@example.com".into(),
            org_id: "acme".into(),
            token: "tok".into(),
            status,
            role: Role::Member,
            created_at: now_ms() - age_ms,
            updated_at: now_ms() - age_ms,
        }
    }

    #[test]
    fn test_stale_pending_invitation_expires() {
        let result = apply_expiry(invitation(InvitationStatus::Pending, TWO_DAYS_MS), None);
        assert_eq!(result.status, InvitationStatus::Expired);
    }

    #[test]
    fn test_fresh_pending_invitation_stays_pending() {
        let result = apply_expiry(invitation(InvitationStatus::Pending, 1_000), None);
        assert_eq!(result.status, InvitationStatus::Pending);
    }

    #[test]
    fn test_zero_expiry_never_expires() {
        let result = apply_expiry(invitation(InvitationStatus::Pending, TWO_DAYS_MS), Some(0));
        assert_eq!(result.status, InvitationStatus::Pending);
    }

    #[test]
    fn test_accepted_invitation_never_changes() {
        let result = apply_expiry(invitation(InvitationStatus::Accepted, TWO_DAYS_MS), None);
        assert_eq!(result.status, InvitationStatus::Accepted);
    }

    #[test]
    fn test_custom_window_applies() {
        let result = apply_expiry(invitation(InvitationStatus::Pending, 5_000), Some(1_000));
        assert_eq!(result.status, InvitationStatus::Expired);

        let result = apply_expiry(
            invitation(InvitationStatus::Pending, 5_000),
            Some(TWO_DAYS_MS),
        );
        assert_eq!(result.status, InvitationStatus::Pending);
    }
}
