//! Router configuration.
//!
//! [`OrgOptions`] carries every injected collaborator and policy knob the
//! handlers consult: the permission policy, numeric-limit and owner-departure
//! rules, the invitation notifier and token generator, and lifecycle
//! callbacks. Built builder-style with sensible defaults.

use crate::checks::{BoxFuture, Limit};
use crate::models::{OrganizationInvitation, OrganizationMember, User};
use crate::permissions::PermissionPolicy;
use std::fmt;
use std::sync::Arc;

/// Async notifier invoked with the invitation token after creation.
pub type SendInvitationFn = Arc<dyn Fn(String) -> BoxFuture<()> + Send + Sync>;

/// Custom invitation token generator.
pub type InviteTokenGeneratorFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Session-user resolver used by embedding integrations.
///
/// The core router reads `user` from the request bundle; this hook exists for
/// the outer layer that builds those bundles.
pub type GetCurrentUserFn = Arc<dyn Fn() -> BoxFuture<Option<User>> + Send + Sync>;

/// Fired after an invited member is created (and the invitation consumed).
pub type OnInvitationAcceptedFn =
    Arc<dyn Fn(&OrganizationInvitation, &OrganizationMember) + Send + Sync>;

/// Lifecycle callbacks, all optional and fire-and-forget.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_invitation_accepted: Option<OnInvitationAcceptedFn>,
    pub on_invitation_rejected: Option<Arc<dyn Fn() + Send + Sync>>,
    pub on_invitation_revoked: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_invitation_accepted", &self.on_invitation_accepted.is_some())
            .field("on_invitation_rejected", &self.on_invitation_rejected.is_some())
            .field("on_invitation_revoked", &self.on_invitation_revoked.is_some())
            .finish()
    }
}

/// Whether members holding the `owner` role may be removed.
#[derive(Clone, Debug, Default)]
pub enum OwnerLeavePolicy {
    /// Owners can never be removed.
    #[default]
    Deny,
    /// Owners may leave, subject to the constraints below.
    Allow {
        /// Deny the departure if the remaining owner count would fall below
        /// this floor.
        min_owners: Option<u32>,
        /// Delete the organization when its last member departs.
        delete_abandoned_org: bool,
    },
}

/// Business rules consulted by the member and invitation handlers.
#[derive(Clone, Debug, Default)]
pub struct Rules {
    /// Maximum members per organization. Unlimited when unset.
    pub max_members: Option<Limit>,
    /// Maximum invitations per organization. Unlimited when unset.
    pub max_active_invitations: Option<Limit>,
    /// Owner departure policy for `org/member/delete`.
    pub allow_owners_to_leave_org: OwnerLeavePolicy,
    /// Delete a consumed invitation instead of marking it accepted.
    pub delete_invitation_after_accept: bool,
}

impl Rules {
    /// Create rules with defaults (no limits, owners cannot leave).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the member limit.
    #[must_use]
    pub fn max_members(mut self, limit: impl Into<Limit>) -> Self {
        self.max_members = Some(limit.into());
        self
    }

    /// Set the invitation limit.
    #[must_use]
    pub fn max_active_invitations(mut self, limit: impl Into<Limit>) -> Self {
        self.max_active_invitations = Some(limit.into());
        self
    }

    /// Set the owner departure policy.
    #[must_use]
    pub fn allow_owners_to_leave_org(mut self, policy: OwnerLeavePolicy) -> Self {
        self.allow_owners_to_leave_org = policy;
        self
    }

    /// Delete invitations after acceptance instead of marking them.
    #[must_use]
    pub fn delete_invitation_after_accept(mut self, delete: bool) -> Self {
        self.delete_invitation_after_accept = delete;
        self
    }
}

/// Configuration surface consumed by the dispatcher and handlers.
#[derive(Clone, Default)]
pub struct OrgOptions {
    /// Notifier called with the token after invitation creation. When absent
    /// a warning is logged and creation still succeeds.
    pub send_invitation: Option<SendInvitationFn>,
    /// Session-user resolver for embedding integrations.
    pub get_current_user: Option<GetCurrentUserFn>,
    /// Lifecycle callbacks.
    pub callbacks: Callbacks,
    /// Custom invitation token generator. Falls back to a random token.
    pub invite_token_generator: Option<InviteTokenGeneratorFn>,
    /// Invitation lifetime in milliseconds. `Some(0)` disables expiry;
    /// unset defaults to one day.
    pub invite_token_expiry: Option<u64>,
    /// Restrict organization reads to organizations the actor belongs to.
    pub check_membership: bool,
    /// Per-action permission rules.
    pub permissions: PermissionPolicy,
    /// Business rules.
    pub rules: Rules,
}

impl fmt::Debug for OrgOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrgOptions")
            .field("send_invitation", &self.send_invitation.is_some())
            .field("get_current_user", &self.get_current_user.is_some())
            .field("callbacks", &self.callbacks)
            .field("invite_token_generator", &self.invite_token_generator.is_some())
            .field("invite_token_expiry", &self.invite_token_expiry)
            .field("check_membership", &self.check_membership)
            .field("permissions", &self.permissions)
            .field("rules", &self.rules)
            .finish()
    }
}

impl OrgOptions {
    /// Create options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the invitation notifier.
    #[must_use]
    pub fn send_invitation(mut self, notifier: SendInvitationFn) -> Self {
        self.send_invitation = Some(notifier);
        self
    }

    /// Set the lifecycle callbacks.
    #[must_use]
    pub fn callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Set a custom token generator.
    #[must_use]
    pub fn invite_token_generator(mut self, generator: InviteTokenGeneratorFn) -> Self {
        self.invite_token_generator = Some(generator);
        self
    }

    /// Set the invitation expiry window in milliseconds (0 = never expire).
    #[must_use]
    pub fn invite_token_expiry(mut self, expiry_ms: u64) -> Self {
        self.invite_token_expiry = Some(expiry_ms);
        self
    }

    /// Enable membership gating on organization reads.
    #[must_use]
    pub fn check_membership(mut self, check: bool) -> Self {
        self.check_membership = check;
        self
    }

    /// Set the permission policy.
    #[must_use]
    pub fn permissions(mut self, policy: PermissionPolicy) -> Self {
        self.permissions = policy;
        self
    }

    /// Set the business rules.
    #[must_use]
    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = OrgOptions::default();
        assert!(options.send_invitation.is_none());
        assert!(options.invite_token_expiry.is_none());
        assert!(!options.check_membership);
        assert!(!options.rules.delete_invitation_after_accept);
        assert!(matches!(
            options.rules.allow_owners_to_leave_org,
            OwnerLeavePolicy::Deny
        ));
    }

    #[test]
    fn test_builder_chain() {
        let options = OrgOptions::new()
            .check_membership(true)
            .invite_token_expiry(0)
            .rules(
                Rules::new()
                    .max_members(10u32)
                    .delete_invitation_after_accept(true),
            );
        assert!(options.check_membership);
        assert_eq!(options.invite_token_expiry, Some(0));
        assert!(options.rules.max_members.is_some());
        assert!(options.rules.delete_invitation_after_accept);
    }
}
