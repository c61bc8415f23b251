//! Permission evaluation.
//!
//! Each guarded operation maps to a [`PermissionAction`]. A
//! [`PermissionPolicy`] holds one [`Rule`] per action; the built-in default
//! table is an explicit value constructed by [`PermissionPolicy::default`],
//! and deployments override individual actions with
//! [`PermissionPolicy::with_rule`]. Evaluation is pure and fails closed: no
//! membership, or no rule for the action, means deny.

use crate::models::{OrganizationMember, Role, User};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Actions subject to permission checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PermissionAction {
    DeleteOrg,
    UpdateOrg,
    InviteMember,
    RemoveMember,
    UpdateMember,
    UpdateInvitation,
    DeleteInvitation,
    CreateMemberWithoutInvitation,
}

impl PermissionAction {
    /// Get the string tag of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeleteOrg => "delete-org",
            Self::UpdateOrg => "update-org",
            Self::InviteMember => "invite-member",
            Self::RemoveMember => "remove-member",
            Self::UpdateMember => "update-member",
            Self::UpdateInvitation => "update-invitation",
            Self::DeleteInvitation => "delete-invitation",
            Self::CreateMemberWithoutInvitation => "create-member-without-invitation",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The acting user merged with their membership, as seen by predicate rules.
#[derive(Clone, Copy, Debug)]
pub struct Actor<'a> {
    pub user: &'a User,
    pub member: &'a OrganizationMember,
}

/// Custom predicate over the merged actor record.
pub type PermissionPredicate = Arc<dyn Fn(&Actor<'_>) -> bool + Send + Sync>;

/// A permission rule for a single action.
#[derive(Clone)]
pub enum Rule {
    /// Allow exactly this role.
    Fixed(Role),
    /// Allow any of these roles. An empty list allows nobody.
    AnyOf(Vec<Role>),
    /// Defer to a caller-supplied predicate; its return is authoritative.
    Predicate(PermissionPredicate),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(role) => f.debug_tuple("Fixed").field(role).finish(),
            Self::AnyOf(roles) => f.debug_tuple("AnyOf").field(roles).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Role> for Rule {
    fn from(role: Role) -> Self {
        Self::Fixed(role)
    }
}

impl From<Vec<Role>> for Rule {
    fn from(roles: Vec<Role>) -> Self {
        Self::AnyOf(roles)
    }
}

/// Per-action permission rules.
///
/// `PermissionPolicy::default()` yields the built-in table:
///
/// | action | allowed roles |
/// |---|---|
/// | delete-org | owner |
/// | update-org, invite-member, remove-member, update-member, update-invitation, delete-invitation | admin, owner |
/// | create-member-without-invitation | nobody |
#[derive(Clone, Debug)]
pub struct PermissionPolicy {
    rules: HashMap<PermissionAction, Rule>,
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        use PermissionAction::*;
        let admin_or_owner = || Rule::AnyOf(vec![Role::Admin, Role::Owner]);
        let mut rules = HashMap::new();
        rules.insert(DeleteOrg, Rule::AnyOf(vec![Role::Owner]));
        rules.insert(UpdateOrg, admin_or_owner());
        rules.insert(InviteMember, admin_or_owner());
        rules.insert(RemoveMember, admin_or_owner());
        rules.insert(UpdateMember, admin_or_owner());
        rules.insert(UpdateInvitation, admin_or_owner());
        rules.insert(DeleteInvitation, admin_or_owner());
        rules.insert(CreateMemberWithoutInvitation, Rule::AnyOf(vec![]));
        Self { rules }
    }
}

impl PermissionPolicy {
    /// Create the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the rule for one action.
    #[must_use]
    pub fn with_rule(mut self, action: PermissionAction, rule: impl Into<Rule>) -> Self {
        self.rules.insert(action, rule.into());
        self
    }

    /// Get the rule for an action, if any.
    #[must_use]
    pub fn rule(&self, action: PermissionAction) -> Option<&Rule> {
        self.rules.get(&action)
    }

    /// Evaluate whether the actor may perform `action`.
    ///
    /// Denies unconditionally without a membership.
    #[must_use]
    pub fn allows(
        &self,
        action: PermissionAction,
        user: &User,
        member: Option<&OrganizationMember>,
    ) -> bool {
        check_permission(action, user, member, self.rule(action))
    }
}

/// Evaluate a single rule against the actor.
///
/// This is the pure core of the evaluator: `rule` is the effective rule for
/// the action (a caller override or the policy default). A missing
/// membership or a missing rule denies.
#[must_use]
pub fn check_permission(
    _action: PermissionAction,
    user: &User,
    member: Option<&OrganizationMember>,
    rule: Option<&Rule>,
) -> bool {
    let Some(member) = member else {
        return false;
    };
    let Some(rule) = rule else {
        return false;
    };
    match rule {
        Rule::Fixed(role) => member.role == *role,
        Rule::AnyOf(roles) => roles.contains(&member.role),
        Rule::Predicate(predicate) => predicate(&Actor { user, member }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            image: None,
        }
    }

    fn member_with_role(role: Role) -> OrganizationMember {
        OrganizationMember {
            id: "m1".into(),
            user_id: "u1".into(),
            org_id: "acme".into(),
            email: "alice@example.com".into(),
            name: None,
            role,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_denies_without_membership() {
        let policy = PermissionPolicy::default();
        assert!(!policy.allows(PermissionAction::DeleteOrg, &user(), None));
    }

    #[test]
    fn test_role_list_allows_iff_role_in_list() {
        let policy = PermissionPolicy::default();
        for (role, expected) in [(Role::Owner, true), (Role::Admin, true), (Role::Member, false)]
        {
            let member = member_with_role(role);
            assert_eq!(
                policy.allows(PermissionAction::InviteMember, &user(), Some(&member)),
                expected,
                "invite-member for {role}"
            );
        }
    }

    #[test]
    fn test_delete_org_is_owner_only() {
        let policy = PermissionPolicy::default();
        assert!(policy.allows(
            PermissionAction::DeleteOrg,
            &user(),
            Some(&member_with_role(Role::Owner))
        ));
        assert!(!policy.allows(
            PermissionAction::DeleteOrg,
            &user(),
            Some(&member_with_role(Role::Admin))
        ));
    }

    #[test]
    fn test_create_member_without_invitation_denied_by_default() {
        let policy = PermissionPolicy::default();
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert!(!policy.allows(
                PermissionAction::CreateMemberWithoutInvitation,
                &user(),
                Some(&member_with_role(role))
            ));
        }
    }

    #[test]
    fn test_fixed_rule_requires_exact_role() {
        let rule = Rule::Fixed(Role::Admin);
        assert!(check_permission(
            PermissionAction::UpdateOrg,
            &user(),
            Some(&member_with_role(Role::Admin)),
            Some(&rule)
        ));
        assert!(!check_permission(
            PermissionAction::UpdateOrg,
            &user(),
            Some(&member_with_role(Role::Owner)),
            Some(&rule)
        ));
    }

    #[test]
    fn test_predicate_rule_is_authoritative() {
        let allow: Rule = Rule::Predicate(Arc::new(|actor| actor.member.org_id == "acme"));
        let deny: Rule = Rule::Predicate(Arc::new(|_| false));
        let member = member_with_role(Role::Member);
        assert!(check_permission(
            PermissionAction::RemoveMember,
            &user(),
            Some(&member),
            Some(&allow)
        ));
        assert!(!check_permission(
            PermissionAction::RemoveMember,
            &user(),
            Some(&member),
            Some(&deny)
        ));
    }

    #[test]
    fn test_override_replaces_default() {
        let policy = PermissionPolicy::default()
            .with_rule(PermissionAction::DeleteOrg, vec![Role::Admin, Role::Owner]);
        assert!(policy.allows(
            PermissionAction::DeleteOrg,
            &user(),
            Some(&member_with_role(Role::Admin))
        ));
    }

    #[test]
    fn test_missing_rule_fails_closed() {
        assert!(!check_permission(
            PermissionAction::DeleteOrg,
            &user(),
            Some(&member_with_role(Role::Owner)),
            None
        ));
    }
}
