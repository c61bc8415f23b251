//! Storage adapter contract.
//!
//! The core consumes this trait and never implements persistence itself.
//! Implement it for your database layer; an in-memory implementation for
//! tests ships behind the `test-adapter` feature.

use crate::error::Result;
use crate::models::{
    FullOrganization, InvitationPatch, MemberPatch, NewInvitation, NewMember, NewOrganization,
    Organization, OrganizationInvitation, OrganizationMember, OrganizationPatch, User,
};
use async_trait::async_trait;

/// Persistence contract consumed by the route handlers.
///
/// Organizations are addressed by slug. Contract obligations:
///
/// - [`create_organization`](Self::create_organization) returns
///   [`OrgError::DuplicatedSlug`](crate::OrgError::DuplicatedSlug) when the
///   slug is taken. The backing store must enforce a unique constraint on
///   the slug column; the error is how the core maps collisions to a 409.
/// - [`create_member`](Self::create_member) returns
///   [`OrgError::DuplicatedMembership`](crate::OrgError::DuplicatedMembership)
///   when the (user, org) pair already has a membership.
/// - [`update_member`](Self::update_member) and
///   [`delete_member`](Self::delete_member) return
///   [`OrgError::MemberNotFound`](crate::OrgError::MemberNotFound) when the
///   target id does not exist.
/// - List operations return empty vectors, never fail on zero rows.
/// - Single-entity lookups return `Ok(None)` instead of erroring.
#[async_trait]
pub trait OrgAdapter: Send + Sync {
    // === Organizations ===

    /// Create an organization. The adapter assigns id and timestamps.
    async fn create_organization(&self, data: NewOrganization) -> Result<Organization>;

    /// Apply a partial update to the organization with the given slug.
    async fn update_organization(
        &self,
        data: OrganizationPatch,
        slug: &str,
    ) -> Result<Organization>;

    /// List organizations the user is a member of.
    async fn list_organizations(&self, user_id: &str) -> Result<Vec<Organization>>;

    /// Look up an organization by slug.
    async fn get_organization(&self, slug: &str) -> Result<Option<Organization>>;

    /// Look up an organization with its members and invitations.
    async fn get_full_organization(&self, slug: &str) -> Result<Option<FullOrganization>>;

    /// Delete an organization. Cascades to members and invitations at the
    /// adapter's discretion.
    async fn delete_organization(&self, slug: &str) -> Result<()>;

    // === Invitations ===

    /// Create an invitation with status `pending`.
    async fn create_invitation(&self, data: NewInvitation) -> Result<OrganizationInvitation>;

    /// Look up an invitation by its unique token.
    async fn get_invitation(&self, token: &str) -> Result<Option<OrganizationInvitation>>;

    /// List all invitations for an organization.
    async fn list_invitations(&self, org_id: &str) -> Result<Vec<OrganizationInvitation>>;

    /// Apply a partial update to the invitation with the given token.
    async fn update_invitation(
        &self,
        data: InvitationPatch,
        token: &str,
    ) -> Result<OrganizationInvitation>;

    /// Delete an invitation by token.
    async fn delete_invitation(&self, token: &str) -> Result<()>;

    // === Members ===

    /// Create a membership row.
    async fn create_member(&self, data: NewMember) -> Result<OrganizationMember>;

    /// List all members of an organization.
    async fn list_members(&self, org_id: &str) -> Result<Vec<OrganizationMember>>;

    /// Look up a membership by user id and organization slug.
    async fn get_member(&self, user_id: &str, org_id: &str)
        -> Result<Option<OrganizationMember>>;

    /// Look up a membership by denormalized email and organization slug.
    async fn get_member_by_email(
        &self,
        email: &str,
        org_id: &str,
    ) -> Result<Option<OrganizationMember>>;

    /// Apply a partial update to the member with the given id.
    async fn update_member(&self, data: MemberPatch, id: &str) -> Result<OrganizationMember>;

    /// Delete a member by id.
    async fn delete_member(&self, id: &str) -> Result<()>;

    // === Users ===

    /// Look up a user account by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
}
