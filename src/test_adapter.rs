//! In-memory adapter for tests.
//!
//! Implements the full [`OrgAdapter`] contract against `HashMap`s so the
//! route pipeline can be exercised without a database. Cloning shares the
//! same underlying data.

use crate::adapter::OrgAdapter;
use crate::error::{OrgError, Result};
use crate::models::{
    FullOrganization, InvitationPatch, InvitationStatus, MemberPatch, NewInvitation, NewMember,
    NewOrganization, Organization, OrganizationInvitation, OrganizationMember, OrganizationPatch,
    User,
};
use crate::utils::now_ms;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

struct Inner {
    /// slug -> organization
    orgs: RwLock<HashMap<String, Organization>>,
    /// member id -> member
    members: RwLock<HashMap<String, OrganizationMember>>,
    /// token -> invitation
    invitations: RwLock<HashMap<String, OrganizationInvitation>>,
    /// email -> user account
    users: RwLock<HashMap<String, User>>,
}

/// In-memory [`OrgAdapter`] implementation.
#[derive(Clone)]
pub struct InMemoryAdapter {
    inner: Arc<Inner>,
}

impl Default for InMemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAdapter {
    /// Create an empty adapter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                orgs: RwLock::new(HashMap::new()),
                members: RwLock::new(HashMap::new()),
                invitations: RwLock::new(HashMap::new()),
                users: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Register a user account so `get_user_by_email` can resolve it.
    pub fn insert_user(&self, user: User) {
        if let Some(email) = user.email.clone() {
            self.inner.users.write().unwrap().insert(email, user);
        }
    }

    /// Number of membership rows across all organizations.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.inner.members.read().unwrap().len()
    }

    /// Number of stored organizations.
    #[must_use]
    pub fn org_count(&self) -> usize {
        self.inner.orgs.read().unwrap().len()
    }

    /// Number of stored invitations.
    #[must_use]
    pub fn invitation_count(&self) -> usize {
        self.inner.invitations.read().unwrap().len()
    }
}

#[async_trait]
impl OrgAdapter for InMemoryAdapter {
    async fn create_organization(&self, data: NewOrganization) -> Result<Organization> {
        let mut orgs = self.inner.orgs.write().unwrap();
        if orgs.contains_key(&data.slug) {
            return Err(OrgError::duplicated_slug(data.slug));
        }
        let now = now_ms();
        let org = Organization {
            id: uuid::Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            image: data.image,
            kind: data.kind,
            slug: data.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        orgs.insert(data.slug, org.clone());
        Ok(org)
    }

    async fn update_organization(
        &self,
        data: OrganizationPatch,
        slug: &str,
    ) -> Result<Organization> {
        let mut orgs = self.inner.orgs.write().unwrap();
        let org = orgs
            .get_mut(slug)
            .ok_or_else(|| OrgError::Storage(anyhow!("organization not found: {slug}")))?;
        if let Some(name) = data.name {
            org.name = name;
        }
        if let Some(description) = data.description {
            org.description = Some(description);
        }
        if let Some(image) = data.image {
            org.image = Some(image);
        }
        if let Some(kind) = data.kind {
            org.kind = kind;
        }
        org.updated_at = now_ms();
        Ok(org.clone())
    }

    async fn list_organizations(&self, user_id: &str) -> Result<Vec<Organization>> {
        let members = self.inner.members.read().unwrap();
        let orgs = self.inner.orgs.read().unwrap();
        Ok(members
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| orgs.get(&m.org_id).cloned())
            .collect())
    }

    async fn get_organization(&self, slug: &str) -> Result<Option<Organization>> {
        Ok(self.inner.orgs.read().unwrap().get(slug).cloned())
    }

    async fn get_full_organization(&self, slug: &str) -> Result<Option<FullOrganization>> {
        let Some(organization) = self.inner.orgs.read().unwrap().get(slug).cloned() else {
            return Ok(None);
        };
        let members = self.list_members(slug).await?;
        let invitations = self.list_invitations(slug).await?;
        Ok(Some(FullOrganization {
            organization,
            members,
            invitations,
        }))
    }

    async fn delete_organization(&self, slug: &str) -> Result<()> {
        self.inner.orgs.write().unwrap().remove(slug);
        self.inner
            .members
            .write()
            .unwrap()
            .retain(|_, m| m.org_id != slug);
        self.inner
            .invitations
            .write()
            .unwrap()
            .retain(|_, inv| inv.org_id != slug);
        Ok(())
    }

    async fn create_invitation(&self, data: NewInvitation) -> Result<OrganizationInvitation> {
        let now = now_ms();
        let invitation = OrganizationInvitation {
            email: data.email,
            org_id: data.org_id,
            token: data.token.clone(),
            status: InvitationStatus::Pending,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .invitations
            .write()
            .unwrap()
            .insert(data.token, invitation.clone());
        Ok(invitation)
    }

    async fn get_invitation(&self, token: &str) -> Result<Option<OrganizationInvitation>> {
        Ok(self.inner.invitations.read().unwrap().get(token).cloned())
    }

    async fn list_invitations(&self, org_id: &str) -> Result<Vec<OrganizationInvitation>> {
        Ok(self
            .inner
            .invitations
            .read()
            .unwrap()
            .values()
            .filter(|inv| inv.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn update_invitation(
        &self,
        data: InvitationPatch,
        token: &str,
    ) -> Result<OrganizationInvitation> {
        let mut invitations = self.inner.invitations.write().unwrap();
        let invitation = invitations
            .get_mut(token)
            .ok_or_else(|| OrgError::Storage(anyhow!("invitation not found: {token}")))?;
        if let Some(status) = data.status {
            invitation.status = status;
        }
        if let Some(role) = data.role {
            invitation.role = role;
        }
        invitation.updated_at = now_ms();
        Ok(invitation.clone())
    }

    async fn delete_invitation(&self, token: &str) -> Result<()> {
        self.inner.invitations.write().unwrap().remove(token);
        Ok(())
    }

    async fn create_member(&self, data: NewMember) -> Result<OrganizationMember> {
        let mut members = self.inner.members.write().unwrap();
        if members
            .values()
            .any(|m| m.user_id == data.user_id && m.org_id == data.org_id)
        {
            return Err(OrgError::duplicated_membership(data.org_id));
        }
        let now = now_ms();
        let member = OrganizationMember {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: data.user_id,
            org_id: data.org_id,
            email: data.email,
            name: data.name,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        members.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    async fn list_members(&self, org_id: &str) -> Result<Vec<OrganizationMember>> {
        Ok(self
            .inner
            .members
            .read()
            .unwrap()
            .values()
            .filter(|m| m.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn get_member(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<Option<OrganizationMember>> {
        Ok(self
            .inner
            .members
            .read()
            .unwrap()
            .values()
            .find(|m| m.user_id == user_id && m.org_id == org_id)
            .cloned())
    }

    async fn get_member_by_email(
        &self,
        email: &str,
        org_id: &str,
    ) -> Result<Option<OrganizationMember>> {
        Ok(self
            .inner
            .members
            .read()
            .unwrap()
            .values()
            .find(|m| m.email == email && m.org_id == org_id)
            .cloned())
    }

    async fn update_member(&self, data: MemberPatch, id: &str) -> Result<OrganizationMember> {
        let mut members = self.inner.members.write().unwrap();
        let member = members
            .get_mut(id)
            .ok_or_else(|| OrgError::member_not_found(id))?;
        if let Some(name) = data.name {
            member.name = Some(name);
        }
        if let Some(role) = data.role {
            member.role = role;
        }
        member.updated_at = now_ms();
        Ok(member.clone())
    }

    async fn delete_member(&self, id: &str) -> Result<()> {
        self.inner
            .members
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| OrgError::member_not_found(id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.inner.users.read().unwrap().get(email).cloned())
    }
}
