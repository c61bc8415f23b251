//! Core data types.
//!
//! Wire shapes are camelCase JSON; timestamps are unix epoch milliseconds.
//! Organizations are addressed by slug, so `org_id` fields carry the slug.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a member holds within an organization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control, including deleting the organization.
    Owner,
    /// Organization management except deletion.
    Admin,
    /// Plain membership.
    #[default]
    Member,
}

impl Role {
    /// Get the wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: '{}'", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Lifecycle state of an invitation.
///
/// `Expired` is a projection computed against the configured expiry window
/// at read time; it is never written back to storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Awaiting a response from the invitee.
    #[default]
    Pending,
    /// The invitee joined the organization.
    Accepted,
    /// The invitee declined.
    Rejected,
    /// Past the expiry window (computed, not persisted).
    Expired,
}

/// An organization record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Adapter-assigned unique id.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Free-form classifier, e.g. `team` or `company`.
    #[serde(rename = "type")]
    pub kind: String,
    /// URL-safe unique handle. This is the addressing key.
    pub slug: String,
    /// Unix epoch milliseconds.
    pub created_at: u64,
    /// Unix epoch milliseconds.
    pub updated_at: u64,
}

/// A membership row linking a user to an organization.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    /// Adapter-assigned unique id.
    pub id: String,
    pub user_id: String,
    /// The organization's slug.
    pub org_id: String,
    /// Denormalized from the user account at join time.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    /// Unix epoch milliseconds.
    pub created_at: u64,
    /// Unix epoch milliseconds.
    pub updated_at: u64,
}

/// A pending (or settled) invitation into an organization.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInvitation {
    pub email: String,
    /// The organization's slug.
    pub org_id: String,
    /// Unique secret used to address the invitation.
    pub token: String,
    pub status: InvitationStatus,
    /// Role granted on acceptance.
    pub role: Role,
    /// Unix epoch milliseconds.
    pub created_at: u64,
    /// Unix epoch milliseconds.
    pub updated_at: u64,
}

/// Aggregate read model: an organization with its members and invitations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullOrganization {
    #[serde(flatten)]
    pub organization: Organization,
    pub members: Vec<OrganizationMember>,
    pub invitations: Vec<OrganizationInvitation>,
}

/// The authenticated actor, as resolved by the embedding framework.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_org_kind() -> String {
    "team".to_string()
}

/// Input for creating an organization.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "type", default = "default_org_kind")]
    pub kind: String,
}

/// Partial update of an organization. `None` fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Input for creating an invitation. Status starts as `pending`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvitation {
    pub email: String,
    /// The organization's slug.
    pub org_id: String,
    pub role: Role,
    pub token: String,
}

/// Partial update of an invitation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPatch {
    #[serde(default)]
    pub status: Option<InvitationStatus>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Input for creating a membership row.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    /// The organization's slug.
    pub org_id: String,
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Partial update of a member.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_organization_wire_shape() {
        let org = Organization {
            id: "org_1".into(),
            name: "Acme".into(),
            description: None,
            image: None,
            kind: "team".into(),
            slug: "acme".into(),
            created_at: 1,
            updated_at: 2,
        };
        let value = serde_json::to_value(&org).unwrap();
        assert_eq!(value["type"], "team");
        assert_eq!(value["createdAt"], 1);
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_new_organization_defaults_kind() {
        let input: NewOrganization =
            serde_json::from_value(json!({"name": "Acme", "slug": "acme"})).unwrap();
        assert_eq!(input.kind, "team");
    }

    #[test]
    fn test_full_organization_flattens() {
        let full = FullOrganization {
            organization: Organization {
                id: "org_1".into(),
                name: "Acme".into(),
                description: None,
                image: None,
                kind: "team".into(),
                slug: "acme".into(),
                created_at: 1,
                updated_at: 1,
            },
            members: vec![],
            invitations: vec![],
        };
        let value = serde_json::to_value(&full).unwrap();
        assert_eq!(value["slug"], "acme");
        assert!(value["members"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_invitation_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(InvitationStatus::Pending).unwrap(),
            json!("pending")
        );
        let status: InvitationStatus = serde_json::from_value(json!("rejected")).unwrap();
        assert_eq!(status, InvitationStatus::Rejected);
    }

    #[test]
    fn test_member_wire_shape() {
        let value = json!({
            "id": "m_1",
            "userId": "u_1",
            "orgId": "acme",
            "email": "a@b.c",
            "role": "admin",
            "createdAt": 0,
            "updatedAt": 0,
        });
        let member: OrganizationMember = serde_json::from_value(value).unwrap();
        assert_eq!(member.role, Role::Admin);
        assert_eq!(member.org_id, "acme");
        assert!(member.name.is_none());
    }
}
