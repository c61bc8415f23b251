//! The internal router.
//!
//! [`dispatch`] is the single seam between the embedding framework and the
//! route handlers: it selects a handler by action tag and translates every
//! raised [`OrgError`] into a uniform envelope. Domain errors collapse into
//! an opaque 404-style envelope so internals never leak to transport
//! callers; unexpected storage failures become a generic 500. Handlers only
//! ever produce `{status, data}`.

use crate::error::OrgError;
use crate::models::User;
use crate::options::OrgOptions;
use crate::response::ApiResponse;
use crate::routes::{invitation, member, organization};
use crate::OrgAdapter;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, instrument};

/// The fixed set of routable action tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrgAction {
    CreateOrg,
    GetOrg,
    GetFullOrg,
    ListOrgs,
    DeleteOrg,
    UpdateOrg,
    CreateInvitation,
    GetInvitation,
    ListInvitations,
    UpdateInvitation,
    DeleteInvitation,
    CreateMember,
    GetMember,
    ListMembers,
    DeleteMember,
    UpdateMember,
}

impl OrgAction {
    /// Get the wire tag of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateOrg => "org/create",
            Self::GetOrg => "org/get",
            Self::GetFullOrg => "org/get/full",
            Self::ListOrgs => "org/list",
            Self::DeleteOrg => "org/delete",
            Self::UpdateOrg => "org/update",
            Self::CreateInvitation => "org/invitation/create",
            Self::GetInvitation => "org/invitation/get",
            Self::ListInvitations => "org/invitation/list",
            Self::UpdateInvitation => "org/invitation/update",
            Self::DeleteInvitation => "org/invitation/delete",
            Self::CreateMember => "org/member/create",
            Self::GetMember => "org/member/get",
            Self::ListMembers => "org/member/list",
            Self::DeleteMember => "org/member/delete",
            Self::UpdateMember => "org/member/update",
        }
    }
}

impl fmt::Display for OrgAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when an action tag is not part of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActionError {
    tag: String,
}

impl fmt::Display for UnknownActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action tag: '{}'", self.tag)
    }
}

impl std::error::Error for UnknownActionError {}

impl FromStr for OrgAction {
    type Err = UnknownActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "org/create" => Self::CreateOrg,
            "org/get" => Self::GetOrg,
            "org/get/full" => Self::GetFullOrg,
            "org/list" => Self::ListOrgs,
            "org/delete" => Self::DeleteOrg,
            "org/update" => Self::UpdateOrg,
            "org/invitation/create" => Self::CreateInvitation,
            "org/invitation/get" => Self::GetInvitation,
            "org/invitation/list" => Self::ListInvitations,
            "org/invitation/update" => Self::UpdateInvitation,
            "org/invitation/delete" => Self::DeleteInvitation,
            "org/member/create" => Self::CreateMember,
            "org/member/get" => Self::GetMember,
            "org/member/list" => Self::ListMembers,
            "org/member/delete" => Self::DeleteMember,
            "org/member/update" => Self::UpdateMember,
            _ => {
                return Err(UnknownActionError { tag: s.to_string() });
            }
        })
    }
}

/// Normalized request bundle consumed by the dispatcher.
///
/// The embedding framework is responsible for producing `user`, `headers`,
/// `body`, and `query` from the raw transport request.
#[derive(Clone)]
pub struct HandlerRequest {
    /// Raw action tag, e.g. `org/invitation/create`.
    pub action: String,
    /// Transport method, informational only.
    pub method: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    pub headers: HashMap<String, String>,
    /// The authenticated actor, if any.
    pub user: Option<User>,
    pub adapter: Arc<dyn OrgAdapter>,
    pub options: OrgOptions,
}

impl HandlerRequest {
    /// Get a non-empty query parameter.
    pub(crate) fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Dispatch a normalized request to its handler and shape the response.
#[instrument(skip(req), fields(action = %req.action, method = %req.method))]
pub async fn dispatch(req: &HandlerRequest) -> ApiResponse {
    let Ok(action) = req.action.parse::<OrgAction>() else {
        return ApiResponse::route_not_found();
    };

    let result = match action {
        OrgAction::CreateOrg => organization::create_organization(req).await,
        OrgAction::GetOrg => organization::get_organization(req).await,
        OrgAction::GetFullOrg => organization::get_full_organization(req).await,
        OrgAction::ListOrgs => organization::list_organizations(req).await,
        OrgAction::DeleteOrg => organization::delete_organization(req).await,
        OrgAction::UpdateOrg => organization::update_organization(req).await,
        OrgAction::CreateInvitation => invitation::create_invitation(req).await,
        OrgAction::GetInvitation => invitation::get_invitation(req).await,
        OrgAction::ListInvitations => invitation::list_invitations(req).await,
        OrgAction::UpdateInvitation => invitation::update_invitation(req).await,
        OrgAction::DeleteInvitation => invitation::delete_invitation(req).await,
        OrgAction::CreateMember => member::create_member(req).await,
        OrgAction::GetMember => member::get_member(req).await,
        OrgAction::ListMembers => member::list_members(req).await,
        OrgAction::DeleteMember => member::delete_member(req).await,
        OrgAction::UpdateMember => member::update_member(req).await,
    };

    match result {
        Ok(response) => response,
        Err(OrgError::Storage(err)) => {
            error!(action = %action, error = %err, "unexpected storage failure");
            ApiResponse::server_error()
        }
        Err(err) => {
            // Deliberately uniform: domain errors collapse into an opaque
            // not-found envelope so callers learn nothing about internals.
            error!(action = %action, error = %err, "request failed");
            ApiResponse {
                status: 404,
                data: Value::Null,
            }
        }
    }
}
