//! Member route handlers.

use crate::checks::{check_member_limit, LimitCheck};
use crate::error::{require_fields, OrgError, Result};
use crate::models::{InvitationPatch, InvitationStatus, MemberPatch, NewMember, Role};
use crate::options::OwnerLeavePolicy;
use crate::permissions::PermissionAction;
use crate::response::ApiResponse;
use crate::router::HandlerRequest;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMemberPayload {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    invitation_token: Option<String>,
}

/// `org/member/create`: create a membership.
///
/// Two paths: an invitation token (auto-approved when the invitation is
/// `pending` and its email matches the joining identity), or direct creation
/// gated by `create-member-without-invitation` — denied for everyone by
/// default. A consumed invitation ends in exactly one terminal state:
/// deleted when `delete_invitation_after_accept` is set, marked `accepted`
/// otherwise.
#[instrument(skip(req))]
pub(crate) async fn create_member(req: &HandlerRequest) -> Result<ApiResponse> {
    let Some(user) = &req.user else {
        return Ok(ApiResponse::not_authenticated());
    };
    let body = require_fields(req.body.as_ref(), &[])?;
    let payload: CreateMemberPayload =
        serde_json::from_value(body).map_err(|e| OrgError::data_validation(e.to_string()))?;

    let user_id = payload.user_id.unwrap_or_else(|| user.id.clone());
    let email = payload
        .email
        .or_else(|| user.email.clone())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| OrgError::invalid_parameter("email is required to create member"))?;
    let name = payload.name.or_else(|| user.name.clone());

    let invitation = match &payload.invitation_token {
        Some(token) => req.adapter.get_invitation(token).await?,
        None => None,
    };
    let is_invited = invitation
        .as_ref()
        .is_some_and(|inv| inv.email == email && inv.status == InvitationStatus::Pending);

    let org_id = invitation
        .as_ref()
        .map(|inv| inv.org_id.clone())
        .or_else(|| req.query_param("orgId").map(str::to_string))
        .ok_or_else(|| OrgError::invalid_parameter("orgId is required to create member"))?;

    if let Some(limit) = &req.options.rules.max_members {
        if check_member_limit(limit, &org_id, req.adapter.as_ref()).await? == LimitCheck::Exceeded
        {
            return Ok(ApiResponse::limit_reached());
        }
    }

    if !is_invited {
        // Direct creation path: nobody may do this unless a rule is
        // configured for create-member-without-invitation.
        let creating_member = req.adapter.get_member(&user.id, &org_id).await?;
        if !req.options.permissions.allows(
            PermissionAction::CreateMemberWithoutInvitation,
            user,
            creating_member.as_ref(),
        ) {
            return Ok(ApiResponse::not_authenticated());
        }
    }

    let role = if is_invited {
        invitation.as_ref().map(|inv| inv.role).unwrap_or_default()
    } else {
        payload.role.unwrap_or_default()
    };

    let created = req
        .adapter
        .create_member(NewMember {
            org_id: org_id.clone(),
            user_id,
            email,
            name,
            role,
        })
        .await?;

    if let Some(invitation) = invitation.as_ref().filter(|_| is_invited) {
        // Exactly one terminal state for the consumed invitation.
        if req.options.rules.delete_invitation_after_accept {
            req.adapter.delete_invitation(&invitation.token).await?;
        } else {
            req.adapter
                .update_invitation(
                    InvitationPatch {
                        status: Some(InvitationStatus::Accepted),
                        role: None,
                    },
                    &invitation.token,
                )
                .await?;
        }
        if let Some(on_accepted) = &req.options.callbacks.on_invitation_accepted {
            on_accepted(invitation, &created);
        }
    }

    info!(%org_id, member = %created.id, invited = is_invited, "member created");
    Ok(ApiResponse::ok(
        serde_json::to_value(created).unwrap_or_default(),
    ))
}

/// `org/member/delete`: remove a member, `remove-member` permission
/// required.
///
/// Owner departures follow the configured [`OwnerLeavePolicy`]: denied
/// outright by default; with a `min_owners` floor the departure is denied
/// when the remaining owner count would fall below it; and when the
/// organization would be left empty with `delete_abandoned_org` set, the
/// organization itself is deleted instead of the membership.
#[instrument(skip(req))]
pub(crate) async fn delete_member(req: &HandlerRequest) -> Result<ApiResponse> {
    enum Target<'a> {
        UserId(&'a str),
        Email(&'a str),
    }

    let Some(org_id) = req.query_param("orgId") else {
        return Err(OrgError::invalid_parameter(
            "orgId and either userId or email is required",
        ));
    };
    let target = match (req.query_param("userId"), req.query_param("email")) {
        (Some(user_id), _) => Target::UserId(user_id),
        (None, Some(email)) => Target::Email(email),
        (None, None) => {
            return Err(OrgError::invalid_parameter(
                "orgId and either userId or email is required",
            ));
        }
    };
    let Some(user) = &req.user else {
        return Ok(ApiResponse::not_authenticated());
    };

    let deleting_member = req.adapter.get_member(&user.id, org_id).await?;
    if !req.options.permissions.allows(
        PermissionAction::RemoveMember,
        user,
        deleting_member.as_ref(),
    ) {
        return Ok(ApiResponse::not_authenticated());
    }

    let found = match target {
        Target::UserId(user_id) => req.adapter.get_member(user_id, org_id).await?,
        Target::Email(email) => req.adapter.get_member_by_email(email, org_id).await?,
    };
    let Some(found) = found else {
        return Ok(ApiResponse::record_not_found());
    };

    if found.role == Role::Owner {
        match &req.options.rules.allow_owners_to_leave_org {
            OwnerLeavePolicy::Deny => return Ok(ApiResponse::owner_leave_error()),
            OwnerLeavePolicy::Allow {
                min_owners,
                delete_abandoned_org,
            } => {
                let members = req.adapter.list_members(org_id).await?;
                let owners = members.iter().filter(|m| m.role == Role::Owner).count() as u32;
                if let Some(min) = min_owners {
                    if owners.saturating_sub(1) < *min {
                        return Ok(ApiResponse::owner_leave_error());
                    }
                }
                if *delete_abandoned_org && members.len() <= 1 {
                    req.adapter.delete_organization(org_id).await?;
                    info!(org_id, "abandoned organization deleted");
                    return Ok(ApiResponse::ok(serde_json::Value::Null));
                }
            }
        }
    }

    req.adapter.delete_member(&found.id).await?;
    info!(org_id, member = %found.id, actor = %user.id, "member removed");
    Ok(ApiResponse::ok(serde_json::Value::Null))
}

/// `org/member/get`: look up a membership.
///
/// An explicit `email` query parameter wins over the session identity; with
/// no `orgId` the email path degrades to a plain user lookup. The session
/// path returns the membership together with the session user record.
#[instrument(skip(req))]
pub(crate) async fn get_member(req: &HandlerRequest) -> Result<ApiResponse> {
    let org_id = req.query_param("orgId");
    let query_email = req.query_param("email");
    let session = req.user.as_ref().filter(|u| !u.id.is_empty());

    let email_lookup = query_email.or_else(|| {
        // No usable session id: fall back to the session email.
        session
            .is_none()
            .then(|| req.user.as_ref().and_then(|u| u.email.as_deref()))
            .flatten()
    });

    if let Some(email) = email_lookup {
        if session.is_none() {
            debug!("can't find user id, falling back to email");
        }
        let Some(org_id) = org_id else {
            let found = req.adapter.get_user_by_email(email).await?;
            return Ok(ApiResponse::ok(
                serde_json::to_value(found).unwrap_or_default(),
            ));
        };
        let member = req
            .adapter
            .get_member_by_email(email, org_id)
            .await?
            .ok_or_else(|| OrgError::member_not_found(email))?;
        return Ok(ApiResponse::ok(
            serde_json::to_value(member).unwrap_or_default(),
        ));
    }

    let Some(user) = session else {
        return Err(OrgError::UserIdentityAmbiguous);
    };
    let org_id = org_id.ok_or_else(|| OrgError::invalid_parameter("orgId is required"))?;
    let Some(member) = req.adapter.get_member(&user.id, org_id).await? else {
        return Ok(ApiResponse::record_not_found());
    };
    let mut data = serde_json::to_value(member).unwrap_or_default();
    data["user"] = json!(user);
    Ok(ApiResponse::ok(data))
}

/// `org/member/list`: list an organization's members, with the same
/// `check_membership` gating as organization reads.
#[instrument(skip(req))]
pub(crate) async fn list_members(req: &HandlerRequest) -> Result<ApiResponse> {
    let org_id = req
        .query_param("orgId")
        .ok_or_else(|| OrgError::invalid_parameter("orgId is required"))?;

    if req.options.check_membership {
        let user_id = req
            .user
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                OrgError::invalid_parameter("user id is required to check membership")
            })?;
        let orgs = req.adapter.list_organizations(user_id).await?;
        if !orgs.iter().any(|o| o.slug == org_id) {
            return Ok(ApiResponse::not_authenticated());
        }
    }

    let members = req.adapter.list_members(org_id).await?;
    Ok(ApiResponse::ok(
        serde_json::to_value(members).unwrap_or_default(),
    ))
}

/// `org/member/update`: partial update of a member, `update-member`
/// permission required. The target is addressed by id, or by email within
/// the organization.
#[instrument(skip(req))]
pub(crate) async fn update_member(req: &HandlerRequest) -> Result<ApiResponse> {
    enum Target<'a> {
        Id(&'a str),
        Email(&'a str, &'a str),
    }

    let org_id = req.query_param("orgId");
    let target = match (req.query_param("id"), req.query_param("email"), org_id) {
        (Some(id), _, _) => Target::Id(id),
        (None, Some(email), Some(org_id)) => Target::Email(email, org_id),
        _ => {
            return Err(OrgError::invalid_parameter(
                "either id, or email and orgId, is required to update a member",
            ));
        }
    };
    let user = req
        .user
        .as_ref()
        .ok_or_else(|| OrgError::invalid_parameter("user is required to update a member"))?;

    let updating_member = match org_id {
        Some(org_id) => req.adapter.get_member(&user.id, org_id).await?,
        None => None,
    };
    if !req.options.permissions.allows(
        PermissionAction::UpdateMember,
        user,
        updating_member.as_ref(),
    ) {
        return Ok(ApiResponse::not_authenticated());
    }

    let patch: MemberPatch = match &req.body {
        Some(body) => serde_json::from_value(body.clone())
            .map_err(|e| OrgError::data_validation(e.to_string()))?,
        None => MemberPatch::default(),
    };

    let target_id = match target {
        Target::Id(id) => id.to_string(),
        Target::Email(email, org_id) => {
            req.adapter
                .get_member_by_email(email, org_id)
                .await?
                .ok_or_else(|| OrgError::member_not_found(email))?
                .id
        }
    };

    let updated = req.adapter.update_member(patch, &target_id).await?;
    Ok(ApiResponse::ok(
        serde_json::to_value(updated).unwrap_or_default(),
    ))
}
