//! Invitation route handlers.

use crate::checks::{check_invitation_limit, check_member_limit, LimitCheck};
use crate::error::{require_fields, OrgError, Result};
use crate::invitation::apply_expiry;
use crate::models::{InvitationPatch, InvitationStatus, NewInvitation, Role};
use crate::permissions::PermissionAction;
use crate::response::ApiResponse;
use crate::router::HandlerRequest;
use crate::utils::generate_invite_token;
use serde_json::json;
use tracing::{info, instrument, warn};

/// `org/invitation/create`: invite an email into an organization.
///
/// Requires `invite-member` permission, rejects emails that already hold a
/// membership, and enforces the configured invitation/member limits. The
/// injected notifier is invoked with the token after creation; when absent a
/// warning is logged and creation still succeeds.
#[instrument(skip(req))]
pub(crate) async fn create_invitation(req: &HandlerRequest) -> Result<ApiResponse> {
    let body = require_fields(req.body.as_ref(), &["email", "orgId", "role"])?;
    let user = req
        .user
        .as_ref()
        .filter(|u| !u.id.is_empty())
        .ok_or_else(|| OrgError::invalid_parameter("user is required to create invitation"))?;

    if req.options.send_invitation.is_none() {
        warn!("sendInvitation is not provided! Invitation email/sms will not be sent");
    }

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let org_id = body["orgId"].as_str().unwrap_or_default().to_string();
    let role: Role = serde_json::from_value(body["role"].clone())
        .map_err(|e| OrgError::data_validation(e.to_string()))?;

    let inviting_member = req.adapter.get_member(&user.id, &org_id).await?;
    if !req.options.permissions.allows(
        PermissionAction::InviteMember,
        user,
        inviting_member.as_ref(),
    ) {
        return Ok(ApiResponse::not_authenticated());
    }

    if req
        .adapter
        .get_member_by_email(&email, &org_id)
        .await?
        .is_some()
    {
        return Ok(ApiResponse::bad_request(
            "the user is already a member in this organization!",
        ));
    }

    if let Some(limit) = &req.options.rules.max_active_invitations {
        if check_invitation_limit(limit, &org_id, req.adapter.as_ref()).await?
            == LimitCheck::Exceeded
        {
            return Ok(ApiResponse::limit_reached());
        }
    }
    if let Some(limit) = &req.options.rules.max_members {
        if check_member_limit(limit, &org_id, req.adapter.as_ref()).await? == LimitCheck::Exceeded
        {
            return Ok(ApiResponse::limit_reached());
        }
    }

    let token = req
        .options
        .invite_token_generator
        .as_ref()
        .map(|generate| generate())
        .unwrap_or_else(generate_invite_token);

    let invitation = req
        .adapter
        .create_invitation(NewInvitation {
            email,
            org_id: org_id.clone(),
            role,
            token: token.clone(),
        })
        .await?;

    if let Some(send) = &req.options.send_invitation {
        send(token).await;
    }

    info!(%org_id, invitee = %invitation.email, "invitation created");
    Ok(ApiResponse::ok(
        serde_json::to_value(invitation).unwrap_or_default(),
    ))
}

/// `org/invitation/get`: look up an invitation by token.
///
/// Unauthenticated by design: the invitee may not yet have an account. The
/// payload is augmented with `isRegistered` and projected through the expiry
/// window (never persisted).
#[instrument(skip(req))]
pub(crate) async fn get_invitation(req: &HandlerRequest) -> Result<ApiResponse> {
    let token = req
        .query_param("token")
        .ok_or_else(|| OrgError::invalid_parameter("token is required"))?;

    let Some(invitation) = req.adapter.get_invitation(token).await? else {
        return Ok(ApiResponse::bad_request("invitation couldn't be found!"));
    };

    let is_registered = req
        .adapter
        .get_user_by_email(&invitation.email)
        .await?
        .is_some();
    let invitation = apply_expiry(invitation, req.options.invite_token_expiry);

    let mut data = serde_json::to_value(invitation).unwrap_or_default();
    data["isRegistered"] = json!(is_registered);
    Ok(ApiResponse::ok(data))
}

/// `org/invitation/update`: transition an invitation's status.
///
/// Accepted invitations are immutable. A `rejected` transition is
/// self-service only: the session email must equal the invitation's email
/// and no organization permission is needed. Every other transition
/// requires `update-invitation` permission on the invitation's organization.
#[instrument(skip(req))]
pub(crate) async fn update_invitation(req: &HandlerRequest) -> Result<ApiResponse> {
    let Some(user) = &req.user else {
        return Ok(ApiResponse::not_authenticated());
    };
    let body = require_fields(req.body.as_ref(), &["status"])?;
    let patch: InvitationPatch =
        serde_json::from_value(body).map_err(|e| OrgError::data_validation(e.to_string()))?;
    let token = req
        .query_param("token")
        .ok_or_else(|| OrgError::invalid_parameter("token is required"))?;

    let Some(invitation) = req.adapter.get_invitation(token).await? else {
        return Ok(ApiResponse::bad_request("invitation couldn't be found!"));
    };

    if invitation.status == InvitationStatus::Accepted {
        return Ok(ApiResponse::bad_request("invitation is already accepted!"));
    }

    if patch.status == Some(InvitationStatus::Rejected) {
        if invitation.status != InvitationStatus::Pending {
            return Ok(ApiResponse::bad_request("invitation is not pending!"));
        }
        if user.email.as_deref() != Some(invitation.email.as_str()) {
            return Ok(ApiResponse::not_authenticated());
        }
        let updated = req.adapter.update_invitation(patch, token).await?;
        if let Some(on_rejected) = &req.options.callbacks.on_invitation_rejected {
            on_rejected();
        }
        return Ok(ApiResponse::ok(
            serde_json::to_value(updated).unwrap_or_default(),
        ));
    }

    let member = req.adapter.get_member(&user.id, &invitation.org_id).await?;
    if !req.options.permissions.allows(
        PermissionAction::UpdateInvitation,
        user,
        member.as_ref(),
    ) {
        return Ok(ApiResponse::not_authenticated());
    }

    let updated = req.adapter.update_invitation(patch, token).await?;
    Ok(ApiResponse::ok(
        serde_json::to_value(updated).unwrap_or_default(),
    ))
}

/// `org/invitation/list`: list an organization's invitations with the
/// expiry projection applied to each entry (no persistence side effect).
#[instrument(skip(req))]
pub(crate) async fn list_invitations(req: &HandlerRequest) -> Result<ApiResponse> {
    let org_id = req
        .query_param("orgId")
        .ok_or_else(|| OrgError::invalid_parameter("orgId is required"))?;

    let invitations = req.adapter.list_invitations(org_id).await?;
    let projected: Vec<_> = invitations
        .into_iter()
        .map(|inv| apply_expiry(inv, req.options.invite_token_expiry))
        .collect();
    Ok(ApiResponse::ok(
        serde_json::to_value(projected).unwrap_or_default(),
    ))
}

/// `org/invitation/delete`: delete an invitation by token, requires
/// `delete-invitation` permission on the invitation's organization.
#[instrument(skip(req))]
pub(crate) async fn delete_invitation(req: &HandlerRequest) -> Result<ApiResponse> {
    let token = req
        .query_param("token")
        .ok_or_else(|| OrgError::invalid_parameter("token is required"))?;
    let user = req
        .user
        .as_ref()
        .filter(|u| !u.id.is_empty())
        .ok_or_else(|| OrgError::invalid_parameter("user id is required to delete invitation"))?;

    let Some(invitation) = req.adapter.get_invitation(token).await? else {
        return Ok(ApiResponse::bad_request("invitation couldn't be found!"));
    };

    let member = req.adapter.get_member(&user.id, &invitation.org_id).await?;
    if !req.options.permissions.allows(
        PermissionAction::DeleteInvitation,
        user,
        member.as_ref(),
    ) {
        return Ok(ApiResponse::not_authenticated());
    }

    req.adapter.delete_invitation(token).await?;
    if let Some(on_revoked) = &req.options.callbacks.on_invitation_revoked {
        on_revoked();
    }
    info!(org_id = %invitation.org_id, "invitation deleted");
    Ok(ApiResponse::ok(serde_json::Value::Null))
}
