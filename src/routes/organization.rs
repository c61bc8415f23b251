//! Organization route handlers.

use crate::error::{require_fields, OrgError, Result};
use crate::models::{NewMember, NewOrganization, OrganizationPatch, Role};
use crate::permissions::PermissionAction;
use crate::response::ApiResponse;
use crate::router::HandlerRequest;
use serde_json::json;
use tracing::{error, info, instrument};

/// `org/create`: create an organization and its owner membership.
///
/// The actor becomes the `owner`. If the owner membership insert fails the
/// just-created organization is deleted again before returning the
/// server-error envelope, so no organization is left without an owner row.
#[instrument(skip(req))]
pub(crate) async fn create_organization(req: &HandlerRequest) -> Result<ApiResponse> {
    let body = require_fields(req.body.as_ref(), &["slug", "name"])?;
    let Some(user) = &req.user else {
        return Ok(ApiResponse::not_authenticated());
    };
    if user.id.is_empty() {
        return Err(OrgError::invalid_parameter("missing required parameters: id"));
    }
    let email = user
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| OrgError::invalid_parameter("missing required parameters: email"))?;

    let input: NewOrganization =
        serde_json::from_value(body).map_err(|e| OrgError::data_validation(e.to_string()))?;

    let created = match req.adapter.create_organization(input).await {
        Ok(org) => org,
        Err(OrgError::DuplicatedSlug { .. }) => return Ok(ApiResponse::duplicated_slug()),
        Err(err) => {
            error!(error = %err, "organization create failed");
            return Ok(ApiResponse::server_error());
        }
    };

    let owner = NewMember {
        org_id: created.slug.clone(),
        user_id: user.id.clone(),
        email: email.to_string(),
        name: user.name.clone(),
        role: Role::Owner,
    };
    let created_owner = match req.adapter.create_member(owner).await {
        Ok(member) => member,
        Err(err) => {
            // Compensate the partial write: an organization must not exist
            // without its owner membership.
            error!(slug = %created.slug, error = %err, "owner membership failed, rolling back organization");
            if let Err(rollback) = req.adapter.delete_organization(&created.slug).await {
                error!(slug = %created.slug, error = %rollback, "rollback failed");
            }
            return Ok(ApiResponse::server_error());
        }
    };

    info!(slug = %created.slug, owner = %user.id, "organization created");

    Ok(ApiResponse::ok(json!({
        "organization": created,
        "member": created_owner,
    })))
}

/// `org/get`: look up an organization by slug.
///
/// With `check_membership` set, the lookup goes through the actor's own
/// organization list instead of trusting the query, so slugs cannot be
/// enumerated across organizations.
#[instrument(skip(req))]
pub(crate) async fn get_organization(req: &HandlerRequest) -> Result<ApiResponse> {
    let org_id = req
        .query_param("orgId")
        .ok_or_else(|| OrgError::invalid_parameter("orgId is required to get organization details"))?;

    if req.options.check_membership {
        let user_id = req
            .user
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OrgError::invalid_parameter("user id is required to check membership"))?;
        let orgs = req.adapter.list_organizations(user_id).await?;
        let found = orgs.into_iter().find(|o| o.slug == org_id);
        return Ok(ApiResponse::ok(serde_json::to_value(found).unwrap_or_default()));
    }

    let org = req.adapter.get_organization(org_id).await?;
    Ok(ApiResponse::ok(serde_json::to_value(org).unwrap_or_default()))
}

/// `org/get/full`: aggregate read of an organization with members and
/// invitations.
#[instrument(skip(req))]
pub(crate) async fn get_full_organization(req: &HandlerRequest) -> Result<ApiResponse> {
    let Some(org_id) = req.query_param("orgId") else {
        return Ok(ApiResponse::bad_request(
            "orgId is required to get organization details",
        ));
    };

    if req.options.check_membership {
        let Some(user_id) = req
            .user
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
        else {
            return Ok(ApiResponse {
                status: 400,
                data: serde_json::Value::Null,
            });
        };
        let orgs = req.adapter.list_organizations(user_id).await?;
        if !orgs.iter().any(|o| o.slug == org_id) {
            return Ok(ApiResponse::not_authenticated());
        }
    }

    let Some(full) = req.adapter.get_full_organization(org_id).await? else {
        return Ok(ApiResponse::record_not_found());
    };
    Ok(ApiResponse::ok(
        serde_json::to_value(full).unwrap_or_default(),
    ))
}

/// `org/list`: list the actor's organizations.
#[instrument(skip(req))]
pub(crate) async fn list_organizations(req: &HandlerRequest) -> Result<ApiResponse> {
    let user_id = req
        .user
        .as_ref()
        .map(|u| u.id.as_str())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            OrgError::invalid_parameter("user id is required to get organization list")
        })?;
    let orgs = req.adapter.list_organizations(user_id).await?;
    Ok(ApiResponse::ok(
        serde_json::to_value(orgs).unwrap_or_default(),
    ))
}

/// `org/delete`: delete an organization, owner permission required.
#[instrument(skip(req))]
pub(crate) async fn delete_organization(req: &HandlerRequest) -> Result<ApiResponse> {
    let org_id = req
        .query_param("orgId")
        .ok_or_else(|| OrgError::invalid_parameter("orgId is required to delete organization"))?;
    let user = req
        .user
        .as_ref()
        .ok_or_else(|| OrgError::invalid_parameter("user is required to delete organization"))?;

    let member = req
        .adapter
        .get_member(&user.id, org_id)
        .await?
        .ok_or_else(|| OrgError::invalid_parameter("user is not a member of organization"))?;

    if !req
        .options
        .permissions
        .allows(PermissionAction::DeleteOrg, user, Some(&member))
    {
        return Ok(ApiResponse::not_authenticated());
    }

    req.adapter.delete_organization(org_id).await?;
    info!(org_id, actor = %user.id, "organization deleted");
    Ok(ApiResponse::ok(serde_json::Value::Null))
}

/// `org/update`: partial update, admin or owner permission required.
#[instrument(skip(req))]
pub(crate) async fn update_organization(req: &HandlerRequest) -> Result<ApiResponse> {
    let org_id = req
        .query_param("orgId")
        .ok_or_else(|| OrgError::invalid_parameter("orgId is required"))?;
    let user = req
        .user
        .as_ref()
        .ok_or_else(|| OrgError::invalid_parameter("user is required"))?;

    let Some(member) = req.adapter.get_member(&user.id, org_id).await? else {
        return Ok(ApiResponse::not_authenticated());
    };

    if !req
        .options
        .permissions
        .allows(PermissionAction::UpdateOrg, user, Some(&member))
    {
        return Ok(ApiResponse::not_authenticated());
    }

    let patch: OrganizationPatch = match &req.body {
        Some(body) => serde_json::from_value(body.clone())
            .map_err(|e| OrgError::data_validation(e.to_string()))?,
        None => OrganizationPatch::default(),
    };
    let updated = req.adapter.update_organization(patch, org_id).await?;
    Ok(ApiResponse::ok(
        serde_json::to_value(updated).unwrap_or_default(),
    ))
}
