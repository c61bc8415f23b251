//! Response envelopes.
//!
//! Every handler resolves to an [`ApiResponse`]. Business-rule violations
//! (permission denied, duplicate slug, limit reached, owner departure
//! blocked) are expected outcomes and use the canned envelopes below rather
//! than raised errors.

use serde::Serialize;
use serde_json::{json, Value};

/// The uniform `{status, data}` envelope returned by the dispatcher.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    /// 200 with a payload.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }

    /// 400 with a human-readable business-rule message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            data: json!({ "message": message.into() }),
        }
    }

    /// 403: the actor lacks permission for the action.
    #[must_use]
    pub fn not_authenticated() -> Self {
        Self {
            status: 403,
            data: json!({
                "error": { "message": "You don't have permission to perform this action!" }
            }),
        }
    }

    /// 500: unexpected failure, details withheld from the caller.
    #[must_use]
    pub fn server_error() -> Self {
        Self {
            status: 500,
            data: json!({
                "error": { "message": "Some error happened on the server!" }
            }),
        }
    }

    /// 404: the action tag is not part of the routing table.
    #[must_use]
    pub fn route_not_found() -> Self {
        Self {
            status: 404,
            data: json!({ "error": { "message": "Route Not Found" } }),
        }
    }

    /// 409: organization slug collision.
    #[must_use]
    pub fn duplicated_slug() -> Self {
        Self {
            status: 409,
            data: json!({ "error": { "message": "duplicated slug" } }),
        }
    }

    /// 200 with a null-ish payload: the record does not exist.
    ///
    /// Intentionally not a 404 to keep client handling uniform.
    #[must_use]
    pub fn record_not_found() -> Self {
        Self {
            status: 200,
            data: json!({ "error": { "message": "Record not found" } }),
        }
    }

    /// 400: an owner may not leave the organization under the current rules.
    #[must_use]
    pub fn owner_leave_error() -> Self {
        Self {
            status: 400,
            data: json!({
                "error": { "message": "owner can't leave the organization" }
            }),
        }
    }

    /// 400: a configured member or invitation limit is reached.
    #[must_use]
    pub fn limit_reached() -> Self {
        Self::bad_request("max allowed invitations reached!")
    }
}
