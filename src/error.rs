//! Domain error taxonomy.
//!
//! Every failure raised inside the core is an [`OrgError`]. Handlers raise
//! these for caller-facing misuse (missing parameters, unresolvable actors);
//! business-rule outcomes are returned as response envelopes instead. The
//! dispatcher is the only boundary that converts raised errors into
//! envelopes.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during organization operations.
#[derive(Debug, Error)]
pub enum OrgError {
    /// The core was wired up incorrectly.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing or malformed request input.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No user account exists for the given identity.
    #[error("user not found")]
    UserNotFound,

    /// The acting user has neither a resolvable id nor email.
    #[error("user has neither an id nor an email")]
    UserIdentityAmbiguous,

    /// No storage adapter was provided.
    #[error("no storage adapter configured")]
    MissingAdapter,

    /// The storage adapter does not implement required operations.
    #[error("storage adapter is missing methods: {0}")]
    MissingAdapterMethods(String),

    /// Organization slug is already taken.
    #[error("slug already taken: {slug}")]
    DuplicatedSlug {
        /// The slug that is taken.
        slug: String,
    },

    /// User already has a membership in the organization.
    #[error("user already a member of organization {org_id}")]
    DuplicatedMembership {
        /// The organization slug.
        org_id: String,
    },

    /// Member not found.
    #[error("member not found: {member_id}")]
    MemberNotFound {
        /// The member id that was not found.
        member_id: String,
    },

    /// Payload failed deserialization or schema validation.
    #[error("data validation failed: {0}")]
    DataValidation(String),

    /// Unexpected backing-store failure. The cause chain is preserved for
    /// diagnostics; the dispatcher presents a generic envelope to callers.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl OrgError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a duplicated slug error.
    pub fn duplicated_slug(slug: impl Into<String>) -> Self {
        Self::DuplicatedSlug { slug: slug.into() }
    }

    /// Create a duplicated membership error.
    pub fn duplicated_membership(org_id: impl Into<String>) -> Self {
        Self::DuplicatedMembership {
            org_id: org_id.into(),
        }
    }

    /// Create a member not found error.
    pub fn member_not_found(member_id: impl Into<String>) -> Self {
        Self::MemberNotFound {
            member_id: member_id.into(),
        }
    }

    /// Create a data validation error.
    pub fn data_validation(msg: impl Into<String>) -> Self {
        Self::DataValidation(msg.into())
    }
}

/// Result type for organization operations.
pub type Result<T> = std::result::Result<T, OrgError>;

/// Validate that a JSON body is present and carries the required keys.
///
/// A key counts as missing when it is absent, `null`, or an empty string.
/// Returns the body for further deserialization, or an
/// [`OrgError::InvalidParameter`] naming every missing key.
pub(crate) fn require_fields(body: Option<&Value>, required: &[&str]) -> Result<Value> {
    let Some(body) = body else {
        return Err(OrgError::invalid_parameter("request body is required"));
    };
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| {
            body.get(key)
                .map_or(true, |v| v.is_null() || v.as_str() == Some(""))
        })
        .collect();
    if !missing.is_empty() {
        return Err(OrgError::invalid_parameter(format!(
            "missing required parameters: {}",
            missing.join(", ")
        )));
    }
    Ok(body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_fields_passes_complete_body() {
        let body = json!({"slug": "acme", "name": "Acme"});
        let result = require_fields(Some(&body), &["slug", "name"]).unwrap();
        assert_eq!(result["slug"], "acme");
    }

    #[test]
    fn test_require_fields_names_missing_keys() {
        let body = json!({"slug": "acme", "role": null, "email": ""});
        let err = require_fields(Some(&body), &["slug", "email", "role", "orgId"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("email"));
        assert!(msg.contains("role"));
        assert!(msg.contains("orgId"));
        assert!(!msg.contains("slug"));
    }

    #[test]
    fn test_require_fields_rejects_absent_body() {
        let err = require_fields(None, &[]).unwrap_err();
        assert!(matches!(err, OrgError::InvalidParameter(_)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            OrgError::duplicated_slug("acme").to_string(),
            "slug already taken: acme"
        );
        assert_eq!(
            OrgError::member_not_found("m_1").to_string(),
            "member not found: m_1"
        );
    }
}
