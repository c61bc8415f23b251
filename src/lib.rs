//! Orgkit - organization and team membership for any Rust backend
//!
//! Orgkit is a framework-agnostic core for multi-tenant team features:
//! organizations, memberships with roles, and email invitations. It owns the
//! business rules (permissions, limits, invitation lifecycle) and delegates
//! persistence to a pluggable [`OrgAdapter`], so it embeds into any HTTP
//! stack that can produce a [`HandlerRequest`].
//!
//! # Features
//!
//! - **Routing**: action-tag dispatch (`org/create`, `org/invitation/get`, ...)
//!   to handlers producing uniform `{status, data}` envelopes
//! - **Permissions**: per-action role rules with custom-predicate escape hatch
//! - **Invitations**: token-addressed, with configurable expiry and limits
//! - **Storage**: bring your own database behind the [`OrgAdapter`] trait
//! - **Testing**: in-memory adapter behind the `test-adapter` feature
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use orgkit::{dispatch, HandlerRequest, OrgOptions};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # async fn handle(adapter: Arc<dyn orgkit::OrgAdapter>, user: orgkit::User) {
//! // Initialize logging
//! orgkit::init_tracing();
//!
//! // Build a request bundle from your framework's request, then dispatch.
//! let req = HandlerRequest {
//!     action: "org/list".into(),
//!     method: "GET".into(),
//!     query: HashMap::new(),
//!     body: None,
//!     headers: HashMap::new(),
//!     user: Some(user),
//!     adapter,
//!     options: OrgOptions::new(),
//! };
//! let response = dispatch(&req).await;
//! assert_eq!(response.status, 200);
//! # }
//! ```

mod adapter;
pub mod checks;
mod error;
pub mod invitation;
mod models;
mod options;
pub mod permissions;
mod response;
mod router;
mod routes;
#[cfg(any(test, feature = "test-adapter"))]
pub mod test_adapter;
mod utils;

// Re-exports for public API
pub use adapter::OrgAdapter;
pub use checks::{check_invitation_limit, check_member_limit, BoxFuture, Limit, LimitCheck};
pub use error::{OrgError, Result};
pub use invitation::{apply_expiry, DEFAULT_INVITE_EXPIRY_MS};
pub use models::{
    FullOrganization, InvitationPatch, InvitationStatus, MemberPatch, NewInvitation, NewMember,
    NewOrganization, Organization, OrganizationInvitation, OrganizationMember, OrganizationPatch,
    ParseRoleError, Role, User,
};
pub use options::{
    Callbacks, GetCurrentUserFn, InviteTokenGeneratorFn, OnInvitationAcceptedFn, OrgOptions,
    OwnerLeavePolicy, Rules, SendInvitationFn,
};
pub use permissions::{
    check_permission, Actor, PermissionAction, PermissionPolicy, PermissionPredicate, Rule,
};
pub use response::ApiResponse;
pub use router::{dispatch, HandlerRequest, OrgAction, UnknownActionError};
#[cfg(any(test, feature = "test-adapter"))]
pub use test_adapter::InMemoryAdapter;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "orgkit=debug")
/// - `ORGKIT_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("ORGKIT_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
