//! Numeric limit checking for members and invitations.
//!
//! Limits may be a literal number or derived per organization, synchronously
//! or asynchronously. All forms are normalized to a number before comparing
//! against the current count. An exceeded limit is a distinguished outcome,
//! not an error, so callers decide how to respond.

use crate::adapter::OrgAdapter;
use crate::error::Result;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future used by async limit functions and injected callbacks.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A numeric limit, fixed or derived from the organization id.
#[derive(Clone)]
pub enum Limit {
    /// A literal maximum.
    Fixed(u32),
    /// Derived synchronously per organization.
    PerOrg(Arc<dyn Fn(&str) -> u32 + Send + Sync>),
    /// Derived asynchronously per organization.
    PerOrgAsync(Arc<dyn Fn(&str) -> BoxFuture<u32> + Send + Sync>),
}

impl fmt::Debug for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(max) => f.debug_tuple("Fixed").field(max).finish(),
            Self::PerOrg(_) => f.write_str("PerOrg(..)"),
            Self::PerOrgAsync(_) => f.write_str("PerOrgAsync(..)"),
        }
    }
}

impl From<u32> for Limit {
    fn from(max: u32) -> Self {
        Self::Fixed(max)
    }
}

impl Limit {
    /// Normalize the limit to a number for the given organization.
    pub async fn resolve(&self, org_id: &str) -> u32 {
        match self {
            Self::Fixed(max) => *max,
            Self::PerOrg(f) => f(org_id),
            Self::PerOrgAsync(f) => f(org_id).await,
        }
    }
}

/// Outcome of a limit check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitCheck {
    WithinLimit,
    Exceeded,
}

/// Check the organization's member count against a limit.
///
/// Exceeded exactly when `count >= max`.
pub async fn check_member_limit(
    limit: &Limit,
    org_id: &str,
    adapter: &dyn OrgAdapter,
) -> Result<LimitCheck> {
    let members = adapter.list_members(org_id).await?;
    let max = limit.resolve(org_id).await;
    Ok(compare(members.len(), max))
}

/// Check the organization's invitation count against a limit.
///
/// Exceeded exactly when `count >= max`.
pub async fn check_invitation_limit(
    limit: &Limit,
    org_id: &str,
    adapter: &dyn OrgAdapter,
) -> Result<LimitCheck> {
    let invitations = adapter.list_invitations(org_id).await?;
    let max = limit.resolve(org_id).await;
    Ok(compare(invitations.len(), max))
}

fn compare(count: usize, max: u32) -> LimitCheck {
    if count as u32 >= max {
        LimitCheck::Exceeded
    } else {
        LimitCheck::WithinLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_limit_forms_resolve_to_same_threshold() {
        let fixed = Limit::Fixed(5);
        let sync = Limit::PerOrg(Arc::new(|_org| 5));
        let as_fn = Limit::PerOrgAsync(Arc::new(|_org| {
            Box::pin(async { 5u32 }) as BoxFuture<u32>
        }));

        assert_eq!(fixed.resolve("acme").await, 5);
        assert_eq!(sync.resolve("acme").await, 5);
        assert_eq!(as_fn.resolve("acme").await, 5);
    }

    #[test]
    fn test_exceeded_at_threshold_not_above() {
        assert_eq!(compare(4, 5), LimitCheck::WithinLimit);
        assert_eq!(compare(5, 5), LimitCheck::Exceeded);
        assert_eq!(compare(6, 5), LimitCheck::Exceeded);
    }

    #[tokio::test]
    async fn test_per_org_limit_sees_org_id() {
        let limit = Limit::PerOrg(Arc::new(|org| if org == "big" { 100 } else { 1 }));
        assert_eq!(limit.resolve("big").await, 100);
        assert_eq!(limit.resolve("small").await, 1);
    }
}
