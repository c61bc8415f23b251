//! Route handlers, one per action tag.
//!
//! Every handler follows the same pipeline: required-field validation,
//! permission and limit checks against the actor's membership, adapter
//! calls, then response shaping. Business-rule violations are returned as
//! envelopes; only missing or malformed input raises.

pub(crate) mod invitation;
pub(crate) mod member;
pub(crate) mod organization;
