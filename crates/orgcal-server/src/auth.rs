//! Bearer-token membership lookup.
//!
//! Every API call names an organization, and the caller's token must
//! resolve to an active membership in it. The [`AuthProvider`] trait is
//! the seam a real identity backend plugs into; [`StaticAuth`] is the
//! in-memory table the binary builds from its seed file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use orgcal_store::BoxFuture;

/// Role a member holds within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Member,
    Officer,
    Admin,
}

/// Lifecycle state of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Pending,
    Alumni,
    Removed,
}

/// One user's membership in one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// The member's user id.
    pub user_id: String,
    /// The member's role.
    pub role: MemberRole,
    /// The membership lifecycle state.
    pub status: MembershipStatus,
}

impl Membership {
    /// Creates a membership.
    pub fn new(user_id: impl Into<String>, role: MemberRole, status: MembershipStatus) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            status,
        }
    }

    /// Whether this membership grants calendar access. Only active
    /// members may read or modify an organization's calendar.
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}

/// Errors from membership lookup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token does not belong to any known user.
    #[error("unknown credential")]
    UnknownCredential,

    /// The identity backend failed.
    #[error("membership lookup failed: {message}")]
    Backend { message: String },
}

/// Resolves bearer tokens to organization memberships.
pub trait AuthProvider: Send + Sync {
    /// Looks up the membership the token grants in the organization.
    ///
    /// `Ok(None)` means the token is valid but its user is not a member
    /// of the organization; an unknown token is an error.
    fn membership<'a>(
        &'a self,
        token: &'a str,
        organization_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Membership>, AuthError>>;
}

/// Token table resolved entirely in memory.
#[derive(Debug, Default)]
pub struct StaticAuth {
    tokens: HashMap<String, Vec<(String, Membership)>>,
}

impl StaticAuth {
    /// Creates an empty table. Every lookup fails until members are
    /// registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a token granting the membership in the
    /// organization.
    pub fn with_member(
        mut self,
        token: impl Into<String>,
        organization_id: impl Into<String>,
        membership: Membership,
    ) -> Self {
        self.tokens
            .entry(token.into())
            .or_default()
            .push((organization_id.into(), membership));
        self
    }
}

impl AuthProvider for StaticAuth {
    fn membership<'a>(
        &'a self,
        token: &'a str,
        organization_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Membership>, AuthError>> {
        Box::pin(async move {
            let grants = self
                .tokens
                .get(token)
                .ok_or(AuthError::UnknownCredential)?;
            Ok(grants
                .iter()
                .find(|(org, _)| org == organization_id)
                .map(|(_, membership)| membership.clone()))
        })
    }
}
