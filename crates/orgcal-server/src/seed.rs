//! Seed data loaded at startup.
//!
//! The binary has no database connection of its own; it boots from a
//! JSON file holding a [`StoreSnapshot`] plus the bearer tokens it
//! should accept.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use orgcal_store::StoreSnapshot;

use crate::auth::{MemberRole, Membership, MembershipStatus, StaticAuth};

/// Errors loading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid seed JSON.
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk bootstrap data: calendar rows plus token grants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFile {
    /// Rows for every calendar table.
    #[serde(default)]
    pub store: StoreSnapshot,
    /// Accepted bearer tokens and the memberships they grant.
    #[serde(default)]
    pub identities: Vec<SeedIdentity>,
}

/// One bearer token and the memberships it grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedIdentity {
    /// The accepted token.
    pub token: String,
    /// The user the token belongs to.
    pub user_id: String,
    /// The organizations the user belongs to.
    #[serde(default)]
    pub memberships: Vec<SeedMembership>,
}

/// A membership grant inside a seed identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedMembership {
    /// The granting organization.
    pub organization_id: String,
    /// The member's role.
    pub role: MemberRole,
    /// The membership lifecycle state.
    pub status: MembershipStatus,
}

impl SeedFile {
    /// Loads and parses a seed file.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Builds the token table described by the identities.
    pub fn auth(&self) -> StaticAuth {
        let mut auth = StaticAuth::new();
        for identity in &self.identities {
            for grant in &identity.memberships {
                auth = auth.with_member(
                    identity.token.as_str(),
                    grant.organization_id.as_str(),
                    Membership::new(identity.user_id.as_str(), grant.role, grant.status),
                );
            }
        }
        auth
    }
}
