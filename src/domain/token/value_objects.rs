// src/domain/token/value_objects.rs
use crate::domain::errors::{DomainError, DomainResult};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

const BEARER_PREFIX: &str = "rt1:";

/// Identifier of an issued refresh token. The bearer value handed to clients
/// is derived from it and decodes back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn to_bearer(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{BEARER_PREFIX}{}", self.0))
    }

    pub fn from_bearer(bearer: &str) -> DomainResult<Self> {
        let malformed = || DomainError::validation("malformed refresh token");

        let decoded = URL_SAFE_NO_PAD.decode(bearer.trim()).map_err(|_| malformed())?;
        let raw = String::from_utf8(decoded).map_err(|_| malformed())?;
        let id = raw.strip_prefix(BEARER_PREFIX).ok_or_else(malformed)?;
        Uuid::parse_str(id).map(Self).map_err(|_| malformed())
    }
}

impl From<TokenId> for Uuid {
    fn from(value: TokenId) -> Self {
        value.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    /// Consumed by a successful rotation.
    Rotated,
    /// Revoked voluntarily by its holder.
    Logout,
    /// Swept by compromise containment after a replay was detected.
    ReuseDetected,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Rotated => "rotated",
            RevocationReason::Logout => "logout",
            RevocationReason::ReuseDetected => "reuse_detected",
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevocationReason {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rotated" => Ok(RevocationReason::Rotated),
            "logout" => Ok(RevocationReason::Logout),
            "reuse_detected" => Ok(RevocationReason::ReuseDetected),
            other => Err(DomainError::Validation(format!(
                "unknown revocation reason '{other}'"
            ))),
        }
    }
}
