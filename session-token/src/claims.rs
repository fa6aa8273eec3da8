use serde::{Deserialize, Serialize};

use crate::codec::IssueError;

/// Signing algorithm written into every token header. Verification always
/// uses this algorithm, whatever the header declares.
pub const ALGORITHM: &str = "HS256";
pub const TOKEN_TYPE: &str = "JWT";

/// Identity assertions supplied by the caller when a token is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl SessionClaims {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            display_name: None,
            avatar_url: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Whitespace-only values count as blank.
    pub(crate) fn validate(&self) -> Result<(), IssueError> {
        if self.user_id.trim().is_empty() {
            return Err(IssueError::InvalidClaims("userId"));
        }
        if self.email.trim().is_empty() {
            return Err(IssueError::InvalidClaims("email"));
        }
        Ok(())
    }
}

/// The signed claim set carried by a token.
///
/// Field order here is the canonical serialization order: changing it
/// changes the bytes that get signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Unix seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl SessionPayload {
    pub fn from_claims(claims: SessionClaims, issued_at: i64, ttl_seconds: i64) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            display_name: claims.display_name,
            avatar_url: claims.avatar_url,
            issued_at,
            expires_at: issued_at.saturating_add(ttl_seconds),
        }
    }

    /// A payload whose expiry equals the reference time is already expired.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    pub fn expires_in(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now).max(0)
    }

    /// Identity claims without the timestamps, e.g. for re-issuing.
    pub fn claims(&self) -> SessionClaims {
        SessionClaims {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub typ: String,
}

impl TokenHeader {
    pub fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}
