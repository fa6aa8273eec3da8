//! Signed, expiring session tokens used as bearer credentials for the
//! marketplace RPC routes.
//!
//! Tokens are `header.payload.signature`, each segment URL-safe base64
//! without padding, signed with HMAC-SHA256 over `header.payload`.
//! Verification is stateless: only the token and the shared secret are
//! consulted.

pub mod claims;
pub mod codec;
pub mod secret;

pub use claims::{SessionClaims, SessionPayload, TokenHeader, ALGORITHM, TOKEN_TYPE};
pub use codec::{now_secs, IssueError, SessionTokenCodec, TokenRejection, DEFAULT_TTL_SECONDS};
pub use secret::SigningSecret;
