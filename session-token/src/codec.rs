use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha256;

use crate::claims::{SessionClaims, SessionPayload, TokenHeader, ALGORITHM};
use crate::secret::SigningSecret;

type HmacSha256 = Hmac<Sha256>;

/// Seven days.
pub const DEFAULT_TTL_SECONDS: i64 = 604_800;

const SEGMENT_DELIMITER: char = '.';

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("signing secret not configured")]
    Configuration,

    #[error("session claim `{0}` must not be empty")]
    InvalidClaims(&'static str),

    #[error("failed to encode session token segment: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a token was refused. Only meant for server-side logs; callers
/// should treat every variant as "unauthenticated".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("signing secret not configured")]
    SecretMissing,

    #[error("session token is malformed")]
    Malformed,

    #[error("session token signature is invalid")]
    SignatureMismatch,

    #[error("session token declares unsupported algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("failed to decode session token segment")]
    DecodeFailure,

    #[error("session token is expired")]
    Expired,
}

impl TokenRejection {
    fn log(&self) {
        match self {
            TokenRejection::SecretMissing => {
                log::error!("Session token verification failed closed: {}", self)
            }
            _ => log::debug!("Rejected session token: {}", self),
        }
    }
}

/// Issues and verifies HS256 session tokens without any server-side state.
#[derive(Debug, Clone)]
pub struct SessionTokenCodec {
    secret: Option<SigningSecret>,
}

impl SessionTokenCodec {
    pub fn new(secret: Option<SigningSecret>) -> Self {
        Self { secret }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn issue(
        &self,
        claims: &SessionClaims,
        ttl_seconds: Option<i64>,
    ) -> Result<String, IssueError> {
        self.issue_at(
            claims,
            ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS),
            now_secs(),
        )
    }

    /// Issues a token as if the clock read `now`. A non-positive ttl gives a
    /// token that is already expired.
    pub fn issue_at(
        &self,
        claims: &SessionClaims,
        ttl_seconds: i64,
        now: i64,
    ) -> Result<String, IssueError> {
        let secret = self.secret.as_ref().ok_or(IssueError::Configuration)?;
        claims.validate()?;

        let payload = SessionPayload::from_claims(claims.clone(), now, ttl_seconds);
        let header_b64 = encode_segment(&TokenHeader::hs256())?;
        let payload_b64 = encode_segment(&payload)?;

        let signing_input = signing_input(&header_b64, &payload_b64);
        let signature = sign(secret, signing_input.as_bytes()).ok_or(IssueError::Configuration)?;
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

        Ok(format!("{signing_input}{SEGMENT_DELIMITER}{signature_b64}"))
    }

    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        self.verify_at(token, now_secs())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Option<SessionPayload> {
        match self.check_at(token, now) {
            Ok(payload) => Some(payload),
            Err(rejection) => {
                rejection.log();
                None
            }
        }
    }

    /// Full verification keeping the rejection reason.
    pub fn check_at(&self, token: &str, now: i64) -> Result<SessionPayload, TokenRejection> {
        let secret = self.secret.as_ref().ok_or(TokenRejection::SecretMissing)?;
        let [header_b64, payload_b64, signature_b64] = split_segments(token)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenRejection::SignatureMismatch)?;

        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenRejection::SecretMissing)?;
        mac.update(signing_input(header_b64, payload_b64).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenRejection::SignatureMismatch)?;

        // The header is signed too, but its algorithm never picks the verifier.
        let header: TokenHeader = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenRejection::UnsupportedAlgorithm(header.alg));
        }

        let payload: SessionPayload = decode_segment(payload_b64)?;
        if payload.is_expired(now) {
            return Err(TokenRejection::Expired);
        }

        Ok(payload)
    }
}

/// Current Unix time in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn signing_input(header_b64: &str, payload_b64: &str) -> String {
    format!("{header_b64}{SEGMENT_DELIMITER}{payload_b64}")
}

fn sign(secret: &SigningSecret, bytes: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(bytes);
    Some(mac.finalize().into_bytes().to_vec())
}

fn split_segments(token: &str) -> Result<[&str; 3], TokenRejection> {
    let mut parts = token.split(SEGMENT_DELIMITER);
    let segments = [parts.next(), parts.next(), parts.next()];
    if parts.next().is_some() {
        return Err(TokenRejection::Malformed);
    }
    match segments {
        [Some(header), Some(payload), Some(signature)]
            if !header.is_empty() && !payload.is_empty() && !signature.is_empty() =>
        {
            Ok([header, payload, signature])
        }
        _ => Err(TokenRejection::Malformed),
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenRejection> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenRejection::DecodeFailure)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenRejection::DecodeFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> SessionTokenCodec {
        SessionTokenCodec::new(SigningSecret::new(
            b"01234567890123456789012345678901".to_vec(),
        ))
    }

    fn claims() -> SessionClaims {
        SessionClaims::new("u1", "a@b.com")
    }

    #[test]
    fn issue_and_verify_at_fixed_clock() {
        let codec = test_codec();
        let token = codec.issue_at(&claims(), 10, 1_000).expect("issue token");

        let payload = codec.verify_at(&token, 1_005).expect("live token");
        assert_eq!(payload.issued_at, 1_000);
        assert_eq!(payload.expires_at, 1_010);
        assert_eq!(payload.user_id, "u1");

        assert!(codec.verify_at(&token, 1_011).is_none());
        assert_eq!(codec.check_at(&token, 1_010), Err(TokenRejection::Expired));
    }

    #[test]
    fn header_segment_is_fixed() {
        let token = test_codec().issue_at(&claims(), 10, 1_000).expect("issue token");
        let header = token.split('.').next().expect("header segment");
        assert_eq!(header, "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
    }

    #[test]
    fn rejects_signed_token_with_foreign_algorithm() {
        let codec = test_codec();
        let secret = SigningSecret::new(b"01234567890123456789012345678901".to_vec())
            .expect("secret");

        let header_b64 = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = SessionPayload::from_claims(claims(), 1_000, 10);
        let payload_b64 = encode_segment(&payload).expect("encode payload");
        let input = signing_input(&header_b64, &payload_b64);
        let signature = URL_SAFE_NO_PAD.encode(sign(&secret, input.as_bytes()).expect("sign"));
        let token = format!("{input}.{signature}");

        assert_eq!(
            codec.check_at(&token, 1_001),
            Err(TokenRejection::UnsupportedAlgorithm("none".to_string()))
        );
    }

    #[test]
    fn rejects_signed_garbage_payload() {
        let secret = SigningSecret::new(b"01234567890123456789012345678901".to_vec())
            .expect("secret");
        let header_b64 = encode_segment(&TokenHeader::hs256()).expect("encode header");
        let payload_b64 = URL_SAFE_NO_PAD.encode(b"not json");
        let input = signing_input(&header_b64, &payload_b64);
        let signature = URL_SAFE_NO_PAD.encode(sign(&secret, input.as_bytes()).expect("sign"));
        let token = format!("{input}.{signature}");

        assert_eq!(
            test_codec().check_at(&token, 0),
            Err(TokenRejection::DecodeFailure)
        );
    }

    #[test]
    fn classifies_rejections() {
        let codec = test_codec();
        assert_eq!(codec.check_at("", 0), Err(TokenRejection::Malformed));
        assert_eq!(codec.check_at("a..c", 0), Err(TokenRejection::Malformed));
        assert_eq!(codec.check_at("a.b.c.d", 0), Err(TokenRejection::Malformed));
        assert_eq!(
            codec.check_at("a.b.c", 0),
            Err(TokenRejection::SignatureMismatch)
        );

        let unconfigured = SessionTokenCodec::new(None);
        assert_eq!(
            unconfigured.check_at("a.b.c", 0),
            Err(TokenRejection::SecretMissing)
        );
    }

    #[test]
    fn issue_without_secret_fails() {
        let codec = SessionTokenCodec::new(None);
        assert!(!codec.is_configured());
        assert!(matches!(
            codec.issue(&claims(), None),
            Err(IssueError::Configuration)
        ));
    }

    #[test]
    fn default_ttl_is_seven_days() {
        let codec = test_codec();
        let token = codec.issue(&claims(), None).expect("issue token");
        let payload = codec.verify(&token).expect("live token");
        assert_eq!(payload.expires_at - payload.issued_at, DEFAULT_TTL_SECONDS);
    }
}
