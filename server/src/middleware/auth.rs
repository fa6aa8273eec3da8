use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderMap, AUTHORIZATION},
    middleware::Next,
    web, HttpMessage, ResponseError,
};
use session_token::SessionTokenCodec;

use crate::error::ApiError;

/// Extracts the credential from `Authorization: Bearer <token>`.
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Rejects the request with 401 unless it carries a live session token.
/// On success the verified `SessionPayload` is available to handlers as
/// `web::ReqData<SessionPayload>`.
pub async fn bearer_auth_middleware<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
    let payload = {
        let codec = req.app_data::<web::Data<SessionTokenCodec>>();
        if codec.is_none() {
            log::error!("Session token codec not registered as app data");
        }
        match (codec, bearer_token(req.headers())) {
            (Some(codec), Some(token)) => codec.verify(token),
            _ => None,
        }
    };

    let Some(payload) = payload else {
        log::debug!("Unauthenticated request to {}", req.path());
        let response = ApiError::Unauthorized.error_response();
        return Ok(req.into_response(response).map_into_right_body());
    };

    req.extensions_mut().insert(payload);

    next.call(req)
        .await
        .map(ServiceResponse::map_into_left_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers_with("bearer  abc")), Some("abc"));
    }

    #[test]
    fn ignores_other_schemes_and_blanks() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&headers_with("Bearer   ")), None);
    }
}
