use actix_web::{get, post, web, HttpResponse};
use chrono::DateTime;
use serde::Serialize;
use session_token::{now_secs, SessionPayload, SessionTokenCodec};

use crate::{config::ServerConfig, error::Result};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: SessionPayload,
    pub issued_at: Option<String>,
    pub expires_at: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: i64,
}

fn rfc3339(unix_secs: i64) -> Option<String> {
    DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.to_rfc3339())
}

#[get("")]
pub async fn current_session(session: web::ReqData<SessionPayload>) -> Result<HttpResponse> {
    let session = session.into_inner();

    let response = SessionResponse {
        success: true,
        issued_at: rfc3339(session.issued_at),
        expires_at: rfc3339(session.expires_at),
        expires_in: session.expires_in(now_secs()),
        session,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Trades a live token for a fresh one carrying the same identity claims.
#[post("/refresh")]
pub async fn refresh_session(
    session: web::ReqData<SessionPayload>,
    codec: web::Data<SessionTokenCodec>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse> {
    let session = session.into_inner();
    let ttl_seconds = config.session.ttl_seconds;
    let now = now_secs();

    let token = codec.issue_at(&session.claims(), ttl_seconds, now)?;

    log::info!("Refreshed session token for user: {}", session.user_id);

    let response = RefreshResponse {
        success: true,
        token,
        expires_at: now.saturating_add(ttl_seconds),
    };

    Ok(HttpResponse::Ok().json(response))
}
