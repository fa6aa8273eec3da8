use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use session_token::SessionTokenCodec;

use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub signing_configured: bool,
}

#[get("/health")]
pub async fn health_check(codec: Option<web::Data<SessionTokenCodec>>) -> Result<HttpResponse> {
    let signing_configured = codec.map(|codec| codec.is_configured()).unwrap_or(false);

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        signing_configured,
    };

    Ok(HttpResponse::Ok().json(response))
}
