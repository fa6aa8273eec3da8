pub mod health;
pub mod session;

use actix_web::{middleware::from_fn, web};

use crate::middleware::bearer_auth_middleware;

pub use health::health_check;
pub use session::{current_session, refresh_session};

/// Public routes plus the bearer-protected `/session` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check).service(
        web::scope("/session")
            .wrap(from_fn(bearer_auth_middleware))
            .service(current_session)
            .service(refresh_session),
    );
}
