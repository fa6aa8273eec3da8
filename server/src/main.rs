use actix_web::{middleware as actix_middleware, web, App, HttpServer};

use marketplace_server::config::{self, ServerConfig};
use marketplace_server::handlers;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from server/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting marketplace RPC server...");

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "server/config/server.toml".to_string());

    let mut server_config = ServerConfig::load_from_file(&config_path).unwrap_or_else(|e| {
        log::warn!(
            "Failed to load server configuration from '{}': {}. Falling back to defaults.",
            config_path,
            e
        );
        ServerConfig::default()
    });
    server_config.apply_env_overrides()?;

    log::info!(
        "Session tokens issued with a ttl of {} seconds",
        server_config.session.ttl_seconds
    );

    let codec = web::Data::new(config::codec_from_env());
    let server_config = web::Data::new(server_config);

    let bind_addr = (
        server_config.http.host.clone(),
        server_config.http.port,
    );
    log::info!("Starting HTTP server at {}:{}...", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(codec.clone())
            .app_data(server_config.clone())
            .wrap(actix_middleware::Logger::default())
            .wrap(actix_middleware::Compress::default())
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
