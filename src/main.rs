//! Recruitment Identity Development Server
//!
//! Full HTTP server with all endpoints enabled, for local development and
//! deployment behind the portal frontend. The storage engine is selected
//! by `STORAGE_ENGINE` (postgres | mongo) at startup and fixed for the
//! process lifetime.

use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use recruit_identity::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    service::{
        AccountService, IntegrationService, LogMailer, Mailer, ProfileService, SetupService,
        SmtpMailer, TokenService,
    },
    storage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    env_logger::init();

    log::info!(
        "starting recruitment identity service v{}",
        recruit_identity::VERSION
    );

    let config = AppConfig::from_env()?;

    // One adapter per process; constructed here, memoized in the factory
    let adapter = storage::init_storage(&config.storage).await?;
    log::info!("storage adapter connected");

    let tokens = TokenService::new(&config.token);

    let mailer: Arc<dyn Mailer> = match &config.email {
        Some(email_config) => {
            log::info!("SMTP mailer enabled ({})", email_config.smtp_host);
            Arc::new(SmtpMailer::new(email_config)?)
        }
        None => {
            log::warn!("SMTP not configured; OTP emails will be logged, not sent");
            Arc::new(LogMailer)
        }
    };

    let state = AppState {
        accounts: Arc::new(AccountService::new(
            adapter.clone(),
            mailer,
            tokens.clone(),
        )),
        profiles: Arc::new(ProfileService::new(adapter.clone())),
        setup: Arc::new(SetupService::new(adapter.clone())),
        integration: Arc::new(IntegrationService::new(adapter.clone())?),
        tokens: Arc::new(tokens),
        storage: adapter,
    };

    let app = RouterBuilder::with_all_routes().build(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .into_inner(),
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
