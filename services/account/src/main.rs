use anyhow::Context;
use account_service::routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::{FmtSubscriber, layer::SubscriberExt};

use app_auth::{AccountService, CredentialHasher, JwtService};
use app_config::{AppConfig, JwtRuntimeConfig, Server};
use app_database::{DB_ARC, db_connect::initialize_user_db, service::DbService};
use app_error::AppError;
use app_models::user::{USER_TABLE, User};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration first; an invalid or incomplete configuration
    // (empty JWT secret, bad argon2 parameters) must abort startup.
    let config = AppConfig::load()?;

    let _guard = sentry::init((
        config.monitoring.sentry.dsn.clone(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.monitoring.sentry.environment.clone().into()),
            sample_rate: config.monitoring.sentry.sample_rate,
            ..Default::default()
        },
    ));

    // Initialize the logger
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    let subscriber = subscriber.with(sentry_tracing::layer());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Starting account service at {}", chrono::Utc::now());

    // Initialize the database connection
    let db_arc = DB_ARC
        .get_or_init(|| async {
            initialize_user_db().await.unwrap_or_else(|e| {
                error!("Database initialization failed: {}", e);
                panic!("Database initialization failed");
            })
        })
        .await;

    let user_db = Arc::new(DbService::<User>::new(db_arc, USER_TABLE));

    // Secret and hashing cost are read once here and injected; nothing
    // re-reads configuration at request time.
    let jwt_config = JwtRuntimeConfig::from(&config);
    let jwt_service = Arc::new(JwtService::new(&jwt_config.secret, jwt_config.expiry_hours)?);
    let hasher = CredentialHasher::new(&config.security.password.argon2)?;

    let account_service = Arc::new(
        AccountService::new(jwt_service, hasher, config.security.password.clone())
            .with_db(user_db),
    );

    let app = routes::create_routes(account_service, &config);

    let server = Server::from(&config);
    let address = format!("{}:{}", server.address, server.port);
    let listener = TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind to address: {}", address))?;

    info!("Account service listening on http://{}", address);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
