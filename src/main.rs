use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubpass::{
    api,
    config::Settings,
    email::{LogMailer, Mailer, SmtpMailer},
    payments::{PaymentGateway, StripeGateway},
    service::ServiceContext,
    storage::LocalObjectStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubpass=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Clubpass server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let payment_gateway: Option<Arc<dyn PaymentGateway>> = if settings.stripe.enabled {
        match settings.stripe.secret_key.clone() {
            Some(api_key) => {
                tracing::info!("Stripe payment processing enabled");
                Some(Arc::new(StripeGateway::new(api_key)))
            }
            None => {
                tracing::warn!("Stripe enabled but missing secret key");
                None
            }
        }
    } else {
        tracing::info!("Stripe payment processing disabled");
        None
    };

    let mailer: Arc<dyn Mailer> = match &settings.email.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            tracing::info!("SMTP not configured, emails will be logged");
            Arc::new(LogMailer)
        }
    };

    let object_store = Arc::new(LocalObjectStore::new(
        &settings.storage.uploads_dir,
        &settings.server.base_url,
    ));
    tracing::info!("Storing uploads in {}", object_store.root().display());

    let service_context = Arc::new(ServiceContext::new(
        db_pool.clone(),
        &settings,
        payment_gateway,
        object_store,
        mailer,
    ));

    match service_context.auth_service.cleanup_expired_sessions().await {
        Ok(n) if n > 0 => tracing::info!("Removed {} expired sessions", n),
        Ok(_) => {}
        Err(e) => tracing::warn!("Session cleanup failed: {}", e),
    }

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
