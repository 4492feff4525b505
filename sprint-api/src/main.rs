use sprint_api::{app, state::{AppState, AuthConfig}};
use sprint_store::{
    DbClient, PgBookingRepository, PgIntakeRepository, PgOtpRepository, PgSlotRepository,
    RedisClient,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sprint_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = sprint_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Sprint booking API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let redis = RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    let bookings = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let gateway = Arc::new(sprint_gateway::RazorpayClient::new(
        config.razorpay.key_id.clone(),
        config.razorpay.key_secret.clone(),
        config.razorpay.base_url.clone(),
    ));
    let mailer = Arc::new(sprint_gateway::SmtpOtpMailer::new(
        config.smtp.server.clone(),
        config.smtp.port,
        config.smtp.username.clone(),
        config.smtp.password.clone(),
        config.smtp.from_email.clone(),
        config.smtp.from_name.clone(),
    ));

    let app_state = AppState {
        slots: Arc::new(PgSlotRepository::new(db.pool.clone())),
        bookings: bookings.clone(),
        otps: Arc::new(PgOtpRepository::new(db.pool.clone())),
        intakes: Arc::new(PgIntakeRepository::new(db.pool.clone())),
        gateway,
        mailer,
        redis: Arc::new(redis),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    tokio::spawn(sprint_api::worker::start_lock_expiry_worker(
        bookings,
        config.business_rules.sweep_interval_seconds,
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
