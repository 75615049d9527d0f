use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use adapter::{database::connect_database_with, redis::RedisClient};
use anyhow::{Context, Result};
use api::route::v1;
use axum::Router;
use chrono::{NaiveDate, Utc};
use registry::AppRegistry;
use shared::config::AppConfig;
use shared::env::{which, Environment};
use shared::error::AppResult;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    bootstrap().await
}

fn init_logger() -> Result<()> {
    let log_level = match which() {
        Environment::Development => "debug",
        Environment::Production => "info",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

async fn bootstrap() -> Result<()> {
    let app_config = AppConfig::new()?;
    let pool = connect_database_with(&app_config.database);
    let kv = Arc::new(RedisClient::new(&app_config.redis)?);

    let registry = AppRegistry::new(pool, kv, app_config);

    tokio::spawn(due_reservations_loop(registry.clone()));

    let app = Router::new()
        .merge(v1::routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(registry);

    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 8080);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| {
            tracing::error!(
                error.cause_chain = ?e, error.message = %e, "Unexpected error"
            )
        })
}

/// Tells visitors and hosts about reservations starting today, once per
/// calendar day.
async fn due_reservations_loop(registry: AppRegistry) {
    let mut ticker = tokio::time::interval(Duration::from_secs(60 * 60));
    let mut last_notified: Option<NaiveDate> = None;

    loop {
        ticker.tick().await;

        let today = Utc::now().date_naive();
        if last_notified == Some(today) {
            continue;
        }

        match notify_due_reservations(&registry, today).await {
            Ok(count) => {
                last_notified = Some(today);
                if count > 0 {
                    tracing::info!(count, %today, "sent reservation start notifications");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to send reservation start notifications");
            }
        }
    }
}

async fn notify_due_reservations(registry: &AppRegistry, today: NaiveDate) -> AppResult<usize> {
    let reservations = registry
        .reservation_repository()
        .find_starting_on(today)
        .await?;
    let notifier = registry.notifier();
    let users = registry.user_repository();

    let mut sent = 0;
    for reservation in &reservations {
        if let Some(visitor) = users.find_by_id(reservation.reserved_by).await? {
            match notifier.reservation_starting(&visitor, reservation).await {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(
                    error = %e,
                    reservation_id = %reservation.id,
                    "failed to deliver the start-of-stay notice"
                ),
            }
        }
        if let Some(host) = users.find_by_id(reservation.office.owned_by).await? {
            match notifier.host_reservation_starting(&host, reservation).await {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(
                    error = %e,
                    reservation_id = %reservation.id,
                    "failed to deliver the host start-of-stay notice"
                ),
            }
        }
    }

    Ok(sent)
}
