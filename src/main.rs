mod analytics;
mod config;
mod db;
mod domain;
mod middleware;
mod services;
mod state;
#[cfg(test)]
mod testing;
mod web;

use crate::config::AppConfig;
use crate::db::SupabaseStore;
use crate::services::backend::HttpBackend;
use crate::services::demo_corpus::DemoCorpus;
use crate::services::jobs::JobBoard;
use crate::state::SharedState;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    tracing::info!("Analysis backend at {}", config.api_base_url);
    let backend = Arc::new(HttpBackend::new(&config.api_base_url, config.http_timeout)?);
    let store = Arc::new(SupabaseStore::new(
        &config.supabase_url,
        &config.supabase_key,
        config.http_timeout,
    )?);
    let demo = DemoCorpus::generate(config.demo_corpus_size, config.demo_seed)?;

    let cors = cors_layer(&config.cors_origins);
    let bind_addr = config.bind_addr.clone();

    let shared: SharedState = Arc::new(state::AppState {
        config: Arc::new(config),
        backend,
        store,
        demo,
        jobs: JobBoard::new(),
        limiters: middleware::Limiters::new(),
    });

    let scheduler = JobScheduler::new().await?;

    // Housekeeping - drop finished jobs and stale rate limit windows every hour
    let shared_for_cleanup = shared.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let state = shared_for_cleanup.clone();
            Box::pin(async move {
                let pruned = state.jobs.prune_finished(chrono::Duration::hours(1)).await;
                if pruned > 0 {
                    tracing::info!("Pruned {} finished analysis jobs", pruned);
                }
                state.limiters.cleanup().await;
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Scheduler started: hourly job and rate limit cleanup");

    let app = Router::new()
        .merge(web::routes(shared.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on {bind_addr}");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
