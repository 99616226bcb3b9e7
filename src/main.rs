//! Admin Live server binary.
//!
//! Wires the cache store, channel rooms, event bus and adaptive scheduler
//! together and serves the admin socket plus the live HTTP routes.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use admin_live::adapters::cache::{InMemoryCacheStore, RedisCacheStore};
use admin_live::adapters::events::InMemoryEventBus;
use admin_live::adapters::http::{live_routes, LiveAppState};
use admin_live::adapters::load::ChannelMemberLoad;
use admin_live::adapters::standalone::{DetachedProfileLoader, SessionSnapshotAggregator};
use admin_live::adapters::websocket::{websocket_router, RoomManager, WebSocketState};
use admin_live::application::{
    register_core_subscribers, AdaptiveScheduler, BroadcastRouter, ProfileCacheConfig,
    ProfileCacheManager,
};
use admin_live::config::{AppConfig, CacheBackend, LogFormat, ServerConfig};
use admin_live::ports::CacheStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    let cache_store = build_cache_store(&config).await?;
    let rooms = Arc::new(RoomManager::new(config.broadcast.outbox_capacity));

    let profiles = Arc::new(ProfileCacheManager::with_config(
        Arc::clone(&cache_store),
        Arc::new(DetachedProfileLoader),
        ProfileCacheConfig::default()
            .with_profile_ttl(config.cache.profile_ttl())
            .with_call_timeout(config.cache.call_timeout()),
    ));
    let router = Arc::new(BroadcastRouter::new(rooms.clone(), Arc::clone(&profiles)));

    let bus = Arc::new(InMemoryEventBus::new());
    register_core_subscribers(bus.as_ref(), Arc::clone(&profiles), Arc::clone(&router));

    let scheduler = Arc::new(AdaptiveScheduler::new(
        Arc::new(SessionSnapshotAggregator::new(rooms.clone())),
        Arc::clone(&router),
        Arc::new(ChannelMemberLoad::dashboard(rooms.clone())),
        config.cache.call_timeout(),
    ));
    if config.scheduler.enabled {
        scheduler.start(config.scheduler.settings()).await?;
    } else {
        tracing::info!("Dashboard schedule disabled by configuration");
    }

    let app = Router::new()
        .merge(websocket_router().with_state(WebSocketState::new(rooms.clone())))
        .merge(live_routes(LiveAppState {
            scheduler: Arc::clone(&scheduler),
            cache_store,
            profiles,
            events: bus,
        }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.server))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                ))),
        );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        cache_backend = ?config.cache.backend,
        "Admin live server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    tracing::info!("Admin live server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match server.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn build_cache_store(config: &AppConfig) -> Result<Arc<dyn CacheStore>, Box<dyn Error>> {
    match config.cache.backend {
        CacheBackend::Memory => Ok(Arc::new(InMemoryCacheStore::new())),
        CacheBackend::Redis => {
            let store = tokio::time::timeout(
                config.redis.timeout(),
                RedisCacheStore::connect(&config.redis.url),
            )
            .await
            .map_err(|_| format!("Timed out connecting to Redis at {}", config.redis.url))??;
            tracing::info!("Connected to Redis cache store");
            Ok(Arc::new(store))
        }
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
