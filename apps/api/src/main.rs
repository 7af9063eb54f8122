use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use booking_cell::services::ledger::BookingLedger;
use booking_cell::services::slots::SlotCalculator;
use booking_cell::BookingState;
use catalog_cell::client::HttpCatalog;
use catalog_cell::provider::CatalogProvider;
use review_cell::services::gate::ReviewGate;
use review_cell::services::queries::ClinicQueries;
use review_cell::ReviewState;
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Medibook API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Wire the booking core against the clinic directory
    let catalog: Arc<dyn CatalogProvider> = Arc::new(HttpCatalog::new(&config));
    let ledger = Arc::new(BookingLedger::new(catalog.clone(), config.upstream_timeout()));
    let slots = Arc::new(SlotCalculator::new(
        catalog.clone(),
        ledger.clone(),
        config.upstream_timeout(),
    ));
    let gate = Arc::new(ReviewGate::new(ledger.clone()));
    let queries = Arc::new(ClinicQueries::new(
        catalog.clone(),
        gate.clone(),
        config.upstream_timeout(),
    ));

    let booking_state = Arc::new(BookingState {
        config: config.clone(),
        ledger,
        slots,
    });
    let review_state = Arc::new(ReviewState {
        config: config.clone(),
        gate,
        queries,
    });

    // Build the application router
    let app = router::create_router(booking_state, review_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
