use clap::Parser;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use variantq::{
    Config, QueryCompiler,
    handlers::{AppState, create_router},
    resolver::SoTermResolver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let studies = config.study_resolver();
    let compiler = QueryCompiler::new(Arc::new(studies), Arc::new(SoTermResolver::default()))
        .with_row_limits(config.row_limits());

    let state = AppState {
        compiler: Arc::new(compiler),
        identity: Arc::new(config.service_identity()),
    };

    let app = create_router(state);
    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = config.bind_address();
    tracing::info!("Starting variantq server on {}", addr);
    tracing::info!(
        studies = config.studies.len(),
        default_limit = config.default_limit,
        max_limit = config.max_limit,
        "Query compiler ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
