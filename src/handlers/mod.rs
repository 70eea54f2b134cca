mod query;
mod service_info;

pub use query::post_variant_query;
pub use service_info::service_info;

use crate::compiler::QueryCompiler;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub compiler: Arc<QueryCompiler>,
    pub identity: Arc<ServiceIdentity>,
}

impl AppState {
    pub fn new(compiler: QueryCompiler) -> Self {
        Self {
            compiler: Arc::new(compiler),
            identity: Arc::new(ServiceIdentity::default()),
        }
    }
}

/// How the deployment names itself in service-info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    /// Reverse-domain service id.
    pub id: String,
    pub organization: String,
    pub organization_url: Option<String>,
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self {
            id: env!("CARGO_PKG_NAME").to_string(),
            organization: env!("CARGO_PKG_NAME").to_string(),
            organization_url: None,
        }
    }
}

/// Routes of the compile service. CORS is left to the caller.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/variants/query", post(post_variant_query))
        .route("/", get(service_info))
        .route("/service-info", get(service_info))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
