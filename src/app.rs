use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::AppConfig;
use crate::database::memory::MemoryStore;
use crate::database::store::Store;
use crate::handlers::{self, jobs::JobsController, resources, time_periods::TimePeriodsController, ResourcesController};

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// State over a fresh in-memory store.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }
}

/// Router for the whole API.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/", get(handlers::home::root))
        .route("/health", get(handlers::home::health))
        .merge(resource_routes::<JobsController>())
        .merge(resource_routes::<TimePeriodsController>())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// index/new/create/show/edit/update/destroy under the resource's path.
fn resource_routes<C: ResourcesController>() -> Router<AppState> {
    let index = C::resource().index_path();

    Router::new()
        .route(&index, get(resources::index::<C>).post(resources::create::<C>))
        .route(&format!("{}/new", index), get(resources::new::<C>))
        .route(
            &format!("{}/:id", index),
            get(resources::show::<C>)
                .put(resources::update::<C>)
                .patch(resources::update::<C>)
                .delete(resources::destroy::<C>),
        )
        .route(&format!("{}/:id/edit", index), get(resources::edit::<C>))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}
