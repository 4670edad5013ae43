//! Router assembly and shared state.

use crate::api::{ApiError, ApiResponse};
use crate::handlers::{config, interactions, users};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use contact_journal_core::{
    ConfigService, FeedbackDispatcher, FeedbackGenerator, FeedbackModel, JournalStore,
    OpenRouterBridge, Settings, UserDirectory,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub configs: Arc<ConfigService>,
    pub journal: Arc<JournalStore>,
    pub users: Arc<UserDirectory>,
    pub feedback: FeedbackDispatcher,
}

impl AppState {
    /// Wire the services from settings and start the feedback worker.
    /// Must be called inside a Tokio runtime.
    pub fn from_settings(settings: &Settings) -> (Arc<Self>, JoinHandle<()>) {
        let configs = Arc::new(ConfigService::from_settings(settings));
        let journal = Arc::new(JournalStore::new(&settings.data_dir));
        let users = Arc::new(UserDirectory::new(&settings.data_dir));

        let model = OpenRouterBridge::from_settings(settings)
            .map(|bridge| Arc::new(bridge) as Arc<dyn FeedbackModel>);
        if model.is_none() {
            tracing::warn!("OPENROUTER_API_KEY not set, AI feedback is disabled");
        }
        let generator = Arc::new(FeedbackGenerator::new(
            Arc::clone(&journal),
            Arc::clone(&configs),
            model,
            &settings.prompts_dir,
            settings.feedback_history_limit,
        ));
        let (feedback, worker) = FeedbackDispatcher::start(generator, settings.feedback_queue_capacity);

        let state = Arc::new(Self {
            configs,
            journal,
            users,
            feedback,
        });
        (state, worker)
    }
}

pub fn build_app(state: Arc<AppState>, cors_origin: &str) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/config", get(config::list_configs))
        .route("/config/cache/clear", post(config::clear_cache))
        .route("/config/health/check", get(config::health_check))
        .route("/config/:app_id", get(config::get_config))
        .route("/users", get(users::list_users))
        .route("/users/:user_key", get(users::get_user))
        .route("/interactions/:user_key", post(interactions::create_interaction))
        .route("/interactions/:user_key/all", get(interactions::all_records))
        .route("/interactions/:user_key/recent", get(interactions::recent))
        .route("/interactions/:user_key/since/:date", get(interactions::since));

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_request))
        .layer(cors_layer(cors_origin))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            tracing::warn!(origin, "invalid CORS origin, cross-origin requests disabled: {}", e);
            layer
        }
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    tracing::info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn health() -> Json<ApiResponse<()>> {
    ApiResponse::stamped("Contact Journal API is running")
}

async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
