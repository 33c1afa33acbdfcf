use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{middleware::auth::JwtSecret, routes, AppState};

pub fn router(state: AppState) -> Router {
    // Allow the app base URL and, for local development, localhost.
    let base = state.config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(state.config.jwt_secret.clone());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Secret Santa
        .route("/groups/{group_id}/secret-santa/{variant}/shuffle", post(routes::secret_santa::shuffle))
        .route("/groups/{group_id}/secret-santa/archive", post(routes::secret_santa::archive))
        .route(
            "/groups/{group_id}/participants/{participant_id}/secret-santa",
            get(routes::secret_santa::get_assignment).put(routes::secret_santa::set_participation),
        )
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
