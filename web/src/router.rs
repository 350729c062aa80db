use crate::{
    controller::{auth_controller, health_check_controller, page_controller},
    middleware::session_gate::session_gate,
    AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// Paths and schemas must be listed here to appear in the OpenAPI document
// served at /api-docs/openapi.json.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Descope OIDC Demo"
        ),
        paths(
            auth_controller::start,
            auth_controller::callback,
            auth_controller::store_tokens,
            auth_controller::logout,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                auth_controller::LoginForm,
                auth_controller::StoreTokensResponse,
                health_check_controller::Health,
                domain::session::StoreTokensRequest,
            )
        ),
        tags(
            (name = "descope_oidc_demo", description = "Authorization code login with PKCE against Descope")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    let static_dir = app_state.config.static_dir.clone();
    Router::new()
        .merge(gated_page_routes(app_state.clone()))
        .merge(page_routes())
        .merge(health_routes(app_state.clone()))
        .merge(auth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes(&static_dir))
}

// Pages whose access depends on the session cookie.
fn gated_page_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(page_controller::home))
        .route("/dashboard", get(page_controller::dashboard))
        .route_layer(from_fn_with_state(app_state.clone(), session_gate))
        .with_state(app_state)
}

fn page_routes() -> Router {
    Router::new()
        .route("/login", get(page_controller::login))
        .route("/error-page", get(page_controller::error_page))
}

fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/login/start", post(auth_controller::start))
        .route("/login/retry", get(auth_controller::retry))
        .route("/api/auth/callback", get(auth_controller::callback))
        .route("/api/auth/store-tokens", post(auth_controller::store_tokens))
        .route("/logout", post(auth_controller::logout))
        .with_state(app_state)
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

pub fn static_routes(static_dir: &str) -> Router {
    Router::new().fallback_service(ServeDir::new(static_dir))
}
