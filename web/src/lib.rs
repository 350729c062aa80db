use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::{header, HeaderValue, Method};
use axum_extra::extract::cookie::Key;
use domain::error::{config_error, Error as DomainError};
use domain::DescopeProvider;
use log::*;
use service::config::Config;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod extractors;
mod middleware;
mod router;
mod templates;

pub use error::{Error, Result};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub provider: Arc<DescopeProvider>,
    cookie_key: Key,
}

impl AppState {
    /// Build the state for `config`: the Descope provider and the key that
    /// signs transient cookies.
    pub fn new(config: Config) -> core::result::Result<Self, DomainError> {
        let provider = domain::login::provider_from_config(&config)?;

        let cookie_key = match config.cookie_secret() {
            Some(secret) => Key::try_from(secret.as_bytes()).map_err(|e| {
                error!("Cookie secret is unusable: {e}");
                config_error("Cookie secret must be at least 64 bytes")
            })?,
            None if config.is_production() => {
                return Err(config_error("A cookie secret is required in production"));
            }
            None => {
                warn!("No cookie secret configured, in-flight logins will not survive a restart");
                Key::generate()
            }
        };

        Ok(Self {
            config,
            provider: Arc::new(provider),
            cookie_key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;
    let server_url = format!("{host}:{port}");
    let listen_addr = SocketAddr::from_str(&server_url).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid listen address {server_url}: {e}"),
        )
    })?;

    info!(
        "Server starting... listening for connections on http://{host}:{port} ({} exchange mode)",
        app_state.config.exchange_mode
    );

    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| warn!("Ignoring invalid CORS origin: {origin}"))
                .ok()
        })
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS, Method::POST])
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .allow_origin(allowed_origins);

    let listener = TcpListener::bind(listen_addr).await?;
    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}
