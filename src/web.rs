use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::RouteGateConfig;
use crate::diagnostics::DiagnosticsProbe;
use crate::routing::RoutesRelay;
use crate::{api, http_client};

/// Placeholder in `index.html` replaced with the Maps API key
const API_KEY_PLACEHOLDER: &str = "{{ api_key }}";

/// Immutable per-process state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RoutesRelay>,
    pub probe: Arc<DiagnosticsProbe>,
    pub pages: Arc<Pages>,
}

impl AppState {
    pub fn new(config: &RouteGateConfig) -> crate::Result<Self> {
        let client = http_client::upstream_client()?;
        Ok(Self {
            relay: Arc::new(RoutesRelay::new(&config.maps, client.clone())),
            probe: Arc::new(DiagnosticsProbe::new(&config.maps, client)?),
            pages: Arc::new(Pages {
                static_dir: config.server.static_dir.clone(),
                api_key: config.maps.api_key.clone(),
            }),
        })
    }
}

/// Browser pages served next to the API
pub struct Pages {
    static_dir: PathBuf,
    api_key: String,
}

impl Pages {
    fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }

    fn debug_path(&self) -> PathBuf {
        self.static_dir.join("debug.html")
    }

    fn render_index(&self, template: &str) -> String {
        template.replace(API_KEY_PLACEHOLDER, &self.api_key)
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route_service("/debug", ServeFile::new(state.pages.debug_path()))
        .nest("/api", api::router())
        .fallback_service(ServeDir::new(&state.pages.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let template = tokio::fs::read_to_string(state.pages.index_path())
        .await
        .map_err(|err| {
            tracing::error!("Failed to read index page: {}", err);
            StatusCode::NOT_FOUND
        })?;
    Ok(Html(state.pages.render_index(&template)))
}

pub async fn run(config: RouteGateConfig) -> Result<()> {
    let state = AppState::new(&config).context("Failed to initialise application state")?;
    let app = app(state);
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    match &config.server.tls {
        Some(tls) => serve_tls(app, addr, &tls.cert_path, &tls.key_path).await,
        None => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            tracing::info!("Web server running at http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Web server failed")
        }
    }
}

#[cfg(feature = "tls")]
async fn serve_tls(
    app: Router,
    addr: SocketAddr,
    cert_path: &std::path::Path,
    key_path: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .with_context(|| {
            format!(
                "Failed to load TLS certificate {} / key {}",
                cert_path.display(),
                key_path.display()
            )
        })?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
    });

    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, rustls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(
    _app: Router,
    _addr: SocketAddr,
    _cert_path: &std::path::Path,
    _key_path: &std::path::Path,
) -> Result<()> {
    anyhow::bail!("server.tls is configured but routegate was built without the `tls` feature")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
