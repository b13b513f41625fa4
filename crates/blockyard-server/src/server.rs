//! Preview server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::sync::RwLock;

use blockyard_manifest::{Manifest, ManifestError, ManifestStore};
use blockyard_static::{stylesheet_name, stylesheet_url, AssetPipeline, SiteConfig, SiteRenderer};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

const RELOAD_SCRIPT_PATH: &str = "__reload.js";
const RELOAD_SOCKET_PATH: &str = "__reload";

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Manifest document
    pub manifest_path: PathBuf,

    /// Root that block files are read from
    pub blocks_dir: PathBuf,

    /// Site title
    pub title: String,

    /// Base URL of the built site; its path is where pages are mounted
    pub base_url: String,

    /// Extra stylesheets, linked from every page
    pub styles: Vec<String>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("registry.json"),
            blocks_dir: PathBuf::from("."),
            title: "Blocks".to_string(),
            base_url: "/".to_string(),
            styles: vec![],
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

impl DevServerConfig {
    /// Path prefix pages are served under, e.g. `/blocks/`.
    ///
    /// Only the path of an absolute base URL is kept so links stay on the
    /// preview server.
    pub fn mount_path(&self) -> String {
        mount_path(&self.base_url)
    }

    fn site_config(&self) -> SiteConfig {
        let base_url = self.mount_path();

        SiteConfig {
            title: self.title.clone(),
            styles: self
                .styles
                .iter()
                .map(|s| stylesheet_url(&base_url, s))
                .collect(),
            base_url,
            registry_items: true,
            blocks_dir: self.blocks_dir.clone(),
        }
    }
}

/// Path part of `base_url`, with leading and trailing slashes.
pub fn mount_path(base_url: &str) -> String {
    let path = match base_url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => base_url,
    };

    match path.trim_matches('/') {
        "" => "/".to_string(),
        trimmed => format!("/{}/", trimmed),
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Shared server state.
pub struct ServerState {
    store: ManifestStore,
    manifest: Manifest,
    renderer: SiteRenderer,
    styles: Vec<PathBuf>,
    hub: ReloadHub,
}

impl ServerState {
    /// Load the manifest and set up rendering.
    pub fn load(config: &DevServerConfig) -> Result<Self, ManifestError> {
        let store = ManifestStore::new(&config.manifest_path);
        let manifest = store.load()?;

        Ok(Self {
            store,
            manifest,
            renderer: SiteRenderer::new(config.site_config()),
            styles: config.styles.iter().map(PathBuf::from).collect(),
            hub: ReloadHub::new(),
        })
    }

    /// Re-read the manifest, keeping the current snapshot if that fails.
    pub fn reload(&mut self) -> Result<(), ManifestError> {
        self.manifest = self.store.load()?;
        Ok(())
    }

    fn reload_scripts(&self) -> Vec<String> {
        vec![self.renderer.url(RELOAD_SCRIPT_PATH)]
    }
}

type SharedState = Arc<RwLock<ServerState>>;

/// Preview server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new preview server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the preview server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let state = Arc::new(RwLock::new(ServerState::load(&self.config)?));

        let watch_paths = vec![self.config.blocks_dir.clone(), self.config.manifest_path.clone()];
        let (watcher, mut rx) = FileWatcher::new(&watch_paths, &self.config.manifest_path)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let mount = self.config.mount_path();
        let app = router(state, &mount);

        tracing::info!("Starting preview server at http://{}{}", addr, mount);

        if self.config.open {
            let url = format!("http://{}{}", addr, mount);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the router over shared state, with every page under `mount` (`/` or `/prefix/`).
pub fn router(state: SharedState, mount: &str) -> Router {
    let at = |path: &str| format!("{}{}", mount, path);

    let mut app = Router::new().route(mount, get(index_handler));
    if mount != "/" {
        app = app.route(mount.trim_end_matches('/'), get(index_handler));
    }

    app.route(&at("assets/main.css"), get(css_handler))
        .route(&at("assets/main.js"), get(js_handler))
        .route(&at("assets/{file}"), get(stylesheet_handler))
        .route(&at("r/{file}"), get(registry_item_handler))
        .route(&at(RELOAD_SOCKET_PATH), get(ws_handler))
        .route(&at(RELOAD_SCRIPT_PATH), get(reload_script_handler))
        .route(&at("{category}"), get(category_handler))
        .route(&at("{category}/"), get(category_handler))
        .route(&at("{category}/{section}"), get(section_handler))
        .route(&at("{category}/{section}/"), get(section_handler))
        .with_state(state)
}

/// Handle file watch events.
async fn handle_watch_event(state: &SharedState, event: WatchEvent) {
    match event {
        WatchEvent::ManifestChanged(path) => {
            tracing::info!("Manifest changed: {}", path.display());

            let mut state = state.write().await;
            match state.reload() {
                Ok(()) => {
                    tracing::info!("Reloaded {} blocks", state.manifest.blocks.len());
                    state.hub.send(ReloadMessage::Reload);
                }
                Err(e) => {
                    tracing::warn!("Keeping previous manifest: {}", e);
                    state.hub.send(ReloadMessage::Error {
                        message: e.to_string(),
                    });
                }
            }
        }

        WatchEvent::BlockChanged(path) | WatchEvent::Deleted(path) => {
            tracing::debug!("Changed: {}", path.display());
            state.read().await.hub.send(ReloadMessage::Reload);
        }
    }
}

fn html_response(result: Result<String, minijinja::Error>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn index_handler(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    html_response(state.renderer.render_index(&state.manifest, &state.reload_scripts()))
}

async fn category_handler(
    State(state): State<SharedState>,
    Path(category): Path<String>,
) -> Response {
    let state = state.read().await;
    html_response(
        state
            .renderer
            .render_category(&state.manifest, &category, &state.reload_scripts()),
    )
}

async fn section_handler(
    State(state): State<SharedState>,
    Path((category, section)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    html_response(state.renderer.render_section(
        &state.manifest,
        &category,
        &section,
        &state.reload_scripts(),
    ))
}

async fn registry_item_handler(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Response {
    let Some(name) = file.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let state = state.read().await;
    match state.renderer.registry_item(&state.manifest, name) {
        Ok(item) => Json(item).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

async fn css_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        AssetPipeline::css(false),
    )
}

async fn js_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        AssetPipeline::generate_js(),
    )
}

async fn stylesheet_handler(
    State(state): State<SharedState>,
    Path(file): Path<String>,
) -> Response {
    let state = state.read().await;
    let Some(path) = state.styles.iter().find(|p| {
        p.to_str().is_some_and(|s| stylesheet_name(s) == file)
    }) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match std::fs::read_to_string(path) {
        Ok(css) => ([(header::CONTENT_TYPE, "text/css")], css).into_response(),
        Err(e) => {
            tracing::warn!("Stylesheet {} unreadable: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn reload_script_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let socket = state.read().await.renderer.url(RELOAD_SOCKET_PATH);
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(&socket),
    )
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward reload messages to one browser.
async fn handle_ws(mut socket: WebSocket, state: SharedState) {
    let mut rx = state.read().await.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::fs;
    use tempfile::tempdir;
    use tower::ServiceExt;

    const MANIFEST: &str = r#"{
  "modules": [{ "name": "main", "label": "Main" }],
  "blocks": [
    { "name": "a", "moduleName": "Main", "sectionName": "Hero", "templateName": "HeroA", "files": ["a.tsx"] },
    { "name": "b", "moduleName": "main", "sectionName": "hero", "templateName": "HeroB" }
  ]
}"#;

    fn config_in(dir: &std::path::Path) -> DevServerConfig {
        fs::write(dir.join("registry.json"), MANIFEST).unwrap();
        fs::write(dir.join("a.tsx"), "export const HeroA = () => null;").unwrap();

        DevServerConfig {
            manifest_path: dir.join("registry.json"),
            blocks_dir: dir.to_path_buf(),
            open: false,
            ..Default::default()
        }
    }

    fn state_in(dir: &std::path::Path) -> SharedState {
        Arc::new(RwLock::new(ServerState::load(&config_in(dir)).unwrap()))
    }

    async fn fetch(router: &Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 7777);
    }

    #[test]
    fn mount_path_from_base_url() {
        let mount = |base: &str| {
            DevServerConfig {
                base_url: base.to_string(),
                ..Default::default()
            }
            .mount_path()
        };

        assert_eq!(mount("/"), "/");
        assert_eq!(mount(""), "/");
        assert_eq!(mount("/blocks"), "/blocks/");
        assert_eq!(mount("https://example.com/ui/blocks/"), "/ui/blocks/");
        assert_eq!(mount("https://example.com"), "/");
    }

    #[tokio::test]
    async fn serves_configured_stylesheets_under_base_path() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("tokens.css"), ":root { --brand: red; }").unwrap();
        let config = DevServerConfig {
            base_url: "/blocks/".to_string(),
            styles: vec![temp.path().join("tokens.css").display().to_string()],
            ..config_in(temp.path())
        };
        let state = Arc::new(RwLock::new(ServerState::load(&config).unwrap()));
        let app = router(state, &config.mount_path());

        let (status, body) = fetch(&app, "/blocks/main/hero/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("tokens.css"));
        assert!(body.contains("__reload.js"));

        let (status, css) = fetch(&app, "/blocks/assets/tokens.css").await;
        assert_eq!(status, StatusCode::OK);
        assert!(css.contains("--brand"));

        let (status, _) = fetch(&app, "/blocks/assets/other.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = fetch(&app, "/blocks").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_section_page() {
        let temp = tempdir().unwrap();
        let app = router(state_in(temp.path()), "/");

        let (status, body) = fetch(&app, "/main/hero/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("HeroA"));
        assert!(body.contains("HeroB"));
        assert!(body.contains("__reload.js"));
    }

    #[tokio::test]
    async fn unknown_category_renders_fallback() {
        let temp = tempdir().unwrap();
        let app = router(state_in(temp.path()), "/");

        let (status, body) = fetch(&app, "/pricing").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>pricing</h1>"));
    }

    #[tokio::test]
    async fn serves_registry_items() {
        let temp = tempdir().unwrap();
        let app = router(state_in(temp.path()), "/");

        let (status, body) = fetch(&app, "/r/a.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("export const HeroA"));

        let (status, _) = fetch(&app, "/r/ghost.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_reload_keeps_snapshot() {
        let temp = tempdir().unwrap();
        let state = state_in(temp.path());
        let mut rx = state.read().await.hub.subscribe();

        fs::write(temp.path().join("registry.json"), "{ not json").unwrap();
        handle_watch_event(
            &state,
            WatchEvent::ManifestChanged(temp.path().join("registry.json")),
        )
        .await;

        assert_eq!(state.read().await.manifest.blocks.len(), 2);
        assert!(matches!(rx.try_recv(), Ok(ReloadMessage::Error { .. })));
    }

    #[tokio::test]
    async fn reload_picks_up_new_blocks() {
        let temp = tempdir().unwrap();
        let state = state_in(temp.path());

        fs::write(
            temp.path().join("registry.json"),
            r#"{ "blocks": [{ "name": "z", "moduleName": "faq", "sectionName": "Accordion" }] }"#,
        )
        .unwrap();
        handle_watch_event(
            &state,
            WatchEvent::ManifestChanged(temp.path().join("registry.json")),
        )
        .await;

        let app = router(state, "/");
        let (_, body) = fetch(&app, "/faq/accordion/").await;
        assert!(body.contains("Accordion"));
    }
}
