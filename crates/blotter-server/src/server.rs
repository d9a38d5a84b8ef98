//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, set_header::SetResponseHeader};

use blotter_md::{PostIndex, PostSummary};
use blotter_static::assets::AssetPipeline;
use blotter_static::{Context, TemplateEngine};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{
    reload_client_script, ReloadHub, ReloadMessage, RELOAD_PATH, RELOAD_SCRIPT_PATH,
};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Directory holding the post index and markdown files
    pub posts_dir: PathBuf,

    /// Post index file name, inside `posts_dir`
    pub index_file: String,

    /// Site title
    pub title: String,

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
            posts_dir: PathBuf::from("posts"),
            index_file: "postList.txt".to_string(),
            title: "Blog".to_string(),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}: {1}")]
    AddressError(String, String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    config: DevServerConfig,
    reload: ReloadHub,
    templates: TemplateEngine,
}

type SharedState = Arc<RwLock<ServerState>>;

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let host_port = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = host_port
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ServerError::AddressError(host_port.clone(), e.to_string())
            })?;

        let state = Arc::new(RwLock::new(ServerState {
            config: self.config.clone(),
            reload: ReloadHub::new(),
            templates: TemplateEngine::new(),
        }));

        let (watcher, mut rx) =
            FileWatcher::new(&[self.config.posts_dir.clone()], &self.config.index_file)
                .map_err(|e| ServerError::WatchError(e.to_string()))?;

        // Spawn file watch handler
        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state, &self.config.posts_dir);

        tracing::info!("Starting dev server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
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

/// Build the application router.
fn router(state: SharedState, posts_dir: &std::path::Path) -> Router {
    // Raw posts are always re-fetched so edits show up immediately
    let raw_posts = SetResponseHeader::overriding(
        ServeDir::new(posts_dir),
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache"),
    );

    Router::new()
        .route("/", get(list_handler))
        .route("/post/{id}", get(post_handler))
        .route("/post/{id}/", get(post_handler))
        .route("/assets/main.css", get(css_handler))
        .route("/assets/main.js", get(js_handler))
        .route(RELOAD_PATH, get(ws_handler))
        .route(RELOAD_SCRIPT_PATH, get(reload_script_handler))
        .nest_service("/posts", raw_posts)
        .with_state(state)
}

/// Handle file watch events.
async fn handle_watch_event(state: &SharedState, event: WatchEvent) {
    let state = state.read().await;

    let path = event.path().display();
    match &event {
        WatchEvent::IndexModified(_) => tracing::info!("Post index modified: {}", path),
        WatchEvent::PostModified(_) => tracing::info!("Post modified: {}", path),
        _ => tracing::debug!("Posts directory changed: {}", path),
    }

    state.reload.send(ReloadMessage::Reload);
}

fn site_context(config: &DevServerConfig) -> Context {
    Context {
        site_title: config.title.clone(),
        base_url: "/".to_string(),
        reload_script: Some(RELOAD_SCRIPT_PATH.to_string()),
        ..Default::default()
    }
}

fn load_index(config: &DevServerConfig) -> Result<PostIndex, String> {
    PostIndex::load(&config.posts_dir.join(&config.index_file)).map_err(|e| e.to_string())
}

/// Read one post's markdown, logging why it is unavailable.
fn read_post(config: &DevServerConfig, index: &PostIndex, id: usize) -> Option<String> {
    let entry = index.get(id)?;

    let path = match entry.resolve(&config.posts_dir) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Post {} ({}): {}", id, entry.title, e);
            return None;
        }
    };

    match std::fs::read_to_string(&path) {
        Ok(markdown) => Some(markdown),
        Err(e) => {
            tracing::warn!("Post {} ({}): {}: {}", id, entry.title, path.display(), e);
            None
        }
    }
}

fn error_page(status: StatusCode, message: String) -> Response {
    tracing::warn!("{}", message);
    (status, Html(format!("<h1>{}</h1><p>{}</p>", status, message))).into_response()
}

/// Read the index and posts on the blocking pool, outside the state lock.
async fn with_posts<T, F>(config: DevServerConfig, f: F) -> Result<T, String>
where
    F: FnOnce(&DevServerConfig, &PostIndex) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let index = load_index(&config)?;
        Ok(f(&config, &index))
    })
    .await
    .map_err(|e| e.to_string())?
}

/// Handler for the list view.
async fn list_handler(State(state): State<SharedState>) -> Response {
    let config = state.read().await.config.clone();
    let site = site_context(&config);

    let summaries = with_posts(config, |config, index| {
        index
            .iter()
            .filter_map(|(id, _)| {
                let markdown = read_post(config, index, id)?;
                index.summary(id, &markdown)
            })
            .collect::<Vec<PostSummary>>()
    })
    .await;

    let summaries = match summaries {
        Ok(summaries) => summaries,
        Err(e) => return error_page(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    match state.read().await.templates.render_list(&site, summaries) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Handler for the detail view.
async fn post_handler(State(state): State<SharedState>, Path(id): Path<usize>) -> Response {
    let config = state.read().await.config.clone();
    let site = site_context(&config);

    let detail = with_posts(config, move |config, index| {
        read_post(config, index, id).and_then(|markdown| index.detail(id, &markdown))
    })
    .await;

    let detail = match detail {
        Ok(detail) => detail,
        Err(e) => return error_page(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let state = state.read().await;
    let (status, rendered) = match detail {
        Some(detail) => (StatusCode::OK, state.templates.render_post(&site, detail)),
        None => (StatusCode::NOT_FOUND, state.templates.render_not_found(&site)),
    };

    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => error_page(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn css_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], AssetPipeline::generate_css())
}

async fn js_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        AssetPipeline::generate_js(),
    )
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: SharedState) {
    let mut rx = {
        let state = state.read().await;
        state.reload.subscribe()
    };

    if send_message(&mut socket, &ReloadMessage::Connected)
        .await
        .is_err()
    {
        return;
    }

    // Forward reload messages to the client
    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

/// Handler for the live reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn state_for(posts_dir: PathBuf) -> SharedState {
        Arc::new(RwLock::new(ServerState {
            config: DevServerConfig {
                posts_dir,
                open: false,
                ..Default::default()
            },
            reload: ReloadHub::new(),
            templates: TemplateEngine::new(),
        }))
    }

    fn write_posts(root: &std::path::Path) -> PathBuf {
        let posts = root.join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("postList.txt"),
            r#"[{ "title": "Only", "date": "Today", "link": "only.md" }]"#,
        )
        .unwrap();
        fs::write(posts.join("only.md"), "## Sub\nline a\nline b").unwrap();
        posts
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 7777);
        assert_eq!(server.config.index_file, "postList.txt");
    }

    #[tokio::test]
    async fn renders_list_view() {
        let temp = tempdir().unwrap();
        let state = state_for(write_posts(temp.path()));

        let response = list_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("<p>Sub</p><p>line a</p><p>line b</p>"));
        assert!(html.contains("__reload.js"));
    }

    #[tokio::test]
    async fn renders_detail_view() {
        let temp = tempdir().unwrap();
        let state = state_for(write_posts(temp.path()));

        let response = post_handler(State(state), Path(0)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("<h2>Sub</h2>"));
        assert!(html.contains("<p>line a<br/>line b</p>"));
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let temp = tempdir().unwrap();
        let state = state_for(write_posts(temp.path()));

        let response = post_handler(State(state), Path(9)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_index_is_an_error_page() {
        let temp = tempdir().unwrap();
        let state = state_for(temp.path().join("posts"));

        let response = list_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn posts_load_off_the_runtime() {
        let temp = tempdir().unwrap();
        let config = DevServerConfig {
            posts_dir: write_posts(temp.path()),
            ..Default::default()
        };

        let titles = with_posts(config.clone(), |_, index| {
            index.iter().map(|(_, e)| e.title.clone()).collect::<Vec<_>>()
        })
        .await
        .unwrap();
        assert_eq!(titles, vec!["Only".to_string()]);

        let missing = DevServerConfig {
            posts_dir: temp.path().join("nope"),
            ..config
        };
        assert!(with_posts(missing, |_, index| index.len()).await.is_err());
    }

    #[tokio::test]
    async fn watch_events_trigger_reload() {
        let temp = tempdir().unwrap();
        let state = state_for(temp.path().to_path_buf());
        let mut rx = state.read().await.reload.subscribe();

        handle_watch_event(&state, WatchEvent::PostModified(PathBuf::from("a.md"))).await;

        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
    }
}
