//! JSON API over the content store, with cache invalidation on file changes

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::new_debouncer;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::store::{ContentStore, SeriesNavigation};
use crate::Folio;

/// Site details served alongside the content
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub author: String,
    pub url: String,
}

impl From<&SiteConfig> for SiteInfo {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
        }
    }
}

/// Server state shared by all handlers
struct ServerState {
    store: Arc<ContentStore>,
    site: SiteInfo,
}

type SharedState = Arc<ServerState>;

/// Filters accepted by the post listing
#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// A post together with its place in a series
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    #[serde(flatten)]
    post: Post,
    series_navigation: Option<SeriesNavigation>,
}

/// Build the API router
pub fn router(store: Arc<ContentStore>, site: SiteInfo) -> Router {
    let state = Arc::new(ServerState { store, site });

    Router::new()
        .route("/api/site", get(site_info))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/categories", get(list_categories))
        .route("/api/tags", get(list_tags))
        .route("/api/series", get(list_series))
        .route("/api/series/:name", get(get_series))
        .route("/api/cache/invalidate", post(invalidate_cache))
        .fallback(|| async { not_found("no such endpoint") })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let store = Arc::new(folio.store()?);
    let loaded = store.load_all().len();
    tracing::info!("Loaded {} published posts from {:?}", loaded, folio.content_dir);

    let app = router(Arc::clone(&store), SiteInfo::from(&folio.config));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("{} running at http://{}:{}/api/posts", folio.config.title, ip, port);
    if watch {
        println!("Watching {:?} for changes...", folio.content_dir);
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let content_dir = folio.content_dir.clone();
        let store = Arc::clone(&store);

        // The watcher blocks on a std channel, so keep it off the runtime workers
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_invalidate(content_dir, store) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the content directory and drop the store cache on every change
fn watch_and_invalidate(content_dir: PathBuf, store: Arc<ContentStore>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if content_dir.exists() {
        debouncer
            .watcher()
            .watch(&content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", content_dir);
    } else {
        tracing::warn!("Content directory {:?} does not exist; not watching", content_dir);
        return Ok(());
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| is_relevant(&e.path));
                if !relevant {
                    continue;
                }

                for event in &events {
                    tracing::info!("File changed: {}", event.path.display());
                }
                store.invalidate_cache();
                let count = store.load_all().len();
                tracing::info!("Reloaded {} published posts", count);
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Ignore editor and VCS noise
fn is_relevant(path: &std::path::Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

async fn site_info(State(state): State<SharedState>) -> Json<SiteInfo> {
    Json(state.site.clone())
}

async fn list_posts(
    State(state): State<SharedState>,
    Query(filter): Query<PostFilter>,
) -> Json<Vec<Post>> {
    let store = &state.store;
    let posts = match (&filter.category, &filter.tag) {
        (Some(category), Some(tag)) => store
            .get_by_category(category)
            .into_iter()
            .filter(|p| p.tags.contains(tag))
            .collect(),
        (Some(category), None) => store.get_by_category(category),
        (None, Some(tag)) => store.get_by_tag(tag),
        (None, None) => store.load_all().to_vec(),
    };
    Json(posts)
}

async fn get_post(State(state): State<SharedState>, Path(slug): Path<String>) -> Response {
    match state.store.get_by_slug(&slug) {
        Some(post) => {
            let series_navigation = state.store.get_series_navigation(&post);
            Json(PostResponse {
                post,
                series_navigation,
            })
            .into_response()
        }
        None => not_found(&format!("no post with slug {}", slug)),
    }
}

async fn list_categories(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.store.list_categories())
}

async fn list_tags(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.store.list_tags())
}

async fn list_series(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.store.list_series_names())
}

async fn get_series(State(state): State<SharedState>, Path(name): Path<String>) -> Response {
    match state.store.get_series_info(&name) {
        Some(info) => Json(info).into_response(),
        None => not_found(&format!("no series named {}", name)),
    }
}

async fn invalidate_cache(State(state): State<SharedState>) -> StatusCode {
    state.store.invalidate_cache();
    StatusCode::NO_CONTENT
}
