//! Admin server - JSON API for the local editor plus the computed public views

mod api;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use api::ApiError;

use crate::assets::RewardImage;
use crate::content::{MarkdownRenderer, PostRepository};
use crate::publish::GitPublisher;
use crate::storage::FsStorage;
use crate::views;
use crate::Blog;

/// Largest accepted request body (uploads included)
pub const BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Shared state of the admin server
pub struct AdminState {
    pub blog: Blog,
    pub repository: PostRepository<FsStorage>,
    pub renderer: MarkdownRenderer,
    pub publisher: GitPublisher,
    pub reward_image: RewardImage<FsStorage>,
}

impl AdminState {
    pub fn new(blog: Blog) -> Self {
        Self {
            repository: blog.repository(),
            renderer: MarkdownRenderer::new(),
            publisher: blog.publisher(),
            reward_image: blog.reward_image(),
            blog,
        }
    }
}

/// Build the admin router
pub fn router(state: Arc<AdminState>) -> Router {
    let admin = ServeDir::new(&state.blog.admin_dir).append_index_html_on_directories(true);
    let public = ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);

    let mut app = Router::new()
        .route("/api/health", get(api::health))
        .route("/api/site", get(api::site))
        .route("/api/posts", get(api::list_posts))
        .route("/api/posts/upload", post(api::upload_post))
        .route("/api/posts/:slug", get(api::get_post).delete(api::delete_post))
        .route("/api/categories", get(api::list_categories))
        .route("/api/categories/rename", post(api::rename_category))
        .route("/api/categories/:name", delete(api::delete_category))
        .route("/api/preview", post(api::preview))
        .route(
            "/api/reward-image",
            get(api::get_reward_image).post(api::upload_reward_image),
        )
        .route("/api/publish", post(api::publish));

    for (file_name, build) in views::VIEWS {
        app = app.route(
            &format!("/{}", file_name),
            get(move |State(state): State<Arc<AdminState>>| async move {
                api::render_view(&state, build)
            }),
        );
    }

    app.nest_service("/admin", admin)
        .fallback_service(public)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the admin server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    std::fs::create_dir_all(&blog.posts_dir)?;
    std::fs::create_dir_all(&blog.public_dir)?;

    let state = Arc::new(AdminState::new(blog.clone()));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Admin running at http://{}:{}/admin", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
