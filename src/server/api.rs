//! Admin API handlers

use axum::{
    extract::{ConnectInfo, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use super::AdminState;
use crate::config::NavItem;
use crate::content::{decode::decode_text, sanitize_slug, FrontmatterOverrides, PostSummary};
use crate::error::BlogError;
use crate::taxonomy::{BulkRewrite, CategoryCount, CategoryIndex};
use crate::views::ViewBuilder;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// An error rendered as `{error, message}` with a matching status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn missing_file() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "missing_file", "no file field in upload")
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", format!("{} not found", what))
    }
}

impl From<BlogError> for ApiError {
    fn from(err: BlogError) -> Self {
        let message = err.to_string();
        match err {
            BlogError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            BlogError::InvalidInput(_) => Self::bad_request(message),
            BlogError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, "forbidden", message),
            BlogError::Publish(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "publish_failed", message)
            }
            BlogError::Io(_) | BlogError::Yaml(_) | BlogError::Json(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}: {}", self.code, self.message);
        } else {
            tracing::debug!("{}: {}", self.code, self.message);
        }
        let body = ErrorResponse {
            error: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

pub async fn health() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub reward_image_path: String,
    pub nav: Vec<NavItem>,
}

pub async fn site(State(state): State<Arc<AdminState>>) -> Json<SiteInfo> {
    let config = &state.blog.config;
    Json(SiteInfo {
        title: config.title.clone(),
        description: config.description.clone(),
        author: config.author.clone(),
        language: config.language.clone(),
        url: config.url.clone(),
        reward_image_path: config.reward_image_path.clone(),
        nav: config.nav.clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostSummary>,
}

pub async fn list_posts(State(state): State<Arc<AdminState>>) -> ApiResult<Json<PostListResponse>> {
    let posts = state.repository.list()?;
    Ok(Json(PostListResponse { posts }))
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub slug: String,
    pub file: String,
    /// Canonical frontmatter
    pub frontmatter: Value,
    /// Markdown body
    pub content: String,
    pub raw: String,
}

pub async fn get_post(
    State(state): State<Arc<AdminState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PostDetail>> {
    let post = state
        .repository
        .get(&slug)?
        .ok_or_else(|| ApiError::not_found("post"))?;
    let frontmatter = serde_json::to_value(post.metadata.to_mapping()).map_err(BlogError::from)?;

    Ok(Json(PostDetail {
        slug: post.slug,
        file: post.file,
        frontmatter,
        content: post.body,
        raw: post.raw,
    }))
}

pub async fn delete_post(
    State(state): State<Arc<AdminState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<OkResponse>> {
    if !state.repository.delete(&slug)? {
        return Err(ApiError::not_found("post"));
    }
    Ok(Json(OkResponse { ok: true }))
}

/// An uploaded file part
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Fields of a multipart form: the `file` part plus text fields
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    title: Option<String>,
    description: Option<String>,
    categories: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                form.file = Some(UploadedFile {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "title" | "description" | "categories" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                match name.as_str() {
                    "title" => form.title = Some(text),
                    "description" => form.description = Some(text),
                    _ => form.categories = Some(text),
                }
            }
            other => tracing::debug!("Ignoring form field {:?}", other),
        }
    }

    Ok(form)
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub slug: String,
    pub file: String,
}

pub async fn upload_post(
    State(state): State<Arc<AdminState>>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let form = read_form(multipart).await?;
    let file = form.file.ok_or_else(ApiError::missing_file)?;

    let slug = sanitize_slug(&file.name);
    let content = decode_text(&file.bytes);
    let overrides = FrontmatterOverrides {
        title: form.title,
        description: form.description,
        categories: form.categories,
    };

    let post = state.repository.upsert(&slug, &content, &overrides)?;
    Ok(Json(UploadResponse {
        ok: true,
        slug: post.slug,
        file: post.file,
    }))
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryCount>,
}

pub async fn list_categories(
    State(state): State<Arc<AdminState>>,
) -> ApiResult<Json<CategoryListResponse>> {
    let categories = CategoryIndex::new(&state.repository).counts(true)?;
    Ok(Json(CategoryListResponse { categories }))
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    /// False when any post failed to rewrite
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: BulkRewrite,
}

impl From<BulkRewrite> for BulkResponse {
    fn from(outcome: BulkRewrite) -> Self {
        Self {
            ok: outcome.failures.is_empty(),
            outcome,
        }
    }
}

pub async fn rename_category(
    State(state): State<Arc<AdminState>>,
    Json(request): Json<RenameRequest>,
) -> ApiResult<Json<BulkResponse>> {
    let outcome = CategoryIndex::new(&state.repository).rename(&request.from, &request.to)?;
    Ok(Json(outcome.into()))
}

pub async fn delete_category(
    State(state): State<Arc<AdminState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<BulkResponse>> {
    let outcome = CategoryIndex::new(&state.repository).delete(&name)?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub html: String,
}

pub async fn preview(
    State(state): State<Arc<AdminState>>,
    Json(request): Json<PreviewRequest>,
) -> Json<PreviewResponse> {
    Json(PreviewResponse {
        html: state.renderer.render(&request.markdown),
    })
}

#[derive(Debug, Serialize)]
pub struct RewardImageResponse {
    pub path: String,
}

pub async fn get_reward_image(
    State(state): State<Arc<AdminState>>,
) -> ApiResult<Json<RewardImageResponse>> {
    let path = state.reward_image.find()?.unwrap_or_default();
    Ok(Json(RewardImageResponse { path }))
}

#[derive(Debug, Serialize)]
pub struct RewardUploadResponse {
    pub ok: bool,
    pub path: String,
}

pub async fn upload_reward_image(
    State(state): State<Arc<AdminState>>,
    multipart: Multipart,
) -> ApiResult<Json<RewardUploadResponse>> {
    let form = read_form(multipart).await?;
    let file = form.file.ok_or_else(ApiError::missing_file)?;
    let path = state.reward_image.store(&file.name, &file.bytes)?;
    Ok(Json(RewardUploadResponse { ok: true, path }))
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub ok: bool,
    pub changed: bool,
}

/// Loopback check, IPv4-mapped IPv6 included
fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback()),
    }
}

pub async fn publish(
    State(state): State<Arc<AdminState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Option<Json<PublishRequest>>,
) -> ApiResult<Json<PublishResponse>> {
    if !is_loopback(addr.ip()) {
        tracing::warn!("Rejected publish from {}", addr);
        return Err(BlogError::Forbidden("publish is only allowed from localhost".to_string()).into());
    }

    let request = request.map(|Json(r)| r).unwrap_or_default();
    let outcome = state.publisher.publish(request.message.as_deref()).await?;
    Ok(Json(PublishResponse {
        ok: true,
        changed: outcome.changed,
    }))
}

/// Render one of the published views from the current posts
pub(super) fn render_view(state: &AdminState, build: ViewBuilder) -> ApiResult<Response> {
    let posts = state.repository.load_all()?;
    let view = build(&state.blog.config, &posts, Utc::now())?;
    Ok(([(header::CONTENT_TYPE, view.content_type)], view.body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::server::router;
    use crate::Blog;
    use axum::body::{to_bytes, Body};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::Request;
    use axum::Router;
    use std::fs;
    use std::path::Path as FsPath;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XBLOGBOUNDARY";

    fn app(base: &FsPath, peer: [u8; 4]) -> Router {
        let blog = Blog::with_config(base, SiteConfig::default());
        fs::create_dir_all(&blog.posts_dir).unwrap();
        fs::create_dir_all(&blog.public_dir).unwrap();
        router(Arc::new(AdminState::new(blog))).layer(MockConnectInfo(SocketAddr::from((peer, 4000))))
    }

    fn posts_dir(base: &FsPath) -> std::path::PathBuf {
        base.join("src/content/blog")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = send(app(dir.path(), [127, 0, 0, 1]), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn test_upload_then_list_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart_request(
            "/api/posts/upload",
            &[
                ("file", Some("hello world.md"), "Just a body\n"),
                ("categories", None, "Tech， Life"),
            ],
        );
        let (status, json) = send(app(dir.path(), [127, 0, 0, 1]), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["slug"], "hello world");
        assert_eq!(json["file"], "hello world.md");
        assert!(posts_dir(dir.path()).join("hello world.md").exists());

        let (_, json) = send(app(dir.path(), [127, 0, 0, 1]), get("/api/posts")).await;
        let posts = json["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "hello world");
        assert_eq!(posts[0]["categories"], serde_json::json!(["Tech", "Life"]));

        let (status, json) = send(app(dir.path(), [127, 0, 0, 1]), get("/api/posts/hello%20world")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["frontmatter"]["title"], "hello world");
        assert_eq!(json["content"], "Just a body\n");
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart_request("/api/posts/upload", &[("title", None, "x")]);
        let (status, json) = send(app(dir.path(), [127, 0, 0, 1]), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "missing_file");
    }

    #[tokio::test]
    async fn test_missing_post() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = send(app(dir.path(), [127, 0, 0, 1]), get("/api/posts/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/posts/nope")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(dir.path(), [127, 0, 0, 1]), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_post() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), [127, 0, 0, 1]);
        fs::write(posts_dir(dir.path()).join("gone.mdx"), "---\ntitle: Gone\n---\n").unwrap();

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/posts/gone")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert!(!posts_dir(dir.path()).join("gone.mdx").exists());
    }

    #[tokio::test]
    async fn test_category_rename_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), [127, 0, 0, 1]);
        fs::write(posts_dir(dir.path()).join("a.md"), "---\ncategories: [Tech]\n---\n").unwrap();
        fs::write(posts_dir(dir.path()).join("b.md"), "---\ncategories: [Tech, Life]\n---\n").unwrap();

        let request = json_request(
            "POST",
            "/api/categories/rename",
            serde_json::json!({"from": "Tech", "to": "Code"}),
        );
        let (status, json) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["changedCount"], 2);
        assert_eq!(json["failures"], serde_json::json!([]));

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/categories/Life")
            .body(Body::empty())
            .unwrap();
        let (_, json) = send(app.clone(), request).await;
        assert_eq!(json["changedCount"], 1);

        let (_, json) = send(app, get("/api/categories")).await;
        assert_eq!(
            json["categories"],
            serde_json::json!([{"name": "Code", "count": 2}])
        );
    }

    #[tokio::test]
    async fn test_rename_blank_source() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            "POST",
            "/api/categories/rename",
            serde_json::json!({"from": " ", "to": "x"}),
        );
        let (status, json) = send(app(dir.path(), [127, 0, 0, 1]), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_preview() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            "POST",
            "/api/preview",
            serde_json::json!({"markdown": "# Hi\n\n<b>raw</b>"}),
        );
        let (status, json) = send(app(dir.path(), [127, 0, 0, 1]), request).await;
        assert_eq!(status, StatusCode::OK);
        let html = json["html"].as_str().unwrap();
        assert!(html.contains(r#"<h1 id="hi">Hi</h1>"#));
        assert!(!html.contains("<b>"));
    }

    #[tokio::test]
    async fn test_reward_image() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), [127, 0, 0, 1]);

        let (_, json) = send(app.clone(), get("/api/reward-image")).await;
        assert_eq!(json["path"], "");

        let request = multipart_request("/api/reward-image", &[("file", Some("qr.JPG"), "img")]);
        let (status, json) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["path"], "/reward.jpg");

        let (_, json) = send(app, get("/api/reward-image")).await;
        assert_eq!(json["path"], "/reward.jpg");
    }

    #[tokio::test]
    async fn test_publish_rejects_remote_callers() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request("POST", "/api/publish", serde_json::json!({}));
        let (status, json) = send(app(dir.path(), [192, 168, 1, 20]), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "forbidden");
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("127.0.0.1".parse().unwrap()));
        assert!(is_loopback("::1".parse().unwrap()));
        assert!(is_loopback("::ffff:127.0.0.1".parse().unwrap()));
        assert!(!is_loopback("::ffff:10.0.0.1".parse().unwrap()));
        assert!(!is_loopback("192.168.1.20".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_views_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), [127, 0, 0, 1]);
        fs::write(posts_dir(dir.path()).join("a.md"), "---\ntitle: A\ncategories: [Tech]\n---\nbody\n").unwrap();

        let response = app.clone().oneshot(get("/rss.xml")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/rss+xml; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("<title>A</title>"));

        let (_, json) = send(app.clone(), get("/categories.json")).await;
        assert_eq!(json["categories"][0]["name"], "Tech");

        let (_, json) = send(app, get("/search.json")).await;
        assert_eq!(json["items"][0]["text"], "body");
    }

    #[tokio::test]
    async fn test_public_files_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), [127, 0, 0, 1]);
        fs::write(dir.path().join("public/hello.txt"), "hi").unwrap();

        let response = app.oneshot(get("/hello.txt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hi");
    }
}
