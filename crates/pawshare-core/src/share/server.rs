//! 上传服务
//!
//! 单个 POST /upload 接口接收 multipart 上传，把文件写入存储目录
//! 并返回完整下载链接；同一目录挂载为 GET /uploads/:name 静态路由，
//! 所以返回的链接无需额外服务逻辑即可解析。
//!
//! # 失败语义
//!
//! 唯一显式校验是"请求必须带 `file` 字段"→ 400。
//! 其余失败（磁盘满、权限不足）以 5xx 呈现，不重试，
//! 也不清理写了一半的文件。

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Host, Multipart, Path as UrlPath, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use log::{error, info};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;

use crate::error::ShareError;
use crate::share::protocol::UploadResponse;
use crate::share::store::FileStore;

/// 服务配置
#[derive(Debug, Clone)]
pub struct ShareServerOptions {
    /// 监听端口（0 表示随机分配）
    pub port: u16,
}

impl Default for ShareServerOptions {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

/// 服务器状态
pub struct AppState {
    pub store: FileStore,
}

/// 上传服务器
pub struct ShareServer {
    options: ShareServerOptions,
    port: u16,
    state: Arc<AppState>,
}

impl ShareServer {
    pub fn new(options: ShareServerOptions, store: FileStore) -> Self {
        Self {
            options,
            port: 0,
            state: Arc::new(AppState { store }),
        }
    }

    /// 获取分配的端口
    pub fn port(&self) -> u16 {
        self.port
    }

    /// 启动服务器（后台运行，返回实际监听端口）
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        self.state.store.ensure_root().await?;

        let app = build_router(self.state.clone());
        let listener = TcpListener::bind(format!("0.0.0.0:{}", self.options.port)).await?;
        let port = listener.local_addr()?.port();
        self.port = port;

        info!("Share server listening on port {}", port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Server error: {}", e);
            }
        });

        Ok(port)
    }

    /// 前台运行服务器（供服务端二进制使用）
    pub async fn serve(self) -> anyhow::Result<()> {
        self.state.store.ensure_root().await?;

        let app = build_router(self.state.clone());
        let listener = TcpListener::bind(format!("0.0.0.0:{}", self.options.port)).await?;
        info!(
            "Share server running on http://0.0.0.0:{}",
            listener.local_addr()?.port()
        );
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// 组装路由：上传接口 + 静态文件 + 宽松 CORS
///
/// 不限制请求体大小，传输层收下多大的文件就存多大。
fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/upload", post(upload_handler))
        .route("/uploads/:name", get(download_handler))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// 处理 multipart 上传
///
/// 只认名为 `file` 的字段，其余字段跳过；字段内容按块
/// 流式写盘，不在内存里攒整个文件。
async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ShareError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("file").to_string();
        let mut stored = state.store.stage(&original_name);
        let mut dest = state.store.create(&stored).await?;

        while let Some(chunk) = field.chunk().await? {
            stored.size += chunk.len() as u64;
            dest.write_all(&chunk).await?;
        }
        dest.flush().await?;

        info!(
            "Stored '{}' as {} ({} bytes)",
            stored.original_name, stored.name, stored.size
        );

        let link = format!(
            "{}://{}/uploads/{}",
            request_scheme(&headers),
            host,
            stored.name
        );
        return Ok(Json(UploadResponse { link }));
    }

    Err(ShareError::MissingFile)
}

/// 静态文件下载
async fn download_handler(
    State(state): State<Arc<AppState>>,
    UrlPath(name): UrlPath<String>,
) -> impl IntoResponse {
    match state.store.open(&name).await {
        Ok(file) => {
            let mime = mime_guess::from_path(&name).first_or_octet_stream();
            let stream = ReaderStream::new(file);
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                axum::body::Body::from_stream(stream),
            )
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

/// 请求的 scheme：反向代理后面认 X-Forwarded-Proto，否则按 http
fn request_scheme(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http")
}
