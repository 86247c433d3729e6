//! Pawshare Server
//!
//! 上传服务进程，负责：
//! - 接收 multipart 上传并落盘
//! - 返回完整下载链接
//! - 以静态路由回放已存储的文件

use anyhow::Result;
use pawshare_core::{AppSettings, FileStore, ShareServer, ShareServerOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 桥接 log crate（pawshare-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    // 初始化日志
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pawshare_core=debug")),
        )
        .try_init();

    let settings = AppSettings::load();
    tracing::info!(
        "Pawshare Server starting on port {} (uploads: {:?})",
        settings.listen_port,
        settings.upload_dir
    );

    let store = FileStore::new(&settings.upload_dir);
    let server = ShareServer::new(
        ShareServerOptions {
            port: settings.listen_port,
        },
        store,
    );

    server.serve().await
}
