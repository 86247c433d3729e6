//! Pawshare Core Library
//!
//! 文件快传核心实现库：上传即得分享链接
//!
//! # 模块
//!
//! - **share**: 上传服务（axum）、上传客户端（reqwest）、文件存储、
//!   上传状态机、链接二维码渲染
//! - **config**: 应用配置和持久化
//! - **logging**: 跨 UI 的日志级别和条目定义
//!
//! # 使用示例
//!
//! ## 启动上传服务
//!
//! ```ignore
//! use pawshare_core::{FileStore, ShareServer, ShareServerOptions};
//!
//! let store = FileStore::new("/var/lib/pawshare/uploads");
//! let mut server = ShareServer::new(ShareServerOptions { port: 5000, ..Default::default() }, store);
//! let port = server.start().await?;
//! ```
//!
//! ## 上传文件并获取链接
//!
//! ```ignore
//! use pawshare_core::{ShareClient, UploadProgressCallback};
//!
//! let client = ShareClient::new("http://192.168.1.10:5000");
//! let link = client.upload(Path::new("photo.jpg"), &callback).await?;
//! println!("{}", pawshare_core::share::qr::render_link_qr(&link)?);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod share;

// Config re-exports
pub use config::AppSettings;

// Error re-exports
pub use error::ShareError;

// Share re-exports
pub use share::{
    ErrorResponse, FileStore, SelectedFile, ShareClient, ShareServer, ShareServerOptions,
    SimpleUploadCallback, StateError, StoredFile, UploadEvent, UploadPhase,
    UploadProgressCallback, UploadResponse, UploadSnapshot,
};
