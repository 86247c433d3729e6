//! 文件分享模块
//!
//! 包含:
//! - 上传服务（axum，POST /upload + 静态 /uploads 路由）
//! - 上传客户端（reqwest multipart，进度回调）
//! - 文件存储与存储名生成
//! - 客户端上传状态机
//! - 下载链接二维码渲染

pub mod client;
pub mod protocol;
pub mod qr;
pub mod server;
pub mod state;
pub mod store;

pub use client::{ShareClient, SimpleUploadCallback, UploadEvent, UploadProgressCallback};
pub use protocol::{ErrorResponse, UploadResponse};
pub use server::{ShareServer, ShareServerOptions};
pub use state::{SelectedFile, StateError, UploadPhase, UploadSnapshot};
pub use store::{FileStore, StoredFile};
