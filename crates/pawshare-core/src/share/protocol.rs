//! 上传接口的线上类型
//!
//! 与浏览器/脚本客户端共享的 JSON 载荷定义。

use serde::{Deserialize, Serialize};

/// 上传成功响应
///
/// `link` 是完整的下载链接，由请求的 scheme + Host 加上存储名拼接而成。
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadResponse {
    pub link: String,
}

/// 错误响应
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub message: String,
}
