//! 服务端错误类型
//!
//! 上传服务的统一错误定义，负责映射到 HTTP 响应。
//! 唯一显式校验的前置条件是"请求中必须带文件字段"，
//! 其余失败（磁盘、传输）按 5xx 交给框架层面呈现。

use crate::share::protocol::ErrorResponse;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShareError {
    /// 请求中没有名为 `file` 的字段
    #[error("No file uploaded!")]
    MissingFile,
    /// multipart 请求体解析失败
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
    /// 磁盘写入/读取失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShareError {
    fn status(&self) -> StatusCode {
        match self {
            ShareError::MissingFile | ShareError::Multipart(_) => StatusCode::BAD_REQUEST,
            ShareError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Upload request failed: {}", self);
        }
        let body = Json(ErrorResponse {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_message() {
        // 固定的客户端错误文案，客户端和测试都依赖它
        assert_eq!(ShareError::MissingFile.to_string(), "No file uploaded!");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ShareError::MissingFile.status(), StatusCode::BAD_REQUEST);
        let io = ShareError::Io(std::io::Error::other("disk full"));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
