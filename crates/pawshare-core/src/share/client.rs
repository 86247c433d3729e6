//! 上传客户端
//!
//! 通过 multipart POST 上传文件，以回调方式报告传输进度。
//!
//! # 进度语义
//!
//! 进度是"已交给传输层的字节数 / 文件总字节数"，
//! 在一次上传内单调不减。字节数可能在响应返回前就到达
//! 总量，是否显示 100% 由上层状态机决定。

use futures_util::StreamExt;
use log::{debug, info};
use std::path::Path;
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

use crate::share::protocol::{ErrorResponse, UploadResponse};

/// 上传事件回调
pub trait UploadProgressCallback: Send + Sync {
    /// 进度更新（已发送字节 / 总字节）
    fn on_progress(&self, sent: u64, total: u64);
    /// 上传完成，携带下载链接
    fn on_complete(&self, link: &str);
    /// 上传失败
    fn on_error(&self, error: &str);
}

/// 文件上传客户端
pub struct ShareClient {
    base_url: String,
    http: reqwest::Client,
}

impl ShareClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// 上传文件，成功时返回下载链接
    ///
    /// 所有失败路径（本地 IO、网络、非 2xx 响应）都会触发一次
    /// `on_error`，成功路径触发一次 `on_complete`。
    pub async fn upload<C: UploadProgressCallback>(
        &self,
        path: &Path,
        callback: &C,
    ) -> anyhow::Result<String> {
        match self.try_upload(path, callback).await {
            Ok(link) => {
                callback.on_complete(&link);
                Ok(link)
            }
            Err(e) => {
                callback.on_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn try_upload<C: UploadProgressCallback>(
        &self,
        path: &Path,
        callback: &C,
    ) -> anyhow::Result<String> {
        let file = File::open(path).await?;
        let total = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();

        // 读文件的流在交块给传输层时累计字节数，经通道报告
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let mut sent: u64 = 0;
        let stream = ReaderStream::new(file).inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                sent += bytes.len() as u64;
                let _ = tx.send(sent);
            }
        });

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(stream),
            total,
        )
        .file_name(file_name)
        .mime_str(mime_type.as_ref())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/upload", self.base_url);
        info!("Uploading {:?} ({} bytes) to {}", path, total, url);

        // 同时驱动请求 future 和进度通道
        let send_fut = self.http.post(&url).multipart(form).send();
        tokio::pin!(send_fut);

        let response = loop {
            tokio::select! {
                Some(n) = rx.recv() => callback.on_progress(n, total),
                res = &mut send_fut => break res?,
            }
        };

        // 请求结束后把攒下的进度事件补发完
        while let Ok(n) = rx.try_recv() {
            callback.on_progress(n, total);
        }

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            anyhow::bail!("{}", message);
        }

        let body: UploadResponse = response.json().await?;
        debug!("Upload complete: {}", body.link);

        Ok(body.link)
    }
}

/// 简化的上传回调实现
///
/// 把回调转成 mpsc 事件流，方便事件循环型 UI 消费。
pub struct SimpleUploadCallback {
    tx: mpsc::Sender<UploadEvent>,
}

#[derive(Debug, Clone)]
pub enum UploadEvent {
    Progress { sent: u64, total: u64 },
    Complete { link: String },
    Error(String),
}

impl SimpleUploadCallback {
    pub fn new() -> (Self, mpsc::Receiver<UploadEvent>) {
        let (tx, rx) = mpsc::channel(64);
        (Self { tx }, rx)
    }
}

impl UploadProgressCallback for SimpleUploadCallback {
    fn on_progress(&self, sent: u64, total: u64) {
        let _ = self.tx.try_send(UploadEvent::Progress { sent, total });
    }

    fn on_complete(&self, link: &str) {
        let _ = self.tx.try_send(UploadEvent::Complete {
            link: link.to_string(),
        });
    }

    fn on_error(&self, error: &str) {
        let _ = self.tx.try_send(UploadEvent::Error(error.to_string()));
    }
}
