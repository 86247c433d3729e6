//! 集成测试 - 上传与链接解析
//!
//! 针对真实的进程内服务验证上传接口、静态路由、
//! 并发上传和进度回调语义。

use pawshare_core::{
    ErrorResponse, FileStore, ShareClient, ShareServer, ShareServerOptions, UploadProgressCallback,
};
use std::path::Path;
use std::sync::Mutex;

/// 收集事件的测试回调
struct CollectingCallback {
    progress: Mutex<Vec<(u64, u64)>>,
    completed: Mutex<Option<String>>,
    errors: Mutex<Vec<String>>,
}

impl CollectingCallback {
    fn new() -> Self {
        Self {
            progress: Mutex::new(Vec::new()),
            completed: Mutex::new(None),
            errors: Mutex::new(Vec::new()),
        }
    }
}

impl UploadProgressCallback for CollectingCallback {
    fn on_progress(&self, sent: u64, total: u64) {
        self.progress.lock().unwrap().push((sent, total));
    }

    fn on_complete(&self, link: &str) {
        *self.completed.lock().unwrap() = Some(link.to_string());
    }

    fn on_error(&self, error: &str) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

async fn start_server(upload_dir: &Path) -> u16 {
    let store = FileStore::new(upload_dir);
    let mut server = ShareServer::new(ShareServerOptions { port: 0 }, store);
    server.start().await.unwrap()
}

/// 上传 10 字节的 a.txt，链接应解析出逐字节相同的内容
#[tokio::test]
async fn test_upload_and_fetch_roundtrip() {
    let storage = tempfile::tempdir().unwrap();
    let workdir = tempfile::tempdir().unwrap();
    let port = start_server(storage.path()).await;

    // 1. 准备 10 字节的 a.txt
    let file_path = workdir.path().join("a.txt");
    tokio::fs::write(&file_path, b"0123456789").await.unwrap();

    // 2. 上传
    let client = ShareClient::new(&format!("http://127.0.0.1:{}", port));
    let callback = CollectingCallback::new();
    let link = client.upload(&file_path, &callback).await.unwrap();

    // 3. 链接格式: http://<host>/uploads/<生成名>.txt
    let prefix = format!("http://127.0.0.1:{}/uploads/", port);
    assert!(link.starts_with(&prefix), "link: {}", link);
    assert!(link.ends_with(".txt"), "link: {}", link);
    assert_eq!(
        callback.completed.lock().unwrap().as_deref(),
        Some(link.as_str())
    );
    assert!(callback.errors.lock().unwrap().is_empty());

    // 4. GET 链接取回逐字节相同的内容
    let fetched = reqwest::get(&link).await.unwrap();
    assert_eq!(fetched.status(), 200);
    let content_type = fetched
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/plain"), "{}", content_type);
    let body = fetched.bytes().await.unwrap();
    assert_eq!(&body[..], b"0123456789");
}

/// 没有 file 字段时固定返回 400，带其他表单字段也一样
#[tokio::test]
async fn test_upload_without_file_field() {
    let storage = tempfile::tempdir().unwrap();
    let port = start_server(storage.path()).await;

    let form = reqwest::multipart::Form::new().text("note", "hello");
    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{}/upload", port))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(err.message, "No file uploaded!");
}

/// 空 multipart 请求体同样走固定的 400
#[tokio::test]
async fn test_upload_empty_multipart_body() {
    let storage = tempfile::tempdir().unwrap();
    let port = start_server(storage.path()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{}/upload", port))
        .multipart(reqwest::multipart::Form::new())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body = resp.text().await.unwrap();
    assert_eq!(body, r#"{"message":"No file uploaded!"}"#);
}

/// 同名源文件并发上传，得到两个互不相同、各自可取回的链接
#[tokio::test]
async fn test_concurrent_uploads_same_source_name() {
    let storage = tempfile::tempdir().unwrap();
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let port = start_server(storage.path()).await;

    let path_a = dir_a.path().join("a.txt");
    let path_b = dir_b.path().join("a.txt");
    tokio::fs::write(&path_a, b"first upload").await.unwrap();
    tokio::fs::write(&path_b, b"second upload").await.unwrap();

    let client = ShareClient::new(&format!("http://127.0.0.1:{}", port));
    let cb_a = CollectingCallback::new();
    let cb_b = CollectingCallback::new();

    let (link_a, link_b) = tokio::join!(
        client.upload(&path_a, &cb_a),
        client.upload(&path_b, &cb_b)
    );
    let link_a = link_a.unwrap();
    let link_b = link_b.unwrap();

    assert_ne!(link_a, link_b);

    let body_a = reqwest::get(&link_a).await.unwrap().bytes().await.unwrap();
    let body_b = reqwest::get(&link_b).await.unwrap().bytes().await.unwrap();
    assert_eq!(&body_a[..], b"first upload");
    assert_eq!(&body_b[..], b"second upload");
}

/// 进度单调不减，最后一次到达文件总量
#[tokio::test]
async fn test_progress_monotonic() {
    let storage = tempfile::tempdir().unwrap();
    let workdir = tempfile::tempdir().unwrap();
    let port = start_server(storage.path()).await;

    // 1 MiB，保证拆成多个块
    let file_path = workdir.path().join("big.bin");
    tokio::fs::write(&file_path, vec![0xA5u8; 1024 * 1024])
        .await
        .unwrap();

    let client = ShareClient::new(&format!("http://127.0.0.1:{}", port));
    let callback = CollectingCallback::new();
    client.upload(&file_path, &callback).await.unwrap();

    let events = callback.progress.lock().unwrap();
    assert!(!events.is_empty());
    let mut last = 0u64;
    for (sent, total) in events.iter() {
        assert_eq!(*total, 1024 * 1024);
        assert!(*sent >= last, "progress went backwards: {} < {}", sent, last);
        last = *sent;
    }
    assert_eq!(last, 1024 * 1024);
}

/// 静态路由：不存在的名字和路径穿越名字都按 404 处理
#[tokio::test]
async fn test_static_route_missing_and_traversal() {
    let storage = tempfile::tempdir().unwrap();
    let uploads = storage.path().join("uploads");
    tokio::fs::create_dir_all(&uploads).await.unwrap();
    // 上传目录外放一个不该被拿到的文件
    tokio::fs::write(storage.path().join("secret.txt"), b"secret")
        .await
        .unwrap();
    let port = start_server(&uploads).await;

    let missing = reqwest::get(format!(
        "http://127.0.0.1:{}/uploads/does-not-exist.txt",
        port
    ))
    .await
    .unwrap();
    assert_eq!(missing.status(), 404);

    let traversal = reqwest::get(format!(
        "http://127.0.0.1:{}/uploads/%2e%2e%2fsecret.txt",
        port
    ))
    .await
    .unwrap();
    assert_eq!(traversal.status(), 404);
}

/// 网络失败触发 on_error，错误向上传播
#[tokio::test]
async fn test_upload_network_error() {
    let workdir = tempfile::tempdir().unwrap();
    let file_path = workdir.path().join("a.txt");
    tokio::fs::write(&file_path, b"0123456789").await.unwrap();

    // 未监听的端口
    let client = ShareClient::new("http://127.0.0.1:9");
    let callback = CollectingCallback::new();
    let result = client.upload(&file_path, &callback).await;

    assert!(result.is_err());
    assert!(!callback.errors.lock().unwrap().is_empty());
    assert!(callback.completed.lock().unwrap().is_none());
}
