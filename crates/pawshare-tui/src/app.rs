//! TUI 应用状态
//!
//! 上传相关状态全部委托给核心库的 `UploadSnapshot`，
//! 这里只保存界面自身的东西（标签页、日志、文件选择器）。

use pawshare_core::logging::{LogEntry, LogLevel};
use pawshare_core::share::qr;
use pawshare_core::{
    AppSettings, SelectedFile, ShareClient, SimpleUploadCallback, UploadEvent, UploadPhase,
    UploadSnapshot,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// 完成后进度条归零的展示延迟
const PROGRESS_CLEAR_DELAY: Duration = Duration::from_millis(1500);

/// 主界面标签页
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Transfer,
    Log,
}

/// 应用模式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Idle,
    FileSelection,
}

/// 后台事件
#[derive(Debug)]
pub enum AppEvent {
    Upload(UploadEvent),
    LogMessage { level: String, message: String },
}

/// 文件选择器（目录浏览）
pub struct FilePicker {
    pub dir: PathBuf,
    /// (名字, 是否目录)
    pub entries: Vec<(String, bool)>,
    pub selected: usize,
}

impl FilePicker {
    pub fn new() -> Self {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut picker = Self {
            dir,
            entries: Vec::new(),
            selected: 0,
        };
        picker.refresh();
        picker
    }

    /// 重新读取目录内容，目录在前、文件在后
    pub fn refresh(&mut self) {
        self.entries.clear();
        self.selected = 0;
        self.entries.push(("..".to_string(), true));

        if let Ok(read) = std::fs::read_dir(&self.dir) {
            let mut dirs = Vec::new();
            let mut files = Vec::new();
            for entry in read.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                // 隐藏文件不列出
                if name.starts_with('.') {
                    continue;
                }
                match entry.file_type() {
                    Ok(t) if t.is_dir() => dirs.push((name, true)),
                    Ok(_) => files.push((name, false)),
                    Err(_) => {}
                }
            }
            dirs.sort();
            files.sort();
            self.entries.extend(dirs);
            self.entries.extend(files);
        }
    }

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.entries.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.entries.len() - 1);
        }
    }

    /// 进入目录，或返回选定文件的完整路径
    pub fn enter(&mut self) -> Option<PathBuf> {
        let (name, is_dir) = self.entries.get(self.selected)?.clone();
        if is_dir {
            if name == ".." {
                if let Some(parent) = self.dir.parent() {
                    self.dir = parent.to_path_buf();
                }
            } else {
                self.dir = self.dir.join(name);
            }
            self.refresh();
            None
        } else {
            Some(self.dir.join(name))
        }
    }
}

pub struct App {
    pub snapshot: UploadSnapshot,
    pub tab: Tab,
    pub mode: AppMode,
    pub settings: AppSettings,
    pub logs: Vec<LogEntry>,
    pub file_picker: FilePicker,
    /// 上传完成时渲染好的二维码
    pub qr: Option<String>,
    pub status_message: String,
    pub event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
    completed_at: Option<Instant>,
}

impl App {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        Self {
            snapshot: UploadSnapshot::idle(),
            tab: Tab::Transfer,
            mode: AppMode::Idle,
            settings: AppSettings::load(),
            logs: Vec::new(),
            file_picker: FilePicker::new(),
            qr: None,
            status_message: "按 'f' 选择文件".to_string(),
            event_tx,
            event_rx,
            completed_at: None,
        }
    }

    pub fn add_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogEntry::new(level, message));
        // 日志面板保留最近 500 条
        if self.logs.len() > 500 {
            self.logs.remove(0);
        }
    }

    /// 选中本地文件（上传进行中会被状态机拒绝）
    pub fn set_file(&mut self, path: PathBuf) {
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let file = SelectedFile::new(path, size);
        match self.snapshot.select_file(file) {
            Ok(next) => {
                let name = next
                    .file
                    .as_ref()
                    .map(|f| f.name.clone())
                    .unwrap_or_default();
                self.snapshot = next;
                self.qr = None;
                self.completed_at = None;
                self.status_message = format!("已选择: {}", name);
                self.add_log(LogLevel::Info, format!("选择文件: {}", name));
            }
            Err(e) => {
                self.add_log(LogLevel::Warn, format!("无法选择文件: {}", e));
            }
        }
    }

    /// 发起上传
    pub fn start_upload(&mut self) {
        let next = match self.snapshot.begin_upload() {
            Ok(next) => next,
            Err(e) => {
                self.add_log(LogLevel::Warn, format!("无法开始上传: {}", e));
                return;
            }
        };
        let path = match next.file.as_ref() {
            Some(f) => f.path.clone(),
            None => return,
        };
        self.snapshot = next;
        self.qr = None;
        self.completed_at = None;
        self.status_message = "上传中...".to_string();

        let server_url = self.settings.server_url.clone();
        let event_tx = self.event_tx.clone();
        let (callback, mut rx) = SimpleUploadCallback::new();

        // 上传任务（失败也通过回调报告，join 结果不再关心）
        tokio::spawn(async move {
            let client = ShareClient::new(&server_url);
            let _ = client.upload(&path, &callback).await;
        });
        // 事件转发到主循环
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if event_tx.send(AppEvent::Upload(event)).await.is_err() {
                    break;
                }
            }
        });
    }

    /// 把后台事件灌进状态机
    pub fn handle_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::Upload(upload_event) => {
                    // 重置后迟到的事件由状态机丢弃
                    if self.snapshot.phase != UploadPhase::Uploading {
                        continue;
                    }
                    match upload_event {
                        UploadEvent::Progress { sent, total } => {
                            self.snapshot = self.snapshot.progress(sent, total);
                        }
                        UploadEvent::Complete { link } => {
                            self.snapshot = self.snapshot.complete(link.as_str());
                            self.qr = qr::render_link_qr(&link).ok();
                            self.completed_at = Some(Instant::now());
                            self.status_message = "上传完成 ✅".to_string();
                            self.add_log(LogLevel::Info, format!("上传完成: {}", link));
                        }
                        UploadEvent::Error(error) => {
                            self.snapshot = self.snapshot.fail(error.as_str());
                            self.qr = None;
                            self.status_message = "上传失败 ❌".to_string();
                            self.add_log(LogLevel::Error, format!("上传失败: {}", error));
                        }
                    }
                }
                AppEvent::LogMessage { level, message } => {
                    let level = level.parse::<LogLevel>().unwrap_or(LogLevel::Info);
                    self.add_log(level, message);
                }
            }
        }
    }

    /// 周期滴答：完成展示 1.5 秒后把进度条归零
    pub fn tick(&mut self) {
        if let Some(at) = self.completed_at {
            if at.elapsed() >= PROGRESS_CLEAR_DELAY {
                self.snapshot = self.snapshot.clear_progress();
                self.completed_at = None;
            }
        }
    }

    /// 重置：清掉文件、预览、进度和链接，不和服务器打交道
    pub fn reset(&mut self) {
        self.snapshot = self.snapshot.reset();
        self.qr = None;
        self.completed_at = None;
        self.status_message = "按 'f' 选择文件".to_string();
        self.add_log(LogLevel::Info, "已重置".to_string());
    }

    pub fn next_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Transfer => Tab::Log,
            Tab::Log => Tab::Transfer,
        };
    }
}
