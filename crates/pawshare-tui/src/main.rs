//! Pawshare TUI - 交互式终端界面
//!
//! 使用 ratatui 提供选文件、上传、看进度、扫码的完整流程。
//!
//! # 日志
//!
//! 日志默认显示在 TUI 的"日志"标签页中。
//! 如需输出到文件进行调试，设置 RUST_LOG 环境变量：
//!
//! ```bash
//! RUST_LOG=debug cargo run -p pawshare-tui 2>> /tmp/pawshare.log
//! ```

mod app;
mod tui_log;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, AppMode, Tab};
use tui_log::TuiLogLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 解析命令行参数（可选的文件路径）
    let args: Vec<String> = std::env::args().collect();
    let file_path = args.get(1).cloned();

    // 创建 App（获取日志发送器）
    let mut app = App::new();

    // 初始化日志系统，发送到 TUI 日志面板
    init_logging(app.event_tx.clone());

    if let Some(path) = file_path {
        app.set_file(PathBuf::from(path));
    }

    // Run app
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// 初始化日志系统
///
/// - 总是将日志发送到 TUI 日志面板
/// - 如果设置了 RUST_LOG，同时输出到 stderr（用于调试）
fn init_logging(log_tx: tokio::sync::mpsc::Sender<app::AppEvent>) {
    // 桥接 log crate（pawshare-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    // TUI 日志层 - 总是启用
    let tui_layer = TuiLogLayer::new(log_tx);

    // 设置过滤器
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // 默认只显示 info 及以上级别
        EnvFilter::new("info,pawshare_core=debug")
    });

    // 如果设置了 RUST_LOG，同时输出到 stderr
    if std::env::var("RUST_LOG").is_ok() {
        use tracing_subscriber::fmt;

        let stderr_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .with(stderr_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .try_init();
    }
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        app.handle_events();
        app.tick();
        terminal.draw(|f| ui::draw(f, &app))?;

        // 使用 poll 避免无限阻塞
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.mode {
            AppMode::FileSelection => match key.code {
                KeyCode::Esc => app.mode = AppMode::Idle,
                KeyCode::Up | KeyCode::Char('k') => app.file_picker.previous(),
                KeyCode::Down | KeyCode::Char('j') => app.file_picker.next(),
                KeyCode::Enter => {
                    if let Some(path) = app.file_picker.enter() {
                        app.set_file(path);
                        app.mode = AppMode::Idle;
                    }
                }
                _ => {}
            },
            AppMode::Idle => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    return Ok(());
                }
                KeyCode::Char('f') => {
                    app.file_picker.refresh();
                    app.mode = AppMode::FileSelection;
                }
                KeyCode::Char('u') | KeyCode::Enter => {
                    app.start_upload();
                }
                KeyCode::Char('x') => {
                    app.reset();
                }
                KeyCode::Char('1') => app.tab = Tab::Transfer,
                KeyCode::Char('2') => app.tab = Tab::Log,
                KeyCode::Tab => app.next_tab(),
                _ => {}
            },
        }
    }
}
