//! UI rendering module

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs, Wrap},
};

use pawshare_core::UploadPhase;

use crate::app::{App, AppMode, Tab};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    match app.tab {
        Tab::Transfer => draw_transfer_tab(frame, app, chunks[1]),
        Tab::Log => draw_log_tab(frame, app, chunks[1]),
    }
    draw_status_bar(frame, app, chunks[2]);

    // 文件选择弹层盖在最上面
    if app.mode == AppMode::FileSelection {
        draw_file_picker(frame, app, chunks[1]);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let titles = vec!["传输 [1]", "日志 [2]"];
    let selected = match app.tab {
        Tab::Transfer => 0,
        Tab::Log => 1,
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Pawshare TUI "),
        )
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    frame.render_widget(tabs, area);
}

fn draw_transfer_tab(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // File preview
            Constraint::Length(3), // Progress
            Constraint::Min(8),    // Link + QR
        ])
        .split(area);

    // 文件预览
    let file_text = match app.snapshot.file.as_ref() {
        Some(file) => {
            let badge = if file.is_image() {
                "🖼️ 图片"
            } else {
                "📄 文件"
            };
            format!(
                "{}\n名称: {}\n大小: {}\n类型: {}",
                badge,
                file.name,
                format_size(file.size),
                file.mime_type
            )
        }
        None => "尚未选择文件\n\n按 'f' 打开文件选择器".to_string(),
    };
    let preview = Paragraph::new(file_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 📁 文件预览 "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(preview, chunks[0]);

    // 进度条
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 📦 上传进度 "),
        )
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(u16::from(app.snapshot.percent))
        .label(format!("{}%", app.snapshot.percent));
    frame.render_widget(gauge, chunks[1]);

    // 链接 + 二维码
    let result_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let result_text = match app.snapshot.phase {
        UploadPhase::Completed => {
            let link = app.snapshot.link.as_deref().unwrap_or("");
            vec![
                Line::from(Span::styled(
                    "上传成功 ✅",
                    Style::default().fg(Color::Green).bold(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    link.to_string(),
                    Style::default().fg(Color::Cyan).underlined(),
                )),
                Line::from(""),
                Line::from("右侧二维码可供手机扫码下载"),
            ]
        }
        UploadPhase::Failed => vec![
            Line::from(Span::styled(
                "上传失败 ❌",
                Style::default().fg(Color::Red).bold(),
            )),
            Line::from(""),
            Line::from(app.snapshot.error.clone().unwrap_or_default()),
        ],
        UploadPhase::Uploading => vec![Line::from("上传中，请稍候...")],
        _ => vec![
            Line::from("按 'u' 或 Enter 开始上传"),
            Line::from("按 'x' 重置"),
        ],
    };
    let result = Paragraph::new(result_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" 🔗 下载链接 "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(result, result_chunks[0]);

    let qr_text = app
        .qr
        .clone()
        .unwrap_or_else(|| "（上传完成后显示二维码）".to_string());
    let qr = Paragraph::new(qr_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 扫码下载 "),
    );
    frame.render_widget(qr, result_chunks[1]);
}

fn draw_log_tab(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .map(|entry| {
            let style = match entry.level {
                pawshare_core::logging::LogLevel::Error => Style::default().fg(Color::Red),
                pawshare_core::logging::LogLevel::Warn => Style::default().fg(Color::Yellow),
                _ => Style::default(),
            };
            ListItem::new(format!("{} {}", entry.level.icon(), entry.message)).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" 📋 日志 "));
    frame.render_widget(list, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help = match app.mode {
        AppMode::FileSelection => "↑/↓ 选择  Enter 确认  Esc 取消",
        AppMode::Idle => "f 选文件  u/Enter 上传  x 重置  Tab 切换标签  q 退出",
    };

    let status = Paragraph::new(format!("{}  |  {}", app.status_message, help))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn draw_file_picker(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = app
        .file_picker
        .entries
        .iter()
        .enumerate()
        .map(|(i, (name, is_dir))| {
            let prefix = if *is_dir { "📂" } else { "📄" };
            let content = format!("{} {}", prefix, name);
            let style = if i == app.file_picker.selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(content).style(style)
        })
        .collect();

    let title = format!(" 选择文件: {} ", app.file_picker.dir.display());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(list, popup);
}

/// 弹层居中矩形
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// 文件大小的人类可读格式
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
