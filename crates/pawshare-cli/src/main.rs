//! Pawshare CLI
//!
//! 命令行客户端：上传文件拿链接，顺手打出二维码

use anyhow::Result;
use clap::{Parser, Subcommand};
use pawshare_core::share::qr;
use pawshare_core::{AppSettings, ShareClient, UploadProgressCallback};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Parser)]
#[command(name = "pawshare", version, about = "猫爪快传 - 上传文件生成分享链接")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 上传文件并获取下载链接
    Upload {
        /// 要上传的文件路径
        file: PathBuf,
        /// 服务器地址 (默认取配置文件)
        #[arg(short, long)]
        server: Option<String>,
        /// 不打印二维码
        #[arg(long)]
        no_qr: bool,
    },
    /// 把已有链接渲染成二维码
    Qr {
        /// 下载链接
        link: String,
    },
}

/// 终端进度输出
///
/// 响应回来之前封顶在 99%，只有成功才打出 100%。
struct CliProgress {
    last_percent: AtomicU8,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            last_percent: AtomicU8::new(0),
        }
    }
}

impl UploadProgressCallback for CliProgress {
    fn on_progress(&self, sent: u64, total: u64) {
        let percent = if total == 0 {
            99
        } else {
            (sent.saturating_mul(100) / total).min(99) as u8
        };
        let prev = self.last_percent.fetch_max(percent, Ordering::Relaxed);
        if percent > prev {
            print!("\r📤 上传中... {:>3}%", percent);
            let _ = std::io::stdout().flush();
        }
    }

    fn on_complete(&self, _link: &str) {
        println!("\r📤 上传中... 100%");
    }

    fn on_error(&self, _error: &str) {
        // 把进度行结束掉，错误信息由调用方打印
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            server,
            no_qr,
        } => {
            let settings = AppSettings::load();
            let base = server.unwrap_or(settings.server_url);

            println!("📤 上传文件: {}", file.display());
            let client = ShareClient::new(&base);
            let progress = CliProgress::new();

            match client.upload(&file, &progress).await {
                Ok(link) => {
                    println!("✅ 上传完成");
                    println!("🔗 {}", link);
                    if !no_qr {
                        println!("{}", qr::render_link_qr(&link)?);
                        println!("   手机扫码即可下载");
                    }
                }
                Err(e) => {
                    eprintln!("❌ 上传失败: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Qr { link } => {
            println!("{}", qr::render_link_qr(&link)?);
        }
    }

    Ok(())
}
