use anyhow::Result;
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "Pawshare 开发任务自动化")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建所有组件 (release)
    Build,
    /// 运行上传服务 (开发模式)
    Dev,
    /// 运行 TUI (开发模式)
    Tui {
        /// 日志级别 (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
        /// 日志输出文件 (默认 /tmp/pawshare.log)
        #[arg(short = 'o', long)]
        log_file: Option<String>,
    },
    /// 运行测试
    Test,
    /// 清理构建产物
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    // 确保在项目根目录执行
    let project_root = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::env::current_dir().unwrap());
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build => build(&sh)?,
        Commands::Dev => dev(&sh)?,
        Commands::Tui {
            log_level,
            log_file,
        } => tui(&sh, &log_level, log_file)?,
        Commands::Test => test(&sh)?,
        Commands::Clean => clean(&sh)?,
    }

    Ok(())
}

fn build(sh: &Shell) -> Result<()> {
    println!("🔨 构建所有组件...");
    cmd!(sh, "cargo build --workspace --release").run()?;
    println!("✅ 构建完成");
    Ok(())
}

fn dev(sh: &Shell) -> Result<()> {
    println!("🚀 启动开发模式上传服务...");
    cmd!(sh, "cargo run -p pawshare-server").run()?;
    Ok(())
}

fn tui(sh: &Shell, log_level: &str, log_file: Option<String>) -> Result<()> {
    let log_file = log_file.unwrap_or_else(|| "/tmp/pawshare.log".to_string());

    println!("🖥️  启动 TUI 调试模式...");
    println!("   日志级别: {}", log_level);
    println!("   日志文件: {}", log_file);
    println!();
    println!("💡 提示: 在另一个终端运行以下命令查看实时日志:");
    println!("   tail -f {}", log_file);
    println!();

    // 设置环境变量并运行
    let rust_log = format!("{level},pawshare_core={level}", level = log_level);

    // 使用 shell 执行以支持重定向
    let command = format!(
        "RUST_LOG='{}' cargo run -p pawshare-tui 2>> '{}'",
        rust_log, log_file
    );

    cmd!(sh, "bash -c {command}").run()?;

    println!();
    println!("📁 日志已保存到: {}", log_file);
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    println!("🧪 运行测试...");
    cmd!(sh, "cargo test --workspace").run()?;
    println!("✅ 测试完成");
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    println!("🧹 清理构建产物...");
    cmd!(sh, "cargo clean").run()?;
    println!("✅ 清理完成");
    Ok(())
}
