//! 应用配置和持久化
//!
//! 提供服务监听端口、上传目录、默认服务器地址等设置的存储和读取。

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// 服务监听端口
    pub listen_port: u16,
    /// 上传文件存储目录
    pub upload_dir: PathBuf,
    /// 客户端默认连接的服务器地址
    pub server_url: String,
    /// 详细日志模式
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            listen_port: 5000,
            upload_dir: default_upload_dir(),
            server_url: "http://127.0.0.1:5000".to_string(),
            verbose: false,
        }
    }
}

impl AppSettings {
    /// 获取配置文件路径
    fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pawshare");
        config_dir.join("settings.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(settings) => {
                        debug!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 保存设置
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// 获取默认上传目录（平台数据目录下）
fn default_upload_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pawshare")
        .join("uploads")
}
