//! 上传文件存储
//!
//! 负责上传目录管理、存储名生成和文件句柄分发。
//! 存储名由服务端生成，既是磁盘文件名也是下载链接的后缀；
//! 目录列表就是全部状态，没有数据库或索引。

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};

use crate::error::ShareError;

/// 一次成功上传的描述
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// 服务端生成的存储名（唯一）
    pub name: String,
    /// 客户端提交的原始文件名（仅作元数据，不参与查找）
    pub original_name: String,
    /// 字节数
    pub size: u64,
    /// 磁盘路径
    pub path: PathBuf,
}

/// 上传目录之上的文件存储
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 确保上传目录存在
    pub async fn ensure_root(&self) -> Result<(), ShareError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// 为一次上传生成唯一存储名
    ///
    /// UUID v4 保证并发上传互不覆盖；保留原始扩展名，
    /// 静态路由据此猜测 Content-Type。
    pub fn assign_name(&self, original_name: &str) -> String {
        let id = uuid::Uuid::new_v4();
        match Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) if !ext.is_empty() => format!("{}.{}", id, ext),
            _ => id.to_string(),
        }
    }

    /// 为一次上传分配存储名和磁盘路径
    pub fn stage(&self, original_name: &str) -> StoredFile {
        let name = self.assign_name(original_name);
        let path = self.root.join(&name);
        StoredFile {
            name,
            original_name: original_name.to_string(),
            size: 0,
            path,
        }
    }

    /// 打开已分配路径的写句柄
    pub async fn create(&self, staged: &StoredFile) -> Result<File, ShareError> {
        Ok(File::create(&staged.path).await?)
    }

    /// 按存储名打开已有文件
    ///
    /// 存储名必须是单个普通路径段；带分隔符或 `..` 的名字
    /// 一律按不存在处理。
    pub async fn open(&self, name: &str) -> Result<File, ShareError> {
        if !is_safe_name(name) {
            return Err(ShareError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "invalid storage name",
            )));
        }
        Ok(File::open(self.root.join(name)).await?)
    }
}

/// 存储名必须是单个普通路径段
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
