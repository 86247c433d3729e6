//! 客户端上传状态机
//!
//! UI 状态以单个不可变快照表示，每次转换整体替换，
//! 杜绝"链接已显示而进度还没归零"这类中间态。
//!
//! 阶段流转: `Idle → FileSelected → Uploading → Completed | Failed`，
//! `reset` 从任意阶段回到 `Idle`。上传进行中拒绝选择新文件或
//! 发起新上传。

use std::path::PathBuf;
use thiserror::Error;

/// 状态转换错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// 已有传输在进行中
    #[error("a transfer is already in flight")]
    TransferInFlight,
    /// 尚未选择文件
    #[error("no file selected")]
    NoFileSelected,
}

/// 选中的本地文件
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl SelectedFile {
    /// 从路径和大小构建，顺带猜测 MIME 类型
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        Self {
            path,
            name,
            size,
            mime_type,
        }
    }

    /// 是否为图片（决定预览面板的展示方式）
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// 上传阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FileSelected,
    Uploading,
    Completed,
    Failed,
}

/// 上传状态快照
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSnapshot {
    pub phase: UploadPhase,
    pub file: Option<SelectedFile>,
    /// 展示给用户的进度百分比（0-100）
    pub percent: u8,
    pub link: Option<String>,
    pub error: Option<String>,
}

impl UploadSnapshot {
    pub fn idle() -> Self {
        Self {
            phase: UploadPhase::Idle,
            file: None,
            percent: 0,
            link: None,
            error: None,
        }
    }

    /// 选择文件：进度和链接一并清空
    pub fn select_file(&self, file: SelectedFile) -> Result<Self, StateError> {
        if self.phase == UploadPhase::Uploading {
            return Err(StateError::TransferInFlight);
        }
        Ok(Self {
            phase: UploadPhase::FileSelected,
            file: Some(file),
            percent: 0,
            link: None,
            error: None,
        })
    }

    /// 开始上传
    pub fn begin_upload(&self) -> Result<Self, StateError> {
        if self.phase == UploadPhase::Uploading {
            return Err(StateError::TransferInFlight);
        }
        let file = self.file.clone().ok_or(StateError::NoFileSelected)?;
        Ok(Self {
            phase: UploadPhase::Uploading,
            file: Some(file),
            percent: 0,
            link: None,
            error: None,
        })
    }

    /// 进度更新
    ///
    /// 百分比单调不减，收到成功响应前封顶在 99。
    pub fn progress(&self, sent: u64, total: u64) -> Self {
        if self.phase != UploadPhase::Uploading {
            return self.clone();
        }
        let raw = if total == 0 {
            99
        } else {
            (sent.saturating_mul(100) / total).min(99) as u8
        };
        Self {
            percent: raw.max(self.percent),
            ..self.clone()
        }
    }

    /// 上传成功
    ///
    /// 只在 `Uploading` 阶段生效，重置后迟到的完成事件不会复活链接。
    pub fn complete(&self, link: impl Into<String>) -> Self {
        if self.phase != UploadPhase::Uploading {
            return self.clone();
        }
        Self {
            phase: UploadPhase::Completed,
            file: self.file.clone(),
            percent: 100,
            link: Some(link.into()),
            error: None,
        }
    }

    /// 上传失败：进度归零
    ///
    /// 与 `complete` 一样只在 `Uploading` 阶段生效。
    pub fn fail(&self, error: impl Into<String>) -> Self {
        if self.phase != UploadPhase::Uploading {
            return self.clone();
        }
        Self {
            phase: UploadPhase::Failed,
            file: self.file.clone(),
            percent: 0,
            link: None,
            error: Some(error.into()),
        }
    }

    /// 完成展示一段时间后将进度条归零（链接保留）
    pub fn clear_progress(&self) -> Self {
        if self.phase != UploadPhase::Completed {
            return self.clone();
        }
        Self {
            percent: 0,
            ..self.clone()
        }
    }

    /// 重置到初始状态
    pub fn reset(&self) -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected() -> SelectedFile {
        SelectedFile::new("/tmp/photo.jpg", 1024)
    }

    #[test]
    fn test_select_file_populates_metadata() {
        let snapshot = UploadSnapshot::idle().select_file(selected()).unwrap();
        let file = snapshot.file.unwrap();
        assert_eq!(file.name, "photo.jpg");
        assert_eq!(file.mime_type, "image/jpeg");
        assert!(file.is_image());
    }

    #[test]
    fn test_reject_while_uploading() {
        let uploading = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap();

        assert_eq!(
            uploading.begin_upload().unwrap_err(),
            StateError::TransferInFlight
        );
        assert_eq!(
            uploading.select_file(selected()).unwrap_err(),
            StateError::TransferInFlight
        );
    }

    #[test]
    fn test_begin_upload_requires_file() {
        assert_eq!(
            UploadSnapshot::idle().begin_upload().unwrap_err(),
            StateError::NoFileSelected
        );
    }

    #[test]
    fn test_progress_monotonic_and_capped() {
        let mut snapshot = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap();

        snapshot = snapshot.progress(512, 1024);
        assert_eq!(snapshot.percent, 50);

        // 进度回退被忽略
        snapshot = snapshot.progress(256, 1024);
        assert_eq!(snapshot.percent, 50);

        // 字节数到达总量时仍然封顶在 99
        snapshot = snapshot.progress(1024, 1024);
        assert_eq!(snapshot.percent, 99);
    }

    #[test]
    fn test_complete_sets_full_progress_and_link() {
        let snapshot = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap()
            .complete("http://host/uploads/x.jpg");

        assert_eq!(snapshot.phase, UploadPhase::Completed);
        assert_eq!(snapshot.percent, 100);
        assert_eq!(snapshot.link.as_deref(), Some("http://host/uploads/x.jpg"));
    }

    #[test]
    fn test_fail_zeroes_progress() {
        let snapshot = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap()
            .progress(512, 1024)
            .fail("Network error");

        assert_eq!(snapshot.phase, UploadPhase::Failed);
        assert_eq!(snapshot.percent, 0);
        assert!(snapshot.link.is_none());
        assert_eq!(snapshot.error.as_deref(), Some("Network error"));
    }

    #[test]
    fn test_clear_progress_only_when_completed() {
        let completed = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap()
            .complete("http://host/uploads/x.jpg");

        let cleared = completed.clear_progress();
        assert_eq!(cleared.percent, 0);
        // 链接保留
        assert_eq!(cleared.link, completed.link);

        let uploading = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap()
            .progress(10, 100);
        assert_eq!(uploading.clear_progress(), uploading);
    }

    #[test]
    fn test_stale_events_after_reset_are_ignored() {
        let uploading = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap();
        let reset = uploading.reset();

        // 重置后迟到的完成/失败事件不改变状态
        let after_complete = reset.complete("http://host/uploads/x.jpg");
        assert_eq!(after_complete.phase, UploadPhase::Idle);
        assert!(after_complete.link.is_none());

        let after_fail = reset.fail("late error");
        assert_eq!(after_fail.phase, UploadPhase::Idle);
        assert!(after_fail.error.is_none());
    }

    #[test]
    fn test_reset_from_any_phase() {
        let completed = UploadSnapshot::idle()
            .select_file(selected())
            .unwrap()
            .begin_upload()
            .unwrap()
            .complete("http://host/uploads/x.jpg");

        let reset = completed.reset();
        assert_eq!(reset.phase, UploadPhase::Idle);
        assert!(reset.file.is_none());
        assert_eq!(reset.percent, 0);
        assert!(reset.link.is_none());
        assert!(reset.error.is_none());
    }
}
