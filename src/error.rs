//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `CompareError` 枚举，布局、差异、拖拽、合成与导出
//! 各环节都返回 `Result<T, CompareError>`，调用方按分支匹配即可决定策略。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于通过 IPC / JSON 交给前端。
//!
//! # 错误策略
//!
//! | 变体 | 策略 |
//! |------|------|
//! | `SourceNotReady` | 等待图片就绪通知后重试，不提示用户 |
//! | `PixelAccessDenied` | 跳过差异计算，裁剪合成照常进行 |
//! | `InvalidDimensionInput` | 静默替换为默认宽度（800） |
//! | `ExportFailure` | 以“导出失败”提示用户，不产生任何部分输出 |

use serde::Serialize;

/// 对比引擎统一错误类型
///
/// 所有错误都只影响单次渲染/导出尝试，不会让交互会话失效。
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// 图片尚未解码完成，尺寸未知
    #[error("图片尚未就绪：{0}")]
    SourceNotReady(String),

    /// 像素数据不可读（跨域污染等）
    #[error("像素数据不可读：{0}")]
    PixelAccessDenied(String),

    /// 自定义宽度非法（非正数或非数字）
    #[error("尺寸参数非法：{0}")]
    InvalidDimensionInput(String),

    /// 导出表面创建失败（资源耗尽等）
    #[error("导出失败：{0}")]
    ExportFailure(String),

    /// 两个像素缓冲尺寸不一致
    #[error("像素缓冲尺寸不一致：期望 {}x{}，实际 {}x{}", expected.0, expected.1, actual.0, actual.1)]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("操作已取消：{0}")]
    Cancelled(String),

    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误：{0}")]
    Config(String),
}

impl CompareError {
    /// 稳定的错误码，供前端做分支展示。
    pub fn code(&self) -> &'static str {
        match self {
            Self::SourceNotReady(_) => "source_not_ready",
            Self::PixelAccessDenied(_) => "pixel_access_denied",
            Self::InvalidDimensionInput(_) => "invalid_dimension_input",
            Self::ExportFailure(_) => "export_failure",
            Self::SizeMismatch { .. } => "size_mismatch",
            Self::Decode(_) => "decode",
            Self::InvalidFormat(_) => "invalid_format",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Cancelled(_) => "cancelled",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for CompareError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
