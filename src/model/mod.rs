//! # 数据模型
//!
//! 视图模式、尺寸策略、分割位置、叠加透明度、背景色与对比记录。
//! 这些类型只承载数据与取值约束，不包含任何 I/O。

pub mod color;
pub mod position;
pub mod record;

use serde::{Deserialize, Serialize};

pub use color::{effective_background, normalize_hex, parse_hex_color};
pub use position::{SplitPosition, StackedOpacity};
pub use record::{ComparisonRecord, DisplaySettings};

/// 对比视图模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// 拖动分割线左右揭示前后两图
    #[default]
    Swipe,
    /// 在分割线左侧叠加像素差异高亮
    Differences,
    /// 按透明度叠加前图
    Stacked,
    /// 两图左右并排
    SideBySide,
}

impl ViewMode {
    /// 是否显示分割手柄（并排模式没有）。
    pub fn has_split_handle(self) -> bool {
        !matches!(self, Self::SideBySide)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Swipe => "swipe",
            Self::Differences => "differences",
            Self::Stacked => "stacked",
            Self::SideBySide => "side-by-side",
        }
    }
}

/// 显示宽度策略。
///
/// 除并排模式的 `Fit` 外，只作用于非并排模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingPolicy {
    /// 显示宽度等于较大图片的自然宽度（缩放比 1）
    #[default]
    Images,
    /// 固定常量宽度（默认 1200px）
    Actual,
    /// 跟随可用视口宽度
    #[serde(alias = "full")]
    Fit,
    /// 用户自定义宽度
    Custom,
}

impl SizingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Actual => "actual",
            Self::Fit => "fit",
            Self::Custom => "custom",
        }
    }

    /// 该策略是否依赖可用宽度（视口尺寸变化时需要重新布局）。
    ///
    /// 并排模式下同样只有 `Fit` 按视口缩放，其余策略都使用自然尺寸。
    pub fn needs_available_width(self) -> bool {
        matches!(self, Self::Fit)
    }
}

/// 前图 / 后图标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}
