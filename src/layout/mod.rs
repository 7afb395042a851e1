//! 布局模块（两图共享坐标空间的几何计算）
//!
//! 该模块负责把两张自然尺寸不同的图片放进同一个容器：
//! - 非并排模式：两图共用一个缩放比，容器等于较大图缩放后的占位
//! - 并排模式：每列独立缩放（`Fit`）或保持自然尺寸
//! - 导出：按自然分辨率重新套用同一套公式
//!
//! # 设计思路
//!
//! 1. **纯函数**：输入自然尺寸与策略，输出唯一几何结果，无隐藏状态，可重复调用。
//! 2. **单一实现**：交互视图与导出共用 `calculation` 中的公式，避免两处漂移。
//! 3. **只在最后取整**：缩放比保持浮点，只对最终像素尺寸做四舍五入（half-up）。
//!
//! # 重新计算时机
//!
//! 由调用方负责：图片解码完成、尺寸策略变化、自定义宽度变化、视图模式变化、
//! 以及 `Fit` 策略下视口尺寸变化。见 `view::ComparisonView`。

pub mod calculation;

use serde::{Deserialize, Serialize};

use crate::model::{SizingPolicy, ViewMode};

pub use calculation::{
    compute_export_geometry, compute_geometry, resolve_display_width, round_half_up,
    validate_custom_width,
};

/// 图片自然尺寸（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 单张图片在容器中的位置与显示尺寸。
///
/// `x` 为所在列的偏移；非并排模式下两图都左上对齐，偏移为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 布局结果。每次按需重新计算，不做持久化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub container_width: u32,
    pub container_height: u32,
    pub before: Placement,
    pub after: Placement,
}

impl Geometry {
    pub fn container(&self) -> Dimensions {
        Dimensions::new(self.container_width, self.container_height)
    }

    /// 以 JSON 输出的布局描述，供非像素渲染端使用。
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// 布局请求参数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub view_mode: ViewMode,
    pub sizing: SizingPolicy,
    /// 自定义宽度；缺失或非法时使用配置中的默认值。
    pub custom_width: Option<f64>,
    /// 可用宽度（视口/容器），仅 `Fit` 策略需要。
    pub available_width: Option<f64>,
    /// 并排模式两列之间的间隔，交互显示为 0。
    pub gap: u32,
}

impl LayoutRequest {
    pub fn new(view_mode: ViewMode, sizing: SizingPolicy) -> Self {
        Self {
            view_mode,
            sizing,
            custom_width: None,
            available_width: None,
            gap: 0,
        }
    }

    pub fn with_custom_width(mut self, width: Option<f64>) -> Self {
        self.custom_width = width;
        self
    }

    pub fn with_available_width(mut self, width: Option<f64>) -> Self {
        self.available_width = width;
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }
}
