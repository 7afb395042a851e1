//! 布局计算模块
//!
//! 该模块实现两图共享坐标空间的核心几何算法，提供两种布局：
//!
//! 1. **共享缩放** (`swipe` / `differences` / `stacked`)：
//!    `baseW = max(w1, w2)`、`baseH = max(h1, h2)`，按尺寸策略得到显示宽度，
//!    `scale = displayW / baseW`，两图使用同一个缩放比，左上对齐。
//!
//! 2. **并排** (`side-by-side`)：
//!    `Fit` 时每列宽 `availableWidth / 2`，两图各自缩放；其他策略保持自然尺寸。
//!
//! # 设计思路
//!
//! - 算法纯函数化：输入为自然尺寸与请求参数，输出唯一几何结果，便于测试。
//! - 缩放比不单独取整，统一按 `round_half_up(dim * displayW / baseW)` 计算最终像素尺寸，
//!   交互视图与导出得到完全一致的像素尺寸。
//! - 对异常输入（零尺寸）返回 `SourceNotReady`；对非法宽度给出安全回退，不让渲染失败。

use super::{Dimensions, Geometry, LayoutRequest, Placement};
use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::model::{SizingPolicy, ViewMode};

/// 四舍五入（half-up）：`floor(v + 0.5)`，结果收敛到 `u32` 范围。
pub fn round_half_up(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor().min(u32::MAX as f64) as u32
}

/// 按尺寸策略解析显示宽度（未取整）。
///
/// # 回退规则
/// - `Fit` 缺少可用宽度 → 使用 `baseW`
/// - `Custom` 宽度缺失、非正数、NaN 或取整后为 0 → `default_custom_width`
pub fn resolve_display_width(
    sizing: SizingPolicy,
    base_width: u32,
    request: &LayoutRequest,
    config: &CompareConfig,
) -> f64 {
    match sizing {
        SizingPolicy::Images => base_width as f64,
        SizingPolicy::Actual => config.actual_width,
        SizingPolicy::Fit => match usable_width(request.available_width) {
            Some(width) => width,
            None => {
                log::warn!("⚠️ fit 策略缺少可用宽度，回退到图片自然宽度 {}", base_width);
                base_width as f64
            }
        },
        SizingPolicy::Custom => match validate_custom_width(request.custom_width) {
            Ok(width) => width,
            Err(err) => {
                log::debug!("{}，使用默认值 {}", err, config.default_custom_width);
                config.default_custom_width
            }
        },
    }
}

/// 校验自定义显示宽度：必须是有限正数，且取整后至少 1 像素。
pub fn validate_custom_width(value: Option<f64>) -> Result<f64, CompareError> {
    usable_width(value).ok_or_else(|| {
        CompareError::InvalidDimensionInput(format!("自定义宽度无效（{:?}）", value))
    })
}

/// 计算交互视图的布局。
///
/// # 参数
/// * `before` / `after` - 两图自然尺寸
/// * `request`          - 视图模式、尺寸策略、可用宽度与列间隔
/// * `config`           - 提供 `actual_width` 与自定义宽度默认值
///
/// # 返回
/// 容器尺寸与两图的放置位置；任一图片尺寸为 0 时返回 `SourceNotReady`。
pub fn compute_geometry(
    before: Dimensions,
    after: Dimensions,
    request: &LayoutRequest,
    config: &CompareConfig,
) -> Result<Geometry, CompareError> {
    ensure_ready(before, "before")?;
    ensure_ready(after, "after")?;

    let geometry = match request.view_mode {
        ViewMode::SideBySide => side_by_side(before, after, request),
        _ => shared_scale(before, after, request, config),
    };

    log::debug!(
        "📐 布局计算完成 - 模式: {} 策略: {} 容器: {}x{}",
        request.view_mode.as_str(),
        request.sizing.as_str(),
        geometry.container_width,
        geometry.container_height
    );

    Ok(geometry)
}

/// 计算导出布局：按自然分辨率重新套用同一套公式。
///
/// 非并排模式固定使用 `baseW × baseH`（缩放比为 1），与交互缩放无关；
/// 并排模式保留交互策略（`Fit` 仍按视口宽度），列间隔取 `export_gap`。
pub fn compute_export_geometry(
    before: Dimensions,
    after: Dimensions,
    view_mode: ViewMode,
    sizing: SizingPolicy,
    available_width: Option<f64>,
    config: &CompareConfig,
) -> Result<Geometry, CompareError> {
    let request = match view_mode {
        ViewMode::SideBySide => LayoutRequest::new(view_mode, sizing)
            .with_available_width(available_width)
            .with_gap(config.export_gap),
        _ => LayoutRequest::new(view_mode, SizingPolicy::Images),
    };
    compute_geometry(before, after, &request, config)
}

fn shared_scale(
    before: Dimensions,
    after: Dimensions,
    request: &LayoutRequest,
    config: &CompareConfig,
) -> Geometry {
    let base_width = before.width.max(after.width);
    let base_height = before.height.max(after.height);

    let display_width = resolve_display_width(request.sizing, base_width, request, config);
    let base = base_width as f64;

    Geometry {
        container_width: round_half_up(display_width),
        container_height: scale_dimension(base_height, display_width, base),
        before: scaled(before, display_width, base),
        after: scaled(after, display_width, base),
    }
}

fn side_by_side(before: Dimensions, after: Dimensions, request: &LayoutRequest) -> Geometry {
    let column_width = match request.sizing {
        SizingPolicy::Fit => {
            let available = usable_width(request.available_width);
            if available.is_none() {
                log::warn!("⚠️ 并排 fit 缺少可用宽度，按自然尺寸排列");
            }
            available.map(|width| width / 2.0)
        }
        _ => None,
    };

    let (before_placement, after_width, after_height) = match column_width {
        Some(column) => {
            let after_base = after.width as f64;
            (
                scaled(before, column, before.width as f64),
                scale_dimension(after.width, column, after_base),
                scale_dimension(after.height, column, after_base),
            )
        }
        None => (
            Placement {
                x: 0,
                y: 0,
                width: before.width,
                height: before.height,
            },
            after.width,
            after.height,
        ),
    };

    let after_x = before_placement.width.saturating_add(request.gap);
    let after_placement = Placement {
        x: after_x,
        y: 0,
        width: after_width,
        height: after_height,
    };

    Geometry {
        container_width: after_x.saturating_add(after_width),
        container_height: before_placement.height.max(after_height),
        before: before_placement,
        after: after_placement,
    }
}

/// 左上对齐的放置，缩放比为 `target / base`。
fn scaled(dimensions: Dimensions, target: f64, base: f64) -> Placement {
    Placement {
        x: 0,
        y: 0,
        width: scale_dimension(dimensions.width, target, base),
        height: scale_dimension(dimensions.height, target, base),
    }
}

/// `round_half_up(value * target / base)`，先乘后除，不单独求缩放比。
fn scale_dimension(value: u32, target: f64, base: f64) -> u32 {
    round_half_up(value as f64 * target / base)
}

fn usable_width(value: Option<f64>) -> Option<f64> {
    value.filter(|v| round_half_up(*v) > 0)
}

fn ensure_ready(dimensions: Dimensions, side: &str) -> Result<(), CompareError> {
    if dimensions.is_empty() {
        return Err(CompareError::SourceNotReady(format!(
            "{} 图片尺寸未知（{}x{}）",
            side, dimensions.width, dimensions.height
        )));
    }
    Ok(())
}
