//! # 合成渲染
//!
//! ## 实现思路
//!
//! 一帧分两步完成：
//!
//! 1. `prepare_layers`：把两图重采样到各自的放置尺寸，`differences` 模式再算出容器尺寸的
//!    差异高亮。这一步只依赖图片、几何与模式，和分割位置无关。
//! 2. `compose`：在新画布上按分割位置裁剪、按透明度混合已准备好的图层。
//!
//! - `swipe` / `differences`：after 全尺寸绘制，before 裁剪到分割线左侧；
//!   `differences` 再把差异高亮裁剪到同一区域叠加在最上层。
//! - `stacked`：after 作为不透明底图，before 以 `opacity / 100` 绘制并裁剪到分割线左侧。
//! - `side-by-side`：两图按各自放置位置绘制。
//!
//! 图层只需要"可绘制"，不需要"可读取"；只有差异高亮需要逐像素读取，
//! 读取被拒绝时跳过高亮，合成照常完成。

use image::{Rgba, RgbaImage};

use super::surface::{ClipRect, Surface, split_column};
use crate::config::{CompareConfig, ResampleFilter};
use crate::diff::{DiffStyle, diff_overlay, preview_dimensions};
use crate::error::CompareError;
use crate::layout::Geometry;
use crate::model::{SplitPosition, StackedOpacity, ViewMode};
use crate::source::{ImageSource, resample};

/// 差异高亮的计算分辨率。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffResolution {
    /// 不计算差异
    Skip,
    /// 按容器全分辨率计算（导出）
    Full,
    /// 先缩小到最长边 `max_dimension` 计算，再放大回容器尺寸（交互预览）
    Preview { max_dimension: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// 绘制前填充的背景色；`None` 时保持透明。
    pub background: Option<Rgba<u8>>,
    pub diff: DiffResolution,
    pub diff_style: DiffStyle,
    pub filter: ResampleFilter,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: None,
            diff: DiffResolution::Full,
            diff_style: DiffStyle::default(),
            filter: ResampleFilter::Triangle,
        }
    }
}

impl RenderOptions {
    /// 交互视图使用的选项：差异按预览尺寸计算。
    pub fn interactive(config: &CompareConfig, background: Option<Rgba<u8>>) -> Self {
        let diff = match config.preview_max_dimension {
            Some(max_dimension) => DiffResolution::Preview { max_dimension },
            None => DiffResolution::Full,
        };
        Self {
            background,
            diff,
            diff_style: config.diff_style(),
            filter: config.resize_filter,
        }
    }

    /// 导出使用的选项：差异按全分辨率计算。
    pub fn export(config: &CompareConfig, background: Option<Rgba<u8>>) -> Self {
        Self {
            background,
            diff: DiffResolution::Full,
            diff_style: config.diff_style(),
            filter: config.resize_filter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: RgbaImage,
    /// 差异高亮是否实际绘制（跨域污染或 `Skip` 时为 `false`）
    pub diff_applied: bool,
}

/// 与分割位置、透明度、背景无关的图层。
///
/// 图片、几何或模式不变时可以反复交给 `compose`，拖动分割线只付出裁剪合成的代价。
#[derive(Debug, Clone)]
pub struct PreparedLayers {
    before: RgbaImage,
    after: RgbaImage,
    /// 已放大到容器尺寸的差异高亮
    diff: Option<RgbaImage>,
}

impl PreparedLayers {
    pub fn has_diff(&self) -> bool {
        self.diff.is_some()
    }
}

/// 按几何结果合成一帧。
pub fn render(
    before: &ImageSource,
    after: &ImageSource,
    geometry: &Geometry,
    view_mode: ViewMode,
    split: SplitPosition,
    opacity: StackedOpacity,
    options: &RenderOptions,
) -> Result<RenderOutput, CompareError> {
    render_with_hooks(
        before,
        after,
        geometry,
        view_mode,
        split,
        opacity,
        options,
        || false,
    )
}

/// 带取消钩子的合成，每准备一个图层前检查一次。
#[allow(clippy::too_many_arguments)]
pub fn render_with_hooks<C>(
    before: &ImageSource,
    after: &ImageSource,
    geometry: &Geometry,
    view_mode: ViewMode,
    split: SplitPosition,
    opacity: StackedOpacity,
    options: &RenderOptions,
    is_cancelled: C,
) -> Result<RenderOutput, CompareError>
where
    C: Fn() -> bool,
{
    let layers = prepare_layers(before, after, geometry, view_mode, options, is_cancelled)?;
    compose(&layers, geometry, view_mode, split, opacity, options.background)
}

/// 重采样两图并按需计算差异高亮。
///
/// # 错误
/// - `Cancelled`：`is_cancelled` 在图层之间返回 `true`
///
/// 像素不可读（`PixelAccessDenied`）不算错误，只是不生成差异图层。
pub fn prepare_layers<C>(
    before: &ImageSource,
    after: &ImageSource,
    geometry: &Geometry,
    view_mode: ViewMode,
    options: &RenderOptions,
    is_cancelled: C,
) -> Result<PreparedLayers, CompareError>
where
    C: Fn() -> bool,
{
    check_cancelled(&is_cancelled)?;
    let after_layer = resample(
        after.drawable(),
        geometry.after.width,
        geometry.after.height,
        options.filter,
    )
    .into_owned();
    check_cancelled(&is_cancelled)?;
    let before_layer = resample(
        before.drawable(),
        geometry.before.width,
        geometry.before.height,
        options.filter,
    )
    .into_owned();

    let diff = if view_mode == ViewMode::Differences {
        check_cancelled(&is_cancelled)?;
        diff_layer(before, after, geometry, options)?
    } else {
        None
    };

    Ok(PreparedLayers {
        before: before_layer,
        after: after_layer,
        diff,
    })
}

/// 把准备好的图层按分割位置与透明度合成到新画布。
pub fn compose(
    layers: &PreparedLayers,
    geometry: &Geometry,
    view_mode: ViewMode,
    split: SplitPosition,
    opacity: StackedOpacity,
    background: Option<Rgba<u8>>,
) -> Result<RenderOutput, CompareError> {
    let width = geometry.container_width;
    let height = geometry.container_height;
    let mut surface = Surface::new(width, height)?;
    if let Some(background) = background {
        surface.fill(background);
    }

    let full = ClipRect::full(width, height);
    let (bx, by) = (geometry.before.x, geometry.before.y);
    let (ax, ay) = (geometry.after.x, geometry.after.y);
    let mut diff_applied = false;

    match view_mode {
        ViewMode::SideBySide => {
            surface.draw_layer(&layers.before, bx, by, full, 1.0);
            surface.draw_layer(&layers.after, ax, ay, full, 1.0);
        }
        ViewMode::Swipe | ViewMode::Differences | ViewMode::Stacked => {
            let left = ClipRect::left_of(split_column(width, split), height);
            let before_alpha = match view_mode {
                ViewMode::Stacked => opacity.alpha(),
                _ => 1.0,
            };

            surface.draw_layer(&layers.after, ax, ay, full, 1.0);
            if !left.is_empty() {
                surface.draw_layer(&layers.before, bx, by, left, before_alpha);
            }

            if view_mode == ViewMode::Differences {
                if let Some(diff) = &layers.diff {
                    if !left.is_empty() {
                        surface.draw_layer(diff, 0, 0, left, 1.0);
                    }
                    diff_applied = true;
                }
            }
        }
    }

    Ok(RenderOutput {
        image: surface.into_image(),
        diff_applied,
    })
}

/// 计算容器尺寸的差异图层。像素不可读时记录日志并返回 `None`。
fn diff_layer(
    before: &ImageSource,
    after: &ImageSource,
    geometry: &Geometry,
    options: &RenderOptions,
) -> Result<Option<RgbaImage>, CompareError> {
    let (width, height) = (geometry.container_width, geometry.container_height);
    let (diff_width, diff_height) = match options.diff {
        DiffResolution::Skip => return Ok(None),
        DiffResolution::Full => (width, height),
        DiffResolution::Preview { max_dimension } => {
            preview_dimensions(width, height, max_dimension)
        }
    };

    let diff = match diff_overlay(
        before,
        after,
        diff_width,
        diff_height,
        options.diff_style,
        options.filter,
    ) {
        Ok(diff) => diff,
        Err(CompareError::PixelAccessDenied(reason)) => {
            log::warn!("⚠️ 跳过差异高亮：{}", reason);
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    if diff.dimensions() == (width, height) {
        return Ok(Some(diff));
    }
    Ok(Some(resample(&diff, width, height, options.filter).into_owned()))
}

fn check_cancelled<C: Fn() -> bool>(is_cancelled: &C) -> Result<(), CompareError> {
    if is_cancelled() {
        return Err(CompareError::Cancelled("渲染已取消".to_string()));
    }
    Ok(())
}
