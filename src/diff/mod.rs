//! 差异高亮模块
//!
//! # 设计思路
//!
//! 逐像素比较两张同尺寸图片的 RGB 三个通道，任一通道差的绝对值
//! **大于**阈值即视为变化，输出高亮色；否则输出 before 的 RGB、alpha 为 0，
//! 让下层图片透出来。输入的 alpha 通道不参与比较。
//!
//! 这是一个简单的逐通道阈值差分，不是感知或结构相似度指标。
//! 逐通道比较会改变可见结果，不要替换为欧氏距离等组合度量。
//!
//! # 实现思路
//!
//! - `compute_diff` 只接受已对齐尺寸的像素，纯函数，每次返回新缓冲。
//! - `diff_overlay` 负责把两张 `ImageSource` 拉伸到目标尺寸后再比较，
//!   交互预览可先经 `preview_dimensions` 缩小，导出则按全分辨率运行。

use std::borrow::Cow;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::config::ResampleFilter;
use crate::error::CompareError;
use crate::layout::round_half_up;
use crate::source::{ImageSource, resample};

/// 差异高亮样式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStyle {
    /// 单通道差异阈值（0-255），严格大于才算变化。
    pub threshold: u8,
    pub highlight: [u8; 3],
    pub alpha: u8,
}

impl Default for DiffStyle {
    fn default() -> Self {
        Self {
            threshold: 30,
            highlight: [255, 0, 255],
            alpha: 200,
        }
    }
}

impl DiffStyle {
    fn highlight_pixel(&self) -> Rgba<u8> {
        let [r, g, b] = self.highlight;
        Rgba([r, g, b, self.alpha])
    }

    fn is_changed(&self, before: &Rgba<u8>, after: &Rgba<u8>) -> bool {
        before.0[..3]
            .iter()
            .zip(&after.0[..3])
            .any(|(b, a)| b.abs_diff(*a) > self.threshold)
    }
}

/// 计算两张同尺寸图片的差异高亮缓冲。
///
/// # 返回
/// 与输入同尺寸的新缓冲；尺寸不一致时返回 `SizeMismatch`。
pub fn compute_diff(
    before: &RgbaImage,
    after: &RgbaImage,
    style: DiffStyle,
) -> Result<RgbaImage, CompareError> {
    if before.dimensions() != after.dimensions() {
        return Err(CompareError::SizeMismatch {
            expected: before.dimensions(),
            actual: after.dimensions(),
        });
    }

    let (width, height) = before.dimensions();
    let highlight = style.highlight_pixel();
    let mut output = RgbaImage::new(width, height);

    for ((out, b), a) in output.pixels_mut().zip(before.pixels()).zip(after.pixels()) {
        *out = if style.is_changed(b, a) {
            highlight
        } else {
            Rgba([b[0], b[1], b[2], 0])
        };
    }

    Ok(output)
}

/// 交互预览的差异计算尺寸：最长边不超过 `max_dimension`，不放大。
pub fn preview_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 || max_dimension == 0 {
        return (width, height);
    }

    let scale = (max_dimension as f64 / longest as f64).min(1.0);
    (
        round_half_up(width as f64 * scale).max(1),
        round_half_up(height as f64 * scale).max(1),
    )
}

/// 把两张图片拉伸到 `width × height` 后计算差异。
///
/// 任一图片不可读（跨域污染）时返回 `PixelAccessDenied`，由调用方决定跳过高亮。
pub fn diff_overlay(
    before: &ImageSource,
    after: &ImageSource,
    width: u32,
    height: u32,
    style: DiffStyle,
    filter: ResampleFilter,
) -> Result<RgbaImage, CompareError> {
    let before_pixels = before.read_pixels()?;
    let after_pixels = after.read_pixels()?;

    let before_layer: Cow<'_, RgbaImage> = resample(before_pixels, width, height, filter);
    let after_layer: Cow<'_, RgbaImage> = resample(after_pixels, width, height, filter);

    let diff = compute_diff(&before_layer, &after_layer, style)?;
    log::debug!(
        "🔍 差异计算完成 - 尺寸: {}x{} 变化像素: {}",
        width,
        height,
        count_changed(&diff)
    );
    Ok(diff)
}

/// 统计高亮像素数量（alpha 非 0 即为变化）。
pub fn count_changed(diff: &RgbaImage) -> usize {
    diff.pixels().filter(|p| p[3] != 0).count()
}
