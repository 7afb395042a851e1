//! # 导出
//!
//! 导出按自然分辨率重新计算布局（见 `layout::compute_export_geometry`），
//! 差异高亮按全分辨率计算，输出写入全新画布，不修改任何交互状态，
//! 因此调用方可以在任意时刻放弃一次进行中的导出。

use std::io::Cursor;
use std::time::Instant;

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, Rgba, RgbaImage};

use super::compose::{RenderOptions, render_with_hooks};
use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::layout::compute_export_geometry;
use crate::model::{
    DisplaySettings, SizingPolicy, SplitPosition, StackedOpacity, ViewMode, effective_background,
};
use crate::source::ImageSource;

/// 一次导出的参数快照。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRequest {
    pub view_mode: ViewMode,
    pub sizing: SizingPolicy,
    /// 仅并排 `Fit` 使用，对应导出时屏幕上的可用宽度。
    pub available_width: Option<f64>,
    pub split: SplitPosition,
    pub opacity: StackedOpacity,
    pub background: Option<Rgba<u8>>,
}

impl ExportRequest {
    /// 从显示配置构造导出请求，背景色按默认值回退。
    pub fn from_settings(
        settings: &DisplaySettings,
        available_width: Option<f64>,
        config: &CompareConfig,
    ) -> Self {
        Self {
            view_mode: settings.view_mode,
            sizing: settings.sizing,
            available_width,
            split: settings.split_position,
            opacity: settings.stacked_opacity,
            background: Some(effective_background(
                settings.background.as_deref(),
                &config.default_background,
            )),
        }
    }
}

/// 按自然分辨率导出合成结果。
///
/// # 错误
/// - `SourceNotReady`：任一图片尺寸为 0
/// - `ExportFailure`：像素数超过 `max_export_pixels` 或画布申请失败
/// - `Cancelled`：`is_cancelled` 在图层之间返回 `true`
pub fn export_comparison<C>(
    before: &ImageSource,
    after: &ImageSource,
    request: &ExportRequest,
    config: &CompareConfig,
    is_cancelled: C,
) -> Result<RgbaImage, CompareError>
where
    C: Fn() -> bool,
{
    let started = Instant::now();
    let geometry = compute_export_geometry(
        before.dimensions(),
        after.dimensions(),
        request.view_mode,
        request.sizing,
        request.available_width,
        config,
    )?;

    let pixels = geometry.container_width as u64 * geometry.container_height as u64;
    if pixels > config.max_export_pixels {
        return Err(CompareError::ExportFailure(format!(
            "导出尺寸过大：{}x{}（限制：{} 像素）",
            geometry.container_width, geometry.container_height, config.max_export_pixels
        )));
    }

    log::info!(
        "📤 开始导出 - 模式: {} 尺寸: {}x{}",
        request.view_mode.as_str(),
        geometry.container_width,
        geometry.container_height
    );

    let options = RenderOptions::export(config, request.background);
    let output = render_with_hooks(
        before,
        after,
        &geometry,
        request.view_mode,
        request.split,
        request.opacity,
        &options,
        is_cancelled,
    )?;

    log::info!(
        "✅ 导出完成 - 差异高亮: {} 耗时: {:?}",
        output.diff_applied,
        started.elapsed()
    );
    Ok(output.image)
}

/// 编码为 PNG 字节。
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CompareError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CompareError::ExportFailure(format!("PNG 编码失败：{}", e)))?;
    Ok(out.into_inner())
}

/// 编码为 `data:image/png;base64,...`。
pub fn to_png_data_url(image: &RgbaImage) -> Result<String, CompareError> {
    let bytes = encode_png(image)?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(bytes)
    ))
}
