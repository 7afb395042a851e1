//! # 输出画布
//!
//! `Surface` 是每次渲染/导出新建的像素缓冲，不与交互状态共享任何字段。
//! 缓冲通过 `try_reserve_exact` 申请，超大尺寸得到 `ExportFailure` 而不是进程中止。

use image::{Rgba, RgbaImage};

use crate::error::CompareError;
use crate::layout::round_half_up;
use crate::model::SplitPosition;

/// 画布坐标系下的裁剪矩形，`[x0, x1) × [y0, y1)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl ClipRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    /// 分割线左侧区域：列号 `< column`。
    pub fn left_of(column: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: column,
            y1: height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// 分割位置对应的像素列：`round_half_up(width * split / 100)`，不超过 `width`。
pub fn split_column(width: u32, split: SplitPosition) -> u32 {
    round_half_up(width as f64 * split.percent() / 100.0).min(width)
}

pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// 申请 `width × height` 的透明画布。
    pub fn new(width: u32, height: u32) -> Result<Self, CompareError> {
        if width == 0 || height == 0 {
            return Err(CompareError::ExportFailure(format!(
                "画布尺寸无效：{}x{}",
                width, height
            )));
        }

        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| CompareError::ExportFailure("画布字节数溢出".to_string()))?;

        let mut buffer: Vec<u8> = Vec::new();
        buffer.try_reserve_exact(len).map_err(|e| {
            CompareError::ExportFailure(format!("画布内存申请失败（{}x{}）：{}", width, height, e))
        })?;
        buffer.resize(len, 0);

        let image = RgbaImage::from_raw(width, height, buffer)
            .ok_or_else(|| CompareError::ExportFailure("画布缓冲长度异常".to_string()))?;
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    /// 把图层左上角放在 `(x, y)`，只在 `clip` 内按 `alpha` 做 source-over 混合。
    pub fn draw_layer(&mut self, layer: &RgbaImage, x: u32, y: u32, clip: ClipRect, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }

        let x_start = x.max(clip.x0);
        let y_start = y.max(clip.y0);
        let x_end = x.saturating_add(layer.width()).min(clip.x1).min(self.width());
        let y_end = y.saturating_add(layer.height()).min(clip.y1).min(self.height());
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        for dy in y_start..y_end {
            for dx in x_start..x_end {
                let src = layer.get_pixel(dx - x, dy - y);
                let dst = self.image.get_pixel_mut(dx, dy);
                blend_over(dst, src, alpha);
            }
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// 非预乘 alpha 的 source-over 混合。源完全不透明时直接覆盖，结果与源像素一致。
fn blend_over(dst: &mut Rgba<u8>, src: &Rgba<u8>, alpha: f32) {
    let src_a = src[3] as f32 / 255.0 * alpha;
    if src_a <= 0.0 {
        return;
    }
    if src_a >= 1.0 {
        *dst = *src;
        return;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let value =
            (src[channel] as f32 * src_a + dst[channel] as f32 * dst_a * (1.0 - src_a)) / out_a;
        out[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}
