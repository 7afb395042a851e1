//! # 图片句柄
//!
//! `ImageSource` 是解码完成后的只读句柄，自然尺寸在构造时固定。
//! 替换图片时整体替换句柄，不会原地修改像素。

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::error::CompareError;
use crate::layout::Dimensions;

/// 像素数据是否允许读取。
///
/// 被污染（跨域）的图片仍然可以绘制，但不能逐像素读取，
/// 因而无法参与差异计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelAccess {
    Readable,
    Tainted,
}

/// 解码后的图片句柄。
///
/// 内部使用 `Arc` 共享像素，克隆句柄不会复制图片。
#[derive(Clone)]
pub struct ImageSource {
    pixels: Arc<RgbaImage>,
    access: PixelAccess,
}

impl ImageSource {
    /// 由 RGBA 像素构造句柄，任一维度为 0 视为尚未就绪。
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, CompareError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CompareError::SourceNotReady(format!(
                "图片尺寸为 {}x{}",
                pixels.width(),
                pixels.height()
            )));
        }

        Ok(Self {
            pixels: Arc::new(pixels),
            access: PixelAccess::Readable,
        })
    }

    /// 标记为跨域污染：可绘制、不可读取。
    pub fn into_tainted(self) -> Self {
        Self {
            access: PixelAccess::Tainted,
            ..self
        }
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.natural_width(), self.natural_height())
    }

    pub fn access(&self) -> PixelAccess {
        self.access
    }

    /// 供绘制使用的像素，不受可读性限制。
    pub fn drawable(&self) -> &RgbaImage {
        &self.pixels
    }

    /// 逐像素读取；被污染的图片返回 `PixelAccessDenied`。
    pub fn read_pixels(&self) -> Result<&RgbaImage, CompareError> {
        match self.access {
            PixelAccess::Readable => Ok(&self.pixels),
            PixelAccess::Tainted => Err(CompareError::PixelAccessDenied(format!(
                "{}x{} 图片受跨域限制",
                self.natural_width(),
                self.natural_height()
            ))),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("width", &self.natural_width())
            .field("height", &self.natural_height())
            .field("access", &self.access)
            .finish()
    }
}
