//! # 解码与重采样流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! 重采样同样集中在这里：交互绘制、差异预览与导出都通过 `resample`
//! 把图层缩放到布局给出的像素尺寸，保证各条路径使用同一实现。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码并转换 RGBA
//! 4. 缩放优先走 `fast_image_resize`，失败时回退 `image::imageops::resize`

use std::borrow::Cow;
use std::io::Cursor;

use fast_image_resize as fr;
use image::{ImageBuffer, RgbaImage};

use super::loader::RawImageData;
use super::ImageSource;
use crate::config::{CompareConfig, ResampleFilter};
use crate::error::CompareError;

/// 将原始字节解码为图片句柄。
pub(crate) fn decode(
    raw: RawImageData,
    config: &CompareConfig,
) -> Result<ImageSource, CompareError> {
    let (header_width, header_height) = inspect_dimensions(&raw.bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|e| CompareError::Decode(format!("图片解码失败：{}", e)))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    validate_pixel_limits(config, width, height)?;

    log::info!(
        "✅ 图片解码成功 - 来源: {} 尺寸: {}x{}",
        raw.source_hint,
        width,
        height
    );

    ImageSource::from_rgba(rgba)
}

/// 仅通过内存中的图片头信息读取宽高。
///
/// 用于在完整解码前做像素限制检查，也可供只需要布局信息的调用方使用。
pub fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), CompareError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CompareError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| CompareError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

/// 校验像素数量是否超过配置上限。
fn validate_pixel_limits(
    config: &CompareConfig,
    width: u32,
    height: u32,
) -> Result<(), CompareError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| CompareError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(CompareError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

/// 将图层缩放到目标尺寸。
///
/// 尺寸一致时直接借用原图，不产生拷贝。目标尺寸为 0 时返回空图。
pub fn resample<'a>(
    source: &'a RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: ResampleFilter,
) -> Cow<'a, RgbaImage> {
    if source.dimensions() == (target_width, target_height) {
        return Cow::Borrowed(source);
    }

    if target_width == 0 || target_height == 0 {
        return Cow::Owned(RgbaImage::new(target_width, target_height));
    }

    match resize_with_fast_image_resize(source, target_width, target_height, filter) {
        Ok(resized) => Cow::Owned(resized),
        Err(err) => {
            log::warn!(
                "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}",
                err
            );
            Cow::Owned(image::imageops::resize(
                source,
                target_width,
                target_height,
                filter.to_image_filter(),
            ))
        }
    }
}

fn resize_with_fast_image_resize(
    source: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: ResampleFilter,
) -> Result<RgbaImage, CompareError> {
    let (src_width, src_height) = source.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        source.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| CompareError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(to_fast_alg(filter));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| CompareError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| CompareError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_alg(filter: ResampleFilter) -> fr::ResizeAlg {
    match filter {
        ResampleFilter::Nearest => fr::ResizeAlg::Nearest,
        ResampleFilter::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
        ResampleFilter::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
        ResampleFilter::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
        ResampleFilter::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
    }
}
