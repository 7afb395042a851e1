//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `CompareConfig`，保证布局、差异、导出的行为可观测、可调整、可测试。
//! 其中预览档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供与网页版一致的常量（实际尺寸 1200px、自定义默认 800px、阈值 30 等）。
//! - `#[serde(default)]` 允许配置文件只写需要覆盖的字段。
//! - `PreviewProfile` 负责档位字符串解析与反向输出。
//! - `apply_preview_profile` / `infer_preview_profile` 与档位双向映射。

use std::path::Path;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::diff::DiffStyle;
use crate::error::CompareError;

/// 重采样滤镜。
///
/// 同时映射到 `image` 与 `fast_image_resize` 的滤镜枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// 对比引擎配置。
///
/// 字段覆盖了布局、差异高亮、解码限制与导出四个阶段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// `actual` 尺寸策略下的固定显示宽度（像素）。
    pub actual_width: f64,
    /// `custom` 宽度缺失或非法时的替代值（像素）。
    pub default_custom_width: f64,
    /// 导出并排模式时两列之间的间隔（像素）。交互显示不加间隔。
    pub export_gap: u32,
    /// 交互预览时差异计算的最长边上限；`None` 表示按容器全尺寸计算。
    pub preview_max_dimension: Option<u32>,
    /// 单通道差异阈值（0-255），严格大于才视为变化。
    pub diff_threshold: u8,
    /// 差异高亮颜色（RGB）。
    pub diff_highlight: [u8; 3],
    /// 差异高亮透明度（0-255）。
    pub diff_alpha: u8,
    /// 未设置背景色时使用的默认背景。
    pub default_background: String,
    /// 读取原始字节时允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 导出表面的像素上限，超过即视为导出失败。
    pub max_export_pixels: u64,
    /// 图层缩放使用的滤镜。
    pub resize_filter: ResampleFilter,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            actual_width: 1200.0,
            default_custom_width: 800.0,
            export_gap: 16,
            preview_max_dimension: Some(800),
            diff_threshold: 30,
            diff_highlight: [255, 0, 255],
            diff_alpha: 200,
            default_background: "#0d1117".to_string(),
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_export_pixels: 120_000_000,
            resize_filter: ResampleFilter::Triangle,
        }
    }
}

/// 预览性能档位（面向用户语义）。
///
/// - `Quality`：差异按容器全尺寸计算
/// - `Balanced`：最长边 800px
/// - `Speed`：最长边 480px，最近邻缩放
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewProfile {
    Quality,
    Balanced,
    Speed,
}

impl PreviewProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use swipe_compare::config::PreviewProfile;
    ///
    /// let p = PreviewProfile::from_str("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), swipe_compare::error::CompareError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, CompareError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(CompareError::Config(format!(
                "未知预览档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串，供前端展示与持久化。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl CompareConfig {
    /// 从 JSON 字符串加载配置，缺失字段保持默认值。
    pub fn from_json_str(content: &str) -> Result<Self, CompareError> {
        serde_json::from_str(content)
            .map_err(|e| CompareError::Config(format!("解析配置失败: {}", e)))
    }

    /// 从 JSON 文件加载配置。
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CompareError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        log::info!("⚙️ 已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 当前配置对应的差异高亮样式。
    pub fn diff_style(&self) -> DiffStyle {
        DiffStyle {
            threshold: self.diff_threshold,
            highlight: self.diff_highlight,
            alpha: self.diff_alpha,
        }
    }

    /// 基于当前参数反推预览档位。
    pub fn infer_preview_profile(&self) -> PreviewProfile {
        match self.preview_max_dimension {
            None => PreviewProfile::Quality,
            Some(max) if max <= 480 => PreviewProfile::Speed,
            Some(_) => PreviewProfile::Balanced,
        }
    }

    /// 应用指定预览档位到实际参数。
    pub fn apply_preview_profile(&mut self, profile: PreviewProfile) {
        match profile {
            PreviewProfile::Quality => {
                self.preview_max_dimension = None;
                self.resize_filter = ResampleFilter::CatmullRom;
            }
            PreviewProfile::Balanced => {
                self.preview_max_dimension = Some(800);
                self.resize_filter = ResampleFilter::Triangle;
            }
            PreviewProfile::Speed => {
                self.preview_max_dimension = Some(480);
                self.resize_filter = ResampleFilter::Nearest;
            }
        }

        log::info!(
            "⚙️ 已切换预览档位：{:?}（preview_max_dimension={:?}, filter={:?}）",
            profile,
            self.preview_max_dimension,
            self.resize_filter
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CompareConfig::from_json_str(r#"{ "actual_width": 1600, "export_gap": 0 }"#)
            .unwrap();
        assert_eq!(config.actual_width, 1600.0);
        assert_eq!(config.export_gap, 0);
        assert_eq!(config.diff_threshold, 30);
        assert_eq!(config.default_background, "#0d1117");
    }

    #[test]
    fn malformed_json_is_config_error() {
        let result = CompareConfig::from_json_str("{ nope");
        assert!(matches!(result, Err(CompareError::Config(_))));
    }

    #[test]
    fn profiles_round_trip_through_inference() {
        let mut config = CompareConfig::default();
        for profile in [PreviewProfile::Quality, PreviewProfile::Speed, PreviewProfile::Balanced] {
            config.apply_preview_profile(profile);
            assert_eq!(config.infer_preview_profile(), profile);
        }
    }

    #[test]
    fn unknown_profile_is_rejected() {
        assert!(PreviewProfile::from_str("ultra").is_err());
        assert_eq!(PreviewProfile::from_str(" SPEED ").unwrap(), PreviewProfile::Speed);
    }

    #[test]
    fn filter_deserializes_snake_case() {
        let config = CompareConfig::from_json_str(r#"{ "resize_filter": "catmull_rom" }"#).unwrap();
        assert_eq!(config.resize_filter, ResampleFilter::CatmullRom);
    }
}
