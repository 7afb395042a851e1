//! # 对比记录模型
//!
//! ## 设计思路
//!
//! 记录由外部存储负责增删改查，引擎只把它当作纯数据读取：
//! 两个图片字节源（通常是 Data URL）加上显示配置。
//!
//! ## 实现思路
//!
//! - 字段名与网页版存储保持一致（camelCase）。
//! - `customWidthPx` 容忍数字或数字字符串，其他输入一律视为缺失，
//!   布局阶段再替换为默认宽度。
//! - `DisplaySettings` 是记录中“可被交互修改”的部分，会话持有它的副本。

use serde::{Deserialize, Deserializer, Serialize};

use super::{SizingPolicy, SplitPosition, StackedOpacity, ViewMode};
use crate::error::CompareError;

/// 对比记录（引擎输入）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 前图字节源（Data URL / Base64）。
    pub image_before: String,
    /// 后图字节源（Data URL / Base64）。
    pub image_after: String,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// 尺寸策略，沿用存储中的字段名 `swipeWidth`。
    #[serde(default)]
    pub swipe_width: SizingPolicy,
    #[serde(
        default,
        deserialize_with = "lenient_width",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_width_px: Option<f64>,
    #[serde(default)]
    pub stacked_opacity: StackedOpacity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub split_position: SplitPosition,
}

/// 会话中可被交互修改的显示配置。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub view_mode: ViewMode,
    pub sizing: SizingPolicy,
    pub custom_width: Option<f64>,
    pub stacked_opacity: StackedOpacity,
    pub background: Option<String>,
    pub split_position: SplitPosition,
}

impl ComparisonRecord {
    /// 从 JSON 文本解析记录。
    pub fn from_json(content: &str) -> Result<Self, CompareError> {
        serde_json::from_str(content)
            .map_err(|e| CompareError::InvalidFormat(format!("对比记录解析失败：{}", e)))
    }

    /// 提取显示配置快照。
    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            view_mode: self.view_mode,
            sizing: self.swipe_width,
            custom_width: self.custom_width_px,
            stacked_opacity: self.stacked_opacity,
            background: self.background_color.clone(),
            split_position: self.split_position,
        }
    }

    /// 将会话中修改过的配置写回记录（由外部存储负责持久化）。
    pub fn apply_settings(&mut self, settings: &DisplaySettings) {
        self.view_mode = settings.view_mode;
        self.swipe_width = settings.sizing;
        self.custom_width_px = settings.custom_width;
        self.stacked_opacity = settings.stacked_opacity;
        self.background_color = settings.background.clone();
        self.split_position = settings.split_position;
    }
}

/// 容忍数字 / 数字字符串 / null，其余值视为缺失。
fn lenient_width<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let width = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    if width.is_none() {
        log::debug!("customWidthPx 缺失或非数字，布局时使用默认宽度");
    }

    Ok(width.filter(|w| w.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{ "imageBefore": "data:image/png;base64,AAAA", "imageAfter": "data:image/png;base64,BBBB" }"#;

    #[test]
    fn minimal_record_uses_defaults() {
        let record = ComparisonRecord::from_json(MINIMAL).unwrap();
        assert_eq!(record.view_mode, ViewMode::Swipe);
        assert_eq!(record.swipe_width, SizingPolicy::Images);
        assert_eq!(record.custom_width_px, None);
        assert_eq!(record.stacked_opacity.percent(), 100);
        assert_eq!(record.split_position.percent(), 50.0);
    }

    #[test]
    fn custom_width_accepts_numeric_strings() {
        let json = r#"{ "imageBefore": "a", "imageAfter": "b", "swipeWidth": "custom", "customWidthPx": " 640 " }"#;
        let record = ComparisonRecord::from_json(json).unwrap();
        assert_eq!(record.swipe_width, SizingPolicy::Custom);
        assert_eq!(record.custom_width_px, Some(640.0));
    }

    #[test]
    fn non_numeric_custom_width_becomes_absent() {
        let json = r#"{ "imageBefore": "a", "imageAfter": "b", "customWidthPx": "wide" }"#;
        let record = ComparisonRecord::from_json(json).unwrap();
        assert_eq!(record.custom_width_px, None);

        let json = r#"{ "imageBefore": "a", "imageAfter": "b", "customWidthPx": [1] }"#;
        let record = ComparisonRecord::from_json(json).unwrap();
        assert_eq!(record.custom_width_px, None);
    }

    #[test]
    fn settings_round_trip_into_record() {
        let mut record = ComparisonRecord::from_json(MINIMAL).unwrap();
        let mut settings = record.display_settings();
        settings.view_mode = ViewMode::Stacked;
        settings.split_position = SplitPosition::new(72.5);
        settings.background = Some("#ffffff".to_string());
        record.apply_settings(&settings);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["viewMode"], "stacked");
        assert_eq!(json["splitPosition"], 72.5);
        assert_eq!(json["backgroundColor"], "#ffffff");
    }

    #[test]
    fn missing_images_is_invalid_format() {
        let result = ComparisonRecord::from_json(r#"{ "imageBefore": "a" }"#);
        assert!(matches!(result, Err(CompareError::InvalidFormat(_))));
    }
}
