//! 背景色解析模块
//!
//! # 设计思路
//!
//! 背景色来自用户输入或记录字段，格式不可信。统一规范化为 `#RRGGBB`，
//! 非法输入返回 `None`，由调用方回退到默认背景。
//!
//! # 实现思路
//!
//! - 通过 `once_cell::sync::Lazy` 在首次调用时编译正则，后续零成本复用。
//! - 三位简写（`#abc`）按通道重复展开为六位。

use image::Rgba;
use once_cell::sync::Lazy;
use regex::Regex;

/// 六位或三位十六进制颜色（`#` 可省略）。
static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})$").unwrap());

/// 规范化颜色输入为 `#RRGGBB`，非法输入返回 `None`。
///
/// # 示例
/// ```rust
/// use swipe_compare::model::normalize_hex;
///
/// assert_eq!(normalize_hex(" fff ").as_deref(), Some("#ffffff"));
/// assert_eq!(normalize_hex("#0D1117").as_deref(), Some("#0D1117"));
/// assert_eq!(normalize_hex("red"), None);
/// ```
pub fn normalize_hex(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let captures = HEX_COLOR.captures(trimmed)?;
    let digits = captures.get(1)?.as_str();

    if digits.len() == 6 {
        return Some(format!("#{}", digits));
    }

    let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
    Some(format!("#{}", expanded))
}

/// 将颜色字符串解析为不透明 RGBA。
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = normalize_hex(value)?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgba([channel(1..3)?, channel(3..5)?, channel(5..7)?, 255]))
}

/// 生效背景色：合法输入优先，否则使用默认背景。
///
/// 默认背景本身非法时回退为黑色，并记录警告。
pub fn effective_background(value: Option<&str>, default_hex: &str) -> Rgba<u8> {
    if let Some(color) = value.and_then(parse_hex_color) {
        return color;
    }

    parse_hex_color(default_hex).unwrap_or_else(|| {
        log::warn!("⚠️ 默认背景色非法：{}，回退为黑色", default_hex);
        Rgba([0, 0, 0, 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_short_form() {
        assert_eq!(normalize_hex("#aBc").as_deref(), Some("#aaBBcc"));
    }

    #[test]
    fn rejects_invalid_lengths_and_chars() {
        assert_eq!(normalize_hex(""), None);
        assert_eq!(normalize_hex("#abcd"), None);
        assert_eq!(normalize_hex("#gggggg"), None);
        assert_eq!(normalize_hex("##ffffff"), None);
    }

    #[test]
    fn parses_channels() {
        assert_eq!(parse_hex_color("#0d1117"), Some(Rgba([13, 17, 23, 255])));
        assert_eq!(parse_hex_color("fff"), Some(Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(
            effective_background(Some("not-a-color"), "#000000"),
            Rgba([0, 0, 0, 255])
        );
        assert_eq!(
            effective_background(None, "#ffffff"),
            Rgba([255, 255, 255, 255])
        );
        assert_eq!(
            effective_background(Some("#102030"), "#ffffff"),
            Rgba([16, 32, 48, 255])
        );
    }
}
