//! 分割位置与叠加透明度。
//!
//! 两者都是百分比，构造时即收敛到合法区间，之后不可能越界。

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 分割线位置，容器宽度的百分比，恒在 `[0, 100]`。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SplitPosition(f64);

impl SplitPosition {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;
    pub const DEFAULT: f64 = 50.0;

    /// 收敛到 `[0, 100]`；NaN 视为默认值 50。
    pub fn new(percent: f64) -> Self {
        if percent.is_nan() {
            return Self(Self::DEFAULT);
        }
        Self(percent.clamp(Self::MIN, Self::MAX))
    }

    pub fn percent(self) -> f64 {
        self.0
    }

    /// 在当前位置基础上偏移 `delta` 个百分点，结果仍被收敛。
    pub fn shifted(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for SplitPosition {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl Serialize for SplitPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for SplitPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::new)
    }
}

/// 叠加模式下前图的不透明度百分比，恒在 `[0, 100]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackedOpacity(u8);

impl StackedOpacity {
    pub const FULL: Self = Self(100);

    pub fn new(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    /// 从任意浮点输入构造（四舍五入），NaN 视为 100。
    pub fn from_f64(percent: f64) -> Self {
        if percent.is_nan() {
            return Self::FULL;
        }
        Self::new(percent.round() as i64)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// 作为合成时的图层 alpha（0.0-1.0）。
    pub fn alpha(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for StackedOpacity {
    fn default() -> Self {
        Self::FULL
    }
}

impl Serialize for StackedOpacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for StackedOpacity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::from_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_position_is_clamped() {
        assert_eq!(SplitPosition::new(-5.0).percent(), 0.0);
        assert_eq!(SplitPosition::new(250.0).percent(), 100.0);
        assert_eq!(SplitPosition::new(f64::NAN).percent(), 50.0);
        assert_eq!(SplitPosition::new(99.0).shifted(10.0).percent(), 100.0);
    }

    #[test]
    fn opacity_deserializes_from_any_number() {
        let o: StackedOpacity = serde_json::from_str("42.6").unwrap();
        assert_eq!(o.percent(), 43);
        let o: StackedOpacity = serde_json::from_str("-3").unwrap();
        assert_eq!(o.percent(), 0);
        assert_eq!(StackedOpacity::new(150).percent(), 100);
    }
}
