//! # 就绪状态模块
//!
//! ## 设计思路
//!
//! 解码是异步的：发起请求与收到结果之间，用户可能已经替换了同一侧图片。
//! 每次发起解码都会拿到一个带代数（generation）的 `DecodeTicket`，
//! 完成通知只有在代数仍然匹配时才会生效，旧结果直接丢弃。
//!
//! 布局只在前后两图都 `Ready` 时进行，否则返回 `SourceNotReady`。

use super::ImageSource;
use crate::error::CompareError;
use crate::model::Side;

/// 一次解码请求的凭据。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeTicket {
    side: Side,
    generation: u64,
}

impl DecodeTicket {
    pub fn side(&self) -> Side {
        self.side
    }
}

#[derive(Debug, Clone, Default)]
enum Slot {
    #[default]
    Empty,
    Pending(u64),
    Ready(ImageSource),
}

/// 前后两图的就绪状态。
#[derive(Debug, Clone, Default)]
pub struct SourcePair {
    before: Slot,
    after: Slot,
    next_generation: u64,
}

impl SourcePair {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发起一次解码：该侧进入等待状态，之前的图片整体作废。
    pub fn begin(&mut self, side: Side) -> DecodeTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        *self.slot_mut(side) = Slot::Pending(generation);
        log::debug!("⏳ {} 图片开始解码（generation={}）", side.as_str(), generation);
        DecodeTicket { side, generation }
    }

    /// 解码完成通知。凭据过期时返回 `false` 且不修改状态。
    pub fn complete(&mut self, ticket: DecodeTicket, source: ImageSource) -> bool {
        if !self.is_current(ticket) {
            log::debug!("⏭️ 丢弃过期的 {} 解码结果", ticket.side.as_str());
            return false;
        }

        log::debug!(
            "✅ {} 图片就绪：{}x{}",
            ticket.side.as_str(),
            source.natural_width(),
            source.natural_height()
        );
        *self.slot_mut(ticket.side) = Slot::Ready(source);
        true
    }

    /// 解码失败通知：该侧回到空状态。凭据过期时忽略。
    pub fn fail(&mut self, ticket: DecodeTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        *self.slot_mut(ticket.side) = Slot::Empty;
        true
    }

    /// 直接设置已解码的图片（同步路径）。
    pub fn set_ready(&mut self, side: Side, source: ImageSource) {
        self.next_generation += 1;
        *self.slot_mut(side) = Slot::Ready(source);
    }

    pub fn get(&self, side: Side) -> Option<&ImageSource> {
        match self.slot(side) {
            Slot::Ready(source) => Some(source),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.get(Side::Before).is_some() && self.get(Side::After).is_some()
    }

    /// 取出两张已就绪的图片，任一未就绪返回 `SourceNotReady`。
    pub fn both(&self) -> Result<(&ImageSource, &ImageSource), CompareError> {
        let before = self
            .get(Side::Before)
            .ok_or_else(|| CompareError::SourceNotReady("before 图片尚未解码".to_string()))?;
        let after = self
            .get(Side::After)
            .ok_or_else(|| CompareError::SourceNotReady("after 图片尚未解码".to_string()))?;
        Ok((before, after))
    }

    fn is_current(&self, ticket: DecodeTicket) -> bool {
        matches!(
            self.slot(ticket.side),
            Slot::Pending(generation) if *generation == ticket.generation
        )
    }

    fn slot(&self, side: Side) -> &Slot {
        match side {
            Side::Before => &self.before,
            Side::After => &self.after,
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::Before => &mut self.before,
            Side::After => &mut self.after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn source(w: u32, h: u32) -> ImageSource {
        ImageSource::from_rgba(RgbaImage::new(w, h)).unwrap()
    }

    #[test]
    fn not_ready_until_both_sides_complete() {
        let mut pair = SourcePair::new();
        let before = pair.begin(Side::Before);
        let after = pair.begin(Side::After);
        assert!(matches!(pair.both(), Err(CompareError::SourceNotReady(_))));

        assert!(pair.complete(before, source(2, 2)));
        assert!(!pair.is_ready());
        assert!(pair.complete(after, source(3, 3)));
        assert!(pair.is_ready());
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut pair = SourcePair::new();
        let first = pair.begin(Side::After);
        let second = pair.begin(Side::After);

        assert!(!pair.complete(first, source(1, 1)));
        assert!(pair.get(Side::After).is_none());
        assert!(pair.complete(second, source(5, 5)));
        assert_eq!(pair.get(Side::After).unwrap().natural_width(), 5);
    }

    #[test]
    fn replacing_a_ready_side_makes_pair_not_ready() {
        let mut pair = SourcePair::new();
        pair.set_ready(Side::Before, source(1, 1));
        pair.set_ready(Side::After, source(1, 1));
        assert!(pair.is_ready());

        let ticket = pair.begin(Side::Before);
        assert!(!pair.is_ready());
        assert!(pair.fail(ticket));
        assert!(pair.get(Side::Before).is_none());
    }
}
