//! 无界面宿主：帧队列、指针捕获、视觉提示与提交记录全部保存在内存中。
//!
//! 测试与批处理场景用它驱动 `DragController`，调用方自行决定何时"触发一帧"。

use std::collections::{HashSet, VecDeque};

use super::host::{Affordance, CaptureHandle, DragHost, FrameHandle};
use crate::model::SplitPosition;

#[derive(Debug, Default)]
pub struct HeadlessHost {
    next_id: u64,
    frames: VecDeque<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    captures: HashSet<CaptureHandle>,
    indicator: Option<Affordance>,
    repaints: Vec<SplitPosition>,
    commits: Vec<SplitPosition>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出最早的待触发帧，交给 `DragController::on_frame`。
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        self.frames.pop_front()
    }

    pub fn pending_frames(&self) -> Vec<FrameHandle> {
        self.frames.iter().copied().collect()
    }

    pub fn cancelled_frames(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    pub fn is_captured(&self) -> bool {
        !self.captures.is_empty()
    }

    pub fn indicator(&self) -> Option<Affordance> {
        self.indicator
    }

    pub fn repaints(&self) -> &[SplitPosition] {
        &self.repaints
    }

    pub fn commits(&self) -> &[SplitPosition] {
        &self.commits
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl DragHost for HeadlessHost {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.allocate());
        self.frames.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|pending| *pending != handle);
        self.cancelled.push(handle);
    }

    fn capture_pointer(&mut self) -> CaptureHandle {
        let handle = CaptureHandle(self.allocate());
        self.captures.insert(handle);
        handle
    }

    fn release_pointer(&mut self, handle: CaptureHandle) {
        self.captures.remove(&handle);
    }

    fn set_drag_indicator(&mut self, affordance: Option<Affordance>) {
        self.indicator = affordance;
    }

    fn split_changed(&mut self, split: SplitPosition) {
        self.repaints.push(split);
    }

    fn commit_split(&mut self, split: SplitPosition) {
        self.commits.push(split);
    }
}
