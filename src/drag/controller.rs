//! 拖动状态机
//!
//! ```text
//!            pointer_down (抓取点)
//!   Idle ───────────────────────────▶ Dragging
//!    ▲                                   │ pointer_move → 记录最新 X，请求一帧
//!    │                                   │ on_frame     → 计算分割位置
//!    └───────────────────────────────────┘
//!        pointer_up（最终计算 + 提交）/ abort（不提交）
//! ```
//!
//! 分割位置 = `clamp(起始位置 + (最新X - 起始X) * 100 / 起始容器宽度, 0, 100)`。

use super::host::{Affordance, CaptureHandle, DragHost, FrameHandle};
use crate::model::SplitPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// 一次指针事件的横坐标采样。
///
/// 鼠标与触摸使用相同的计算，只是坐标来源不同：触摸取第一个触点。
#[derive(Debug, Clone, PartialEq)]
pub enum PointerSample {
    Mouse { client_x: f64 },
    Touch { touches: Vec<f64> },
}

impl PointerSample {
    pub fn mouse(client_x: f64) -> Self {
        Self::Mouse { client_x }
    }

    pub fn touch(client_x: f64) -> Self {
        Self::Touch {
            touches: vec![client_x],
        }
    }

    /// 有效横坐标；没有触点或坐标非有限值时返回 `None`。
    pub fn x(&self) -> Option<f64> {
        let x = match self {
            Self::Mouse { client_x } => *client_x,
            Self::Touch { touches } => *touches.first()?,
        };
        x.is_finite().then_some(x)
    }
}

/// 手势开始时捕获的全部上下文。
#[derive(Debug)]
struct Gesture {
    start_x: f64,
    start_split: SplitPosition,
    container_width: f64,
    latest_x: f64,
    capture: CaptureHandle,
    pending_frame: Option<FrameHandle>,
}

impl Gesture {
    fn position_at(&self, x: f64) -> SplitPosition {
        let delta_percent = (x - self.start_x) * 100.0 / self.container_width;
        self.start_split.shifted(delta_percent)
    }
}

/// 分割线拖动控制器。
pub struct DragController<H: DragHost> {
    host: H,
    split: SplitPosition,
    gesture: Option<Gesture>,
}

impl<H: DragHost> DragController<H> {
    pub fn new(host: H, split: SplitPosition) -> Self {
        Self {
            host,
            split,
            gesture: None,
        }
    }

    pub fn state(&self) -> DragState {
        if self.gesture.is_some() {
            DragState::Dragging
        } else {
            DragState::Idle
        }
    }

    pub fn split_position(&self) -> SplitPosition {
        self.split
    }

    /// 外部设置分割位置（例如加载记录）。拖动中忽略并返回 `false`。
    pub fn set_split_position(&mut self, split: SplitPosition) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        self.split = split;
        true
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// 在抓取点上按下指针。
    ///
    /// 已在拖动、采样无效或容器宽度不为正数时拒绝开始，返回 `false`。
    pub fn pointer_down(
        &mut self,
        affordance: Affordance,
        sample: PointerSample,
        container_width: f64,
    ) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        let Some(x) = sample.x() else {
            return false;
        };
        if !container_width.is_finite() || container_width <= 0.0 {
            log::warn!("⚠️ 容器宽度无效（{}），忽略拖动", container_width);
            return false;
        }

        let capture = self.host.capture_pointer();
        self.host.set_drag_indicator(Some(affordance));
        self.gesture = Some(Gesture {
            start_x: x,
            start_split: self.split,
            container_width,
            latest_x: x,
            capture,
            pending_frame: None,
        });

        log::debug!(
            "🖱️ 开始拖动 - 抓取点: {:?} 起点: {} 起始位置: {:.2}%",
            affordance,
            x,
            self.split.percent()
        );
        true
    }

    /// 指针移动：只记录坐标，必要时请求一帧。
    pub fn pointer_move(&mut self, sample: PointerSample) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        let Some(x) = sample.x() else {
            return;
        };

        gesture.latest_x = x;
        if gesture.pending_frame.is_none() {
            gesture.pending_frame = Some(self.host.request_frame());
        }
    }

    /// 帧回调。只有当前挂起的句柄会生效，过期句柄直接忽略。
    pub fn on_frame(&mut self, handle: FrameHandle) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        if gesture.pending_frame != Some(handle) {
            log::debug!("⏭️ 忽略过期帧回调 {:?}", handle);
            return;
        }

        gesture.pending_frame = None;
        let next = gesture.position_at(gesture.latest_x);
        self.update_split(next);
    }

    /// 指针抬起：撤回挂起的帧，按最后坐标做一次最终计算并提交。
    ///
    /// 返回提交的分割位置；未在拖动时返回 `None`。
    pub fn pointer_up(&mut self) -> Option<SplitPosition> {
        let gesture = self.gesture.take()?;

        if let Some(frame) = gesture.pending_frame {
            self.host.cancel_frame(frame);
        }
        let final_split = gesture.position_at(gesture.latest_x);
        self.update_split(final_split);

        self.host.set_drag_indicator(None);
        self.host.release_pointer(gesture.capture);
        self.host.commit_split(self.split);

        log::debug!("✅ 拖动结束 - 分割位置: {:.2}%", self.split.percent());
        Some(self.split)
    }

    /// 异常终止：释放订阅、撤回帧，不提交。已经应用的位置保留。
    pub fn abort(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };

        if let Some(frame) = gesture.pending_frame {
            self.host.cancel_frame(frame);
        }
        self.host.set_drag_indicator(None);
        self.host.release_pointer(gesture.capture);
        log::debug!("🛑 拖动被中止");
        true
    }

    fn update_split(&mut self, next: SplitPosition) {
        if next != self.split {
            self.split = next;
            self.host.split_changed(next);
        }
    }
}

impl<H: DragHost> Drop for DragController<H> {
    fn drop(&mut self) {
        self.abort();
    }
}
