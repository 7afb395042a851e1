use crate::model::SplitPosition;

/// 帧回调请求的句柄，由宿主分配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// 全局指针捕获（document 级 move/up 订阅）的句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle(pub u64);

/// 可以开始拖动的两个抓取点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affordance {
    /// 细分割线
    Line,
    /// 圆形把手
    Grip,
}

/// 拖动控制器与宿主 UI 之间的接口。
///
/// 宿主负责：在下一次重绘前调用 `DragController::on_frame`，
/// 并把全局指针事件转发给 `pointer_move` / `pointer_up`。
pub trait DragHost {
    /// 请求在下一次重绘前回调一次。
    fn request_frame(&mut self) -> FrameHandle;

    /// 撤回尚未触发的帧回调。
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// 获取全局指针捕获。
    fn capture_pointer(&mut self) -> CaptureHandle;

    fn release_pointer(&mut self, handle: CaptureHandle);

    /// 设置或清除拖动中的视觉提示（如光标样式）。
    fn set_drag_indicator(&mut self, affordance: Option<Affordance>);

    /// 分割位置变化，宿主据此重绘裁剪边界。
    fn split_changed(&mut self, _split: SplitPosition) {}

    /// 手势结束，最终位置需要持久化。
    fn commit_split(&mut self, split: SplitPosition);
}
