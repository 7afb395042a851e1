//! # 拖动控制模块
//!
//! 负责把指针手势转换为分割位置的更新，状态机只有 `Idle` / `Dragging` 两个状态。
//!
//! ## 设计思路
//!
//! 1. **与 UI 工具包解耦**：帧回调、全局指针订阅、光标样式、持久化都通过 `DragHost`
//!    交给宿主实现，控制器本身只做状态与数学。
//! 2. **逐帧合并**：指针移动只记录最新坐标并请求一次帧回调，
//!    分割位置在帧回调中统一计算，每帧最多变更一次。
//! 3. **作用域订阅**：手势开始时获取全局指针捕获，结束时无条件释放；
//!    `abort` 与 `Drop` 也会释放，不存在遗留的全局监听。
//!
//! ## 文件结构
//!
//! ```text
//! drag/
//! ├── mod.rs          # 模块入口
//! ├── host.rs         # DragHost trait 与句柄类型
//! ├── controller.rs   # 状态机
//! └── headless.rs     # 内存实现，用于测试与无界面嵌入
//! ```

mod controller;
mod headless;
mod host;

pub use controller::{DragController, DragState, PointerSample};
pub use headless::HeadlessHost;
pub use host::{Affordance, CaptureHandle, DragHost, FrameHandle};
