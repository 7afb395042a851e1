//! # 前后对比图引擎：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │          宿主（Web 视图 / 桌面 UI / 命令行）             │
//! │                                                          │
//! │  指针事件 ─→ DragController ─→ DragHost（帧回调/捕获）   │
//! │  配置保存 ←─ ConfigChange 观察者                         │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, CompareError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            引擎 (Rust)                           │
//! │                                                          │
//! │  ┌─ view ────── ComparisonView（会话：就绪 + 配置 + 缓存）│
//! │  │                                                       │
//! │  ├─ source ──── 字节 → ImageSource（异步解码 + 就绪凭据）│
//! │  ├─ layout ──── 两图共享坐标空间的几何计算               │
//! │  ├─ diff ────── 逐通道阈值差异高亮                       │
//! │  ├─ render ──── 合成 / 导出 / PNG 编码                   │
//! │  └─ drag ────── Idle ⇄ Dragging 状态机（逐帧合并）        │
//! │                                                          │
//! │  model · config · error（共享类型）                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `CompareError` |
//! | [`config`] | 可调参数 `CompareConfig` 与预览档位 |
//! | [`model`] | 视图模式、尺寸策略、分割位置、透明度、背景色、对比记录 |
//! | [`source`] | 图片加载、解码、重采样、就绪状态 |
//! | [`layout`] | 交互与导出共用的几何公式 |
//! | [`diff`] | 差异高亮缓冲 |
//! | [`render`] | 图层合成与导出 |
//! | [`drag`] | 分割线拖动控制 |
//! | [`view`] | 对比视图会话 |

pub mod config;
pub mod diff;
pub mod drag;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;
pub mod source;
pub mod view;

pub use config::{CompareConfig, PreviewProfile, ResampleFilter};
pub use error::CompareError;
pub use layout::{Dimensions, Geometry, LayoutRequest, Placement};
pub use model::{SizingPolicy, SplitPosition, StackedOpacity, ViewMode};
pub use source::ImageSource;
pub use view::{ComparisonView, ConfigChange};
