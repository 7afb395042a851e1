//! # 合成与导出模块
//!
//! ## 设计思路
//!
//! 交互视图与导出共用同一个合成入口 `render_with_hooks`，区别只在几何与选项：
//!
//! ```text
//! 交互：compute_geometry(...)        + RenderOptions::interactive → render
//! 导出：compute_export_geometry(...) + RenderOptions::export      → export_comparison
//! ```
//!
//! `render_with_hooks` 内部拆成 `prepare_layers`（重采样、差异）与 `compose`（裁剪、混合），
//! 会话可以缓存前者，拖动分割线时只重做后者。
//!
//! 每次调用都新建 `Surface`，不持有也不修改任何会话状态。

pub mod compose;
pub mod export;
pub mod surface;

pub use compose::{
    DiffResolution, PreparedLayers, RenderOptions, RenderOutput, compose, prepare_layers, render,
    render_with_hooks,
};
pub use export::{ExportRequest, encode_png, export_comparison, to_png_data_url};
pub use surface::{ClipRect, Surface, split_column};
