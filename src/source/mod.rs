//! # 图片来源模块（source）
//!
//! ## 设计思路
//!
//! 该模块将“字节来源识别 → 加载校验 → 解码 → 就绪通知”按职责拆分为多个子模块，
//! 对比引擎其余部分只接触已经解码完成的 `ImageSource`。
//!
//! - `source`：解码后的只读图片句柄（自然尺寸 + 像素 + 可读性）
//! - `loader`：Data URL / Base64 / 字节 / 文件加载与安全校验，含异步解码入口
//! - `pipeline`：解码、像素限制、重采样
//! - `readiness`：前后两图的就绪状态与过期通知过滤
//!
//! ## 调用链
//!
//! ```text
//! 记录中的字节源
//!    ↓
//! loader.rs（来源解析 + 体积/签名校验）
//!    ↓
//! pipeline.rs（头部尺寸预检 + 完整解码）
//!    ↓
//! ImageSource ──→ readiness.rs（就绪通知，过滤过期结果）
//!    ↓
//! layout / diff / render
//! ```

mod loader;
pub(crate) mod pipeline;
mod readiness;
#[allow(clippy::module_inception)]
mod source;

pub use loader::{ByteSource, SourceLoader};
pub use pipeline::{inspect_dimensions, resample};
pub use readiness::{DecodeTicket, SourcePair};
pub use source::{ImageSource, PixelAccess};
