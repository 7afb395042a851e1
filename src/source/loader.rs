//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（Data URL / Base64 / 内存字节 / 本地文件）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验，减少不必要的内存与 CPU 消耗。
//!
//! 解码是整个引擎唯一的异步边界：`load_async` 把解码放到阻塞线程池，
//! 结果再交回调用方所在的任务，调用方不能假设发起请求后尺寸立即可知。
//!
//! ## 实现思路
//!
//! - Base64：格式解析 + 解码前体积预估 + 解码后体积限制。
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - 所有来源都做文件签名校验（`infer`），拒绝非图片内容。

use std::path::PathBuf;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};

use super::{ImageSource, pipeline};
use crate::config::CompareConfig;
use crate::error::CompareError;

/// 图片字节来源。
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Data URL 或纯 Base64 字符串。
    Base64(String),
    /// 已在内存中的编码字节。
    Bytes(Vec<u8>),
    /// 本地文件路径。
    FilePath(PathBuf),
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 图片加载器。
///
/// 持有配置快照，可廉价克隆后交给后台任务。
#[derive(Debug, Clone)]
pub struct SourceLoader {
    config: Arc<CompareConfig>,
}

impl SourceLoader {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// 同步加载并解码。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use swipe_compare::config::CompareConfig;
    /// use swipe_compare::source::{ByteSource, SourceLoader};
    ///
    /// let loader = SourceLoader::new(CompareConfig::default());
    /// let source = loader.load(ByteSource::FilePath("before.png".into()))?;
    /// println!("{}x{}", source.natural_width(), source.natural_height());
    /// # Ok::<(), swipe_compare::error::CompareError>(())
    /// ```
    pub fn load(&self, source: ByteSource) -> Result<ImageSource, CompareError> {
        let raw = self.load_raw(source)?;
        pipeline::decode(raw, &self.config)
    }

    /// 在阻塞线程池中加载并解码，完成后把结果交回调用方。
    pub async fn load_async(&self, source: ByteSource) -> Result<ImageSource, CompareError> {
        let loader = self.clone();
        tokio::task::spawn_blocking(move || loader.load(source))
            .await
            .map_err(|e| CompareError::Decode(format!("后台解码任务异常退出：{}", e)))?
    }

    fn load_raw(&self, source: ByteSource) -> Result<RawImageData, CompareError> {
        match source {
            ByteSource::Base64(data) => self.load_from_base64(&data),
            ByteSource::Bytes(bytes) => self.load_from_bytes(bytes),
            ByteSource::FilePath(path) => self.load_from_file(&path),
        }
    }

    fn load_from_base64(&self, data: &str) -> Result<RawImageData, CompareError> {
        log::debug!("📝 开始处理 base64 图片");

        let bytes = parse_base64_with_limit(data, self.config.max_file_size)?;

        if bytes.len() as u64 > self.config.max_file_size {
            return Err(CompareError::ResourceLimit(format!(
                "Base64 解码后体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                self.config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "base64",
        })
    }

    fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<RawImageData, CompareError> {
        if bytes.len() as u64 > self.config.max_file_size {
            return Err(CompareError::ResourceLimit(format!(
                "图片体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                self.config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "bytes",
        })
    }

    fn load_from_file(&self, path: &std::path::Path) -> Result<RawImageData, CompareError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

        if !path.exists() {
            return Err(CompareError::InvalidFormat(format!(
                "文件不存在：{}",
                path.display()
            )));
        }

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > self.config.max_file_size {
            return Err(CompareError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                self.config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(path)?;
        validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "file",
        })
    }
}

/// 解析 Data URL 或纯 Base64，解码前先按长度预估体积。
fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, CompareError> {
    let normalized = data.trim();

    let payload = if normalized.starts_with("data:") {
        let marker = normalized
            .find(";base64,")
            .ok_or_else(|| CompareError::InvalidFormat("缺少 base64 标记".to_string()))?;
        &normalized[marker + 8..]
    } else {
        normalized
    };

    let estimated_len = estimate_base64_decoded_upper_bound_len(payload)?;
    if estimated_len > max_file_size {
        return Err(CompareError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| CompareError::Decode(format!("Base64 解码失败：{}", e)))
}

/// Base64 解码后长度的上界（每 4 个字符最多 3 字节）。
fn estimate_base64_decoded_upper_bound_len(payload: &str) -> Result<u64, CompareError> {
    (payload.len() as u64)
        .checked_add(3)
        .map(|len| len / 4 * 3)
        .ok_or_else(|| CompareError::ResourceLimit("Base64 长度溢出".to_string()))
}

fn validate_image_signature(bytes: &[u8]) -> Result<(), CompareError> {
    if bytes.is_empty() {
        return Err(CompareError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| CompareError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(CompareError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}
