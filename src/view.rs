//! # 对比视图会话
//!
//! `ComparisonView` 把就绪状态、显示配置、布局与合成串在一起，
//! 供 UI 宿主或命令行驱动。
//!
//! ## 设计思路
//!
//! 1. **布局只在触发点重算**：图片就绪、尺寸策略变化、自定义宽度变化、视图模式变化，
//!    以及 `Fit` 策略下可用宽度变化。拖动分割线、改透明度都不触发布局。
//! 2. **配置变化通知**：交互修改的配置通过观察者回调交给调用方保存，
//!    会话自身不做持久化。拖动过程中的位置只重绘，松手后才通知。
//! 3. **导出只读**：导出按自然分辨率重新布局，不触碰会话中的几何与分割位置。
//!
//! 缓存分两层：
//!
//! - 图层（重采样后的两图 + 差异高亮）按 (几何, 模式) 缓存，图片变化时清空。
//!   拖动分割线不会重新计算差异。
//! - 合成结果按 (几何, 模式, 分割位置, 透明度, 背景) 缓存在 LRU 中，
//!   分割线来回拖动时可以直接命中。

use std::num::NonZeroUsize;
use std::sync::Arc;

use image::RgbaImage;
use lru::LruCache;

use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::layout::{Geometry, LayoutRequest, compute_geometry};
use crate::model::{
    ComparisonRecord, DisplaySettings, Side, SizingPolicy, SplitPosition, StackedOpacity, ViewMode,
    effective_background, normalize_hex,
};
use crate::render::{
    ExportRequest, PreparedLayers, RenderOptions, RenderOutput, compose, export_comparison,
    prepare_layers,
};
use crate::source::{DecodeTicket, ImageSource, SourcePair};

const FRAME_CACHE_ENTRIES: usize = 16;

/// 需要由调用方保存的配置变化。
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigChange {
    ViewMode(ViewMode),
    Sizing(SizingPolicy),
    CustomWidth(Option<f64>),
    StackedOpacity(StackedOpacity),
    Background(Option<String>),
    SplitPosition(SplitPosition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FrameKey {
    geometry: Geometry,
    view_mode: ViewMode,
    split_bits: u64,
    opacity: StackedOpacity,
    background: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LayerKey {
    geometry: Geometry,
    view_mode: ViewMode,
}

type Observer = Box<dyn FnMut(&ConfigChange)>;

pub struct ComparisonView {
    config: CompareConfig,
    settings: DisplaySettings,
    sources: SourcePair,
    available_width: Option<f64>,
    geometry: Option<Geometry>,
    geometry_revision: u64,
    layers: Option<(LayerKey, Arc<PreparedLayers>)>,
    layer_builds: u64,
    frames: LruCache<FrameKey, Arc<RenderOutput>>,
    observer: Option<Observer>,
}

impl ComparisonView {
    pub fn new(config: CompareConfig, settings: DisplaySettings) -> Self {
        Self {
            config,
            settings,
            sources: SourcePair::new(),
            available_width: None,
            geometry: None,
            geometry_revision: 0,
            layers: None,
            layer_builds: 0,
            frames: LruCache::new(NonZeroUsize::MIN.saturating_add(FRAME_CACHE_ENTRIES - 1)),
            observer: None,
        }
    }

    pub fn from_record(record: &ComparisonRecord, config: CompareConfig) -> Self {
        Self::new(config, record.display_settings())
    }

    /// 注册配置变化观察者（替换之前的观察者）。
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&ConfigChange) + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn sources(&self) -> &SourcePair {
        &self.sources
    }

    /// 当前布局；两图未就绪时为 `None`。
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// 布局重算次数，每次实际重算加一。
    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision
    }

    /// 图层（重采样 + 差异高亮）实际构建的次数。
    pub fn layer_builds(&self) -> u64 {
        self.layer_builds
    }

    /// 拖动手势使用的容器宽度。
    ///
    /// 布局未就绪或当前模式没有分割手柄（并排）时为 `None`，宿主不应开始拖动。
    pub fn drag_width(&self) -> Option<f64> {
        if !self.settings.view_mode.has_split_handle() {
            return None;
        }
        self.geometry.map(|g| g.container_width as f64)
    }

    pub fn layout_request(&self) -> LayoutRequest {
        LayoutRequest::new(self.settings.view_mode, self.settings.sizing)
            .with_custom_width(self.settings.custom_width)
            .with_available_width(self.available_width)
    }

    // ------------------------------------------------------------------
    // 图片
    // ------------------------------------------------------------------

    /// 发起一侧图片的解码，该侧立即变为未就绪。
    pub fn begin_decode(&mut self, side: Side) -> DecodeTicket {
        let ticket = self.sources.begin(side);
        self.geometry = None;
        self.invalidate_sources();
        ticket
    }

    /// 解码完成通知。过期凭据返回 `false`；失败结果记录日志后该侧回到空状态。
    pub fn finish_decode(
        &mut self,
        ticket: DecodeTicket,
        result: Result<ImageSource, CompareError>,
    ) -> bool {
        let accepted = match result {
            Ok(source) => self.sources.complete(ticket, source),
            Err(err) => {
                log::warn!("⚠️ {} 图片解码失败：{}", ticket.side().as_str(), err);
                self.sources.fail(ticket);
                false
            }
        };

        if accepted {
            self.invalidate_sources();
            self.refresh_geometry();
        }
        accepted
    }

    /// 直接替换一侧图片（同步路径）。
    pub fn set_source(&mut self, side: Side, source: ImageSource) {
        self.sources.set_ready(side, source);
        self.invalidate_sources();
        self.refresh_geometry();
    }

    // ------------------------------------------------------------------
    // 显示配置
    // ------------------------------------------------------------------

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        if self.settings.view_mode == view_mode {
            return;
        }
        self.settings.view_mode = view_mode;
        self.notify(ConfigChange::ViewMode(view_mode));
        self.refresh_geometry();
    }

    pub fn set_sizing(&mut self, sizing: SizingPolicy) {
        if self.settings.sizing == sizing {
            return;
        }
        self.settings.sizing = sizing;
        self.notify(ConfigChange::Sizing(sizing));
        self.refresh_geometry();
    }

    pub fn set_custom_width(&mut self, width: Option<f64>) {
        if self.settings.custom_width == width {
            return;
        }
        self.settings.custom_width = width;
        self.notify(ConfigChange::CustomWidth(width));
        if self.settings.sizing == SizingPolicy::Custom {
            self.refresh_geometry();
        }
    }

    /// 视口/容器尺寸变化。只有 `Fit` 策略需要重新布局。
    pub fn set_available_width(&mut self, width: Option<f64>) {
        if self.available_width == width {
            return;
        }
        self.available_width = width;
        if self.settings.sizing.needs_available_width() {
            self.refresh_geometry();
        }
    }

    pub fn set_stacked_opacity(&mut self, opacity: StackedOpacity) {
        if self.settings.stacked_opacity == opacity {
            return;
        }
        self.settings.stacked_opacity = opacity;
        self.notify(ConfigChange::StackedOpacity(opacity));
    }

    /// 设置背景色；非法颜色视为未设置（使用默认背景）。
    pub fn set_background(&mut self, value: Option<&str>) {
        let normalized = value.and_then(normalize_hex);
        if self.settings.background == normalized {
            return;
        }
        self.settings.background = normalized.clone();
        self.notify(ConfigChange::Background(normalized));
    }

    /// 拖动过程中的位置更新：只影响绘制，不通知保存。
    pub fn preview_split(&mut self, split: SplitPosition) {
        self.settings.split_position = split;
    }

    /// 拖动结束或外部设置：更新并通知保存。
    pub fn commit_split(&mut self, split: SplitPosition) {
        self.settings.split_position = split;
        self.notify(ConfigChange::SplitPosition(split));
    }

    // ------------------------------------------------------------------
    // 渲染与导出
    // ------------------------------------------------------------------

    /// 渲染当前交互帧。两图未就绪时返回 `SourceNotReady`。
    pub fn render_frame(&mut self) -> Result<Arc<RenderOutput>, CompareError> {
        let geometry = self
            .geometry
            .ok_or_else(|| CompareError::SourceNotReady("布局尚未计算".to_string()))?;
        let background = effective_background(
            self.settings.background.as_deref(),
            &self.config.default_background,
        );

        let key = FrameKey {
            geometry,
            view_mode: self.settings.view_mode,
            split_bits: self.settings.split_position.percent().to_bits(),
            opacity: self.settings.stacked_opacity,
            background: background.0,
        };
        if let Some(frame) = self.frames.get(&key) {
            return Ok(Arc::clone(frame));
        }

        let layers = self.prepared_layers(geometry)?;
        let output = Arc::new(compose(
            &layers,
            &geometry,
            self.settings.view_mode,
            self.settings.split_position,
            self.settings.stacked_opacity,
            Some(background),
        )?);

        self.frames.put(key, Arc::clone(&output));
        Ok(output)
    }

    pub fn export_request(&self) -> ExportRequest {
        ExportRequest::from_settings(&self.settings, self.available_width, &self.config)
    }

    /// 按自然分辨率导出。只读取会话状态，`is_cancelled` 返回 `true` 时放弃。
    pub fn export<C>(&self, is_cancelled: C) -> Result<RgbaImage, CompareError>
    where
        C: Fn() -> bool,
    {
        let (before, after) = self.sources.both()?;
        export_comparison(before, after, &self.export_request(), &self.config, is_cancelled)
    }

    fn prepared_layers(
        &mut self,
        geometry: Geometry,
    ) -> Result<Arc<PreparedLayers>, CompareError> {
        let key = LayerKey {
            geometry,
            view_mode: self.settings.view_mode,
        };
        if let Some((cached, layers)) = &self.layers {
            if *cached == key {
                return Ok(Arc::clone(layers));
            }
        }

        let (before, after) = self.sources.both()?;
        let options = RenderOptions::interactive(&self.config, None);
        let layers = Arc::new(prepare_layers(
            before,
            after,
            &geometry,
            key.view_mode,
            &options,
            || false,
        )?);
        self.layer_builds += 1;
        log::debug!(
            "🧩 重建图层 - 模式: {} 尺寸: {}x{}",
            key.view_mode.as_str(),
            geometry.container_width,
            geometry.container_height
        );
        self.layers = Some((key, Arc::clone(&layers)));
        Ok(layers)
    }

    fn invalidate_sources(&mut self) {
        self.layers = None;
        self.frames.clear();
    }

    fn refresh_geometry(&mut self) {
        let (before, after) = match self.sources.both() {
            Ok((before, after)) => (before.dimensions(), after.dimensions()),
            Err(_) => {
                self.geometry = None;
                return;
            }
        };

        match compute_geometry(before, after, &self.layout_request(), &self.config) {
            Ok(geometry) => {
                self.geometry = Some(geometry);
                self.geometry_revision += 1;
            }
            Err(err) => {
                log::warn!("⚠️ 布局计算失败：{}", err);
                self.geometry = None;
            }
        }
    }

    fn notify(&mut self, change: ConfigChange) {
        log::debug!("📝 配置变化：{:?}", change);
        if let Some(observer) = self.observer.as_mut() {
            observer(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn source(w: u32, h: u32) -> ImageSource {
        ImageSource::from_rgba(RgbaImage::from_pixel(w, h, Rgba([50, 60, 70, 255]))).unwrap()
    }

    fn ready_view() -> ComparisonView {
        let mut view = ComparisonView::new(CompareConfig::default(), DisplaySettings::default());
        view.set_source(Side::Before, source(100, 50));
        view.set_source(Side::After, source(80, 80));
        view
    }

    #[test]
    fn geometry_waits_for_both_sources() {
        let mut view = ComparisonView::new(CompareConfig::default(), DisplaySettings::default());
        let before = view.begin_decode(Side::Before);
        let after = view.begin_decode(Side::After);

        assert!(view.finish_decode(before, Ok(source(10, 10))));
        assert!(view.geometry().is_none());
        assert!(matches!(view.render_frame(), Err(CompareError::SourceNotReady(_))));

        assert!(view.finish_decode(after, Ok(source(20, 5))));
        let geometry = view.geometry().unwrap();
        assert_eq!((geometry.container_width, geometry.container_height), (20, 10));
    }

    #[test]
    fn failed_decode_leaves_view_usable() {
        let mut view = ready_view();
        let ticket = view.begin_decode(Side::After);
        assert!(!view.finish_decode(ticket, Err(CompareError::Decode("坏数据".to_string()))));
        assert!(view.geometry().is_none());

        view.set_source(Side::After, source(80, 80));
        assert!(view.render_frame().is_ok());
    }

    #[test]
    fn viewport_resize_only_matters_for_fit() {
        let mut view = ready_view();
        let revision = view.geometry_revision();

        view.set_available_width(Some(400.0));
        assert_eq!(view.geometry_revision(), revision);

        view.set_sizing(SizingPolicy::Fit);
        assert_eq!(view.geometry().unwrap().container_width, 400);
        view.set_available_width(Some(200.0));
        assert_eq!(view.geometry().unwrap().container_width, 200);
    }

    #[test]
    fn split_and_opacity_do_not_relayout() {
        let mut view = ready_view();
        let revision = view.geometry_revision();
        view.preview_split(SplitPosition::new(10.0));
        view.commit_split(SplitPosition::new(20.0));
        view.set_stacked_opacity(StackedOpacity::new(40));
        assert_eq!(view.geometry_revision(), revision);
    }

    #[test]
    fn observer_receives_saved_changes_only() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);

        let mut view = ready_view();
        view.set_observer(move |change| sink.borrow_mut().push(change.clone()));

        view.preview_split(SplitPosition::new(33.0));
        view.commit_split(SplitPosition::new(40.0));
        view.set_view_mode(ViewMode::Stacked);
        view.set_view_mode(ViewMode::Stacked);
        view.set_background(Some("abc"));
        view.set_custom_width(Some(640.0));

        assert_eq!(
            *changes.borrow(),
            vec![
                ConfigChange::SplitPosition(SplitPosition::new(40.0)),
                ConfigChange::ViewMode(ViewMode::Stacked),
                ConfigChange::Background(Some("#aabbcc".to_string())),
                ConfigChange::CustomWidth(Some(640.0)),
            ]
        );
    }

    #[test]
    fn repeated_frames_hit_cache() {
        let mut view = ready_view();
        let first = view.render_frame().unwrap();
        let second = view.render_frame().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        view.preview_split(SplitPosition::new(80.0));
        let third = view.render_frame().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn side_by_side_has_no_drag_width() {
        let mut view = ready_view();
        assert_eq!(view.drag_width(), Some(100.0));

        view.set_view_mode(ViewMode::SideBySide);
        assert!(view.geometry().is_some());
        assert_eq!(view.drag_width(), None);
    }

    #[test]
    fn dragging_split_reuses_diff_layers() {
        let mut view = ready_view();
        view.set_view_mode(ViewMode::Differences);

        for percent in 40..50 {
            view.preview_split(SplitPosition::new(percent as f64));
            view.render_frame().unwrap();
        }
        assert_eq!(view.layer_builds(), 1);

        view.set_stacked_opacity(StackedOpacity::new(30));
        view.render_frame().unwrap();
        assert_eq!(view.layer_builds(), 1);

        view.set_source(Side::After, source(80, 80));
        view.render_frame().unwrap();
        assert_eq!(view.layer_builds(), 2);

        view.set_sizing(SizingPolicy::Custom);
        view.set_custom_width(Some(40.0));
        view.render_frame().unwrap();
        assert_eq!(view.layer_builds(), 3);
    }

    #[test]
    fn export_leaves_session_untouched() {
        let mut view = ready_view();
        view.set_sizing(SizingPolicy::Custom);
        view.set_custom_width(Some(50.0));
        let geometry = *view.geometry().unwrap();
        let split = view.settings().split_position;

        let image = view.export(|| false).unwrap();
        assert_eq!(image.dimensions(), (100, 80));
        assert_eq!(view.geometry(), Some(&geometry));
        assert_eq!(view.settings().split_position, split);
    }
}
