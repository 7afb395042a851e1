// End-to-end: bytes in, flat PNG out
use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, Rgba, RgbaImage};

use swipe_compare::config::CompareConfig;
use swipe_compare::model::{ComparisonRecord, Side, SizingPolicy, ViewMode};
use swipe_compare::render::{ExportRequest, encode_png, export_comparison};
use swipe_compare::source::{ByteSource, ImageSource, SourceLoader};
use swipe_compare::view::ComparisonView;

fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(bytes))
}

#[tokio::test]
async fn record_renders_at_natural_resolution() {
    let json = format!(
        r##"{{
            "name": "landing page",
            "imageBefore": "{}",
            "imageAfter": "{}",
            "viewMode": "differences",
            "swipeWidth": "custom",
            "customWidthPx": "320",
            "stackedOpacity": 100,
            "backgroundColor": "#fff"
        }}"##,
        data_url(&png(120, 60, [0, 0, 0])),
        data_url(&png(100, 90, [250, 250, 250])),
    );
    let record = ComparisonRecord::from_json(&json).unwrap();
    let config = CompareConfig::default();
    let loader = SourceLoader::new(config.clone());

    let mut view = ComparisonView::from_record(&record, config);
    let before = view.begin_decode(Side::Before);
    let after = view.begin_decode(Side::After);
    let before_result = loader
        .load_async(ByteSource::Base64(record.image_before.clone()))
        .await;
    let after_result = loader
        .load_async(ByteSource::Base64(record.image_after.clone()))
        .await;
    assert!(view.finish_decode(before, before_result));
    assert!(view.finish_decode(after, after_result));

    let geometry = view.geometry().unwrap();
    assert_eq!((geometry.container_width, geometry.container_height), (320, 240));

    let image = view.export(|| false).unwrap();
    assert_eq!(image.dimensions(), (120, 90));
    // 右下角两图都没有覆盖，露出背景色
    assert_eq!(image.get_pixel(119, 89), &Rgba([255, 255, 255, 255]));
    // 左上角在分割线左侧且两图差异明显，叠加了高亮
    let top_left = image.get_pixel(0, 0);
    assert!(top_left[0] > 150 && top_left[1] < 100 && top_left[2] > 150);

    let bytes = encode_png(&image).unwrap();
    let decoded = loader.load(ByteSource::Bytes(bytes)).unwrap();
    assert_eq!((decoded.natural_width(), decoded.natural_height()), (120, 90));
}

#[test]
fn tainted_export_still_produces_surface() {
    let config = CompareConfig::default();
    let before = ImageSource::from_rgba(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])))
        .unwrap()
        .into_tainted();
    let after = ImageSource::from_rgba(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255])))
        .unwrap();

    let request = ExportRequest {
        view_mode: ViewMode::Differences,
        sizing: SizingPolicy::Fit,
        available_width: None,
        split: Default::default(),
        opacity: Default::default(),
        background: None,
    };
    let image = export_comparison(&before, &after, &request, &config, || false).unwrap();

    assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    assert_eq!(image.get_pixel(7, 0), &Rgba([255, 255, 255, 255]));
}

#[test]
fn side_by_side_fit_export_keeps_viewport_size() {
    let config = CompareConfig::default();
    let before = ImageSource::from_rgba(RgbaImage::new(400, 200)).unwrap();
    let after = ImageSource::from_rgba(RgbaImage::new(200, 400)).unwrap();
    let request = ExportRequest {
        view_mode: ViewMode::SideBySide,
        sizing: SizingPolicy::Fit,
        available_width: Some(600.0),
        split: Default::default(),
        opacity: Default::default(),
        background: None,
    };

    let image = export_comparison(&before, &after, &request, &config, || false).unwrap();
    assert_eq!(image.dimensions(), (300 + 16 + 300, 600));
}
