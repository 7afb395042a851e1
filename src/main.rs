//! # 前后对比图引擎：命令行入口
//!
//! 本文件只负责参数解析与流程编排，布局、合成与导出逻辑见 `lib.rs` 架构文档。
//!
//! ```text
//! swipe-compare render before.png after.png -o out.png --mode differences --split 40
//! swipe-compare record comparison.json -o out.png
//! swipe-compare layout before.png after.png --sizing actual
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;

use swipe_compare::config::{CompareConfig, PreviewProfile};
use swipe_compare::error::CompareError;
use swipe_compare::layout::{
    Dimensions, LayoutRequest, compute_export_geometry, compute_geometry,
};
use swipe_compare::model::{
    ComparisonRecord, DisplaySettings, Side, SizingPolicy, SplitPosition, StackedOpacity, ViewMode,
    normalize_hex,
};
use swipe_compare::render::encode_png;
use swipe_compare::source::{ByteSource, SourceLoader, inspect_dimensions};
use swipe_compare::view::ComparisonView;

#[derive(Parser)]
#[command(name = "swipe-compare")]
#[command(about = "Before/after image comparison renderer")]
struct Cli {
    /// JSON config file overriding the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Preview profile: quality / balanced / speed
    #[arg(long, global = true)]
    profile: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose two images and write a PNG
    Render {
        before: PathBuf,
        after: PathBuf,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
        /// Render the on-screen frame instead of the natural-resolution export
        #[arg(long)]
        interactive: bool,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Render a stored comparison record (JSON) to PNG
    Record {
        record: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Viewport width, used by the fit policy
        #[arg(long)]
        viewport: Option<f64>,
    },
    /// Print the computed geometry as JSON
    Layout {
        before: PathBuf,
        after: PathBuf,
        /// Compute the export geometry instead of the interactive one
        #[arg(long)]
        export: bool,
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Args)]
struct DisplayArgs {
    /// View mode: swipe / differences / stacked / side-by-side
    #[arg(long, default_value = "swipe", value_parser = parse_name::<ViewMode>)]
    mode: ViewMode,
    /// Sizing policy: images / actual / fit (full) / custom
    #[arg(long, default_value = "images", value_parser = parse_name::<SizingPolicy>)]
    sizing: SizingPolicy,
    /// Custom display width in pixels
    #[arg(long)]
    width: Option<f64>,
    /// Available viewport width in pixels
    #[arg(long)]
    viewport: Option<f64>,
    /// Split position in percent
    #[arg(long, default_value_t = SplitPosition::DEFAULT)]
    split: f64,
    /// Stacked opacity in percent
    #[arg(long, default_value_t = 100)]
    opacity: i64,
    /// Background colour (#RGB or #RRGGBB)
    #[arg(long)]
    background: Option<String>,
}

impl DisplayArgs {
    fn settings(&self) -> DisplaySettings {
        DisplaySettings {
            view_mode: self.mode,
            sizing: self.sizing,
            custom_width: self.width,
            stacked_opacity: StackedOpacity::new(self.opacity),
            background: self.background.as_deref().and_then(normalize_hex),
            split_position: SplitPosition::new(self.split),
        }
    }

    fn layout_request(&self) -> LayoutRequest {
        LayoutRequest::new(self.mode, self.sizing)
            .with_custom_width(self.width)
            .with_available_width(self.viewport)
    }
}

/// 复用 serde 的名称映射解析枚举参数（包括别名）。
fn parse_name<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|e| format!("无法识别的取值 `{}`：{}", value, e))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        log::error!("❌ [{}] {}", err.code(), err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CompareError> {
    let config = load_config(cli.config.as_deref(), cli.profile.as_deref())?;

    match cli.command {
        Commands::Render {
            before,
            after,
            output,
            interactive,
            display,
        } => {
            let loader = SourceLoader::new(config.clone());
            let (before, after) = tokio::join!(
                loader.load_async(ByteSource::FilePath(before)),
                loader.load_async(ByteSource::FilePath(after)),
            );

            let mut view = ComparisonView::new(config, display.settings());
            view.set_available_width(display.viewport);
            view.set_source(Side::Before, before?);
            view.set_source(Side::After, after?);

            let image = if interactive {
                view.render_frame()?.image.clone()
            } else {
                view.export(|| false)?
            };
            write_png(&output, &image)
        }
        Commands::Record {
            record,
            output,
            viewport,
        } => {
            let content = std::fs::read_to_string(&record)?;
            let record = ComparisonRecord::from_json(&content)?;
            let loader = SourceLoader::new(config.clone());

            let mut view = ComparisonView::from_record(&record, config);
            view.set_available_width(viewport);
            let before_ticket = view.begin_decode(Side::Before);
            let after_ticket = view.begin_decode(Side::After);

            let (before, after) = tokio::join!(
                loader.load_async(ByteSource::Base64(record.image_before.clone())),
                loader.load_async(ByteSource::Base64(record.image_after.clone())),
            );
            let before_err = before.as_ref().err().map(ToString::to_string);
            let after_err = after.as_ref().err().map(ToString::to_string);
            view.finish_decode(before_ticket, before);
            view.finish_decode(after_ticket, after);

            if let Some(reason) = before_err.or(after_err) {
                return Err(CompareError::SourceNotReady(reason));
            }

            let image = view.export(|| false)?;
            write_png(&output, &image)
        }
        Commands::Layout {
            before,
            after,
            export,
            display,
        } => {
            let before = read_dimensions(&before)?;
            let after = read_dimensions(&after)?;
            let geometry = if export {
                compute_export_geometry(
                    before,
                    after,
                    display.mode,
                    display.sizing,
                    display.viewport,
                    &config,
                )?
            } else {
                compute_geometry(before, after, &display.layout_request(), &config)?
            };
            println!("{}", geometry.to_json());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<CompareConfig, CompareError> {
    let mut config = match path {
        Some(path) => CompareConfig::from_json_file(path)?,
        None => CompareConfig::default(),
    };
    if let Some(profile) = profile {
        config.apply_preview_profile(PreviewProfile::from_str(profile)?);
    }
    Ok(config)
}

fn read_dimensions(path: &Path) -> Result<Dimensions, CompareError> {
    let bytes = std::fs::read(path)?;
    let (width, height) = inspect_dimensions(&bytes)?;
    Ok(Dimensions::new(width, height))
}

fn write_png(path: &Path, image: &image::RgbaImage) -> Result<(), CompareError> {
    let bytes = encode_png(image)?;
    std::fs::write(path, bytes)?;
    log::info!(
        "💾 已写入 {}（{}x{}）",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
