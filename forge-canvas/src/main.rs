#![allow(clippy::uninlined_format_args)]

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use forge_canvas_rs::forge_canvas_canvas2d::{
    Canvas2dContext, FontConfig, TextAlign, TextBaseline,
};
use forge_canvas_rs::{
    draw_text, layout_lines, DisabledImageFetcher, DrawMode, EmojiResolver, LayoutRequest,
    ResolverConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// forge-canvas: draw text with Unicode and Discord emoji onto a canvas
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Draw text onto a new canvas and save it as PNG
    DrawText(DrawTextArgs),

    /// Print the lines the text is broken into, as JSON
    Lines(LinesArgs),
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Text to draw. Custom emoji are written as <:name:id> or <a:name:id>
    text: String,

    /// CSS font, e.g. "bold 24px sans-serif"
    #[arg(long, default_value = "24px sans-serif")]
    font: String,

    /// Side of the emoji squares in pixels [default: font size]
    #[arg(long)]
    emoji_size: Option<f32>,

    /// Maximum line width in pixels
    #[arg(long)]
    max_width: Option<f32>,

    /// Start a new line at each newline character
    #[arg(long)]
    multiline: bool,

    /// Wrap between words instead of between characters
    #[arg(long)]
    wrap: bool,

    /// Additional directory to load fonts from (repeatable)
    #[arg(long)]
    font_dir: Vec<PathBuf>,

    /// Only use fonts from --font-dir
    #[arg(long)]
    no_system_fonts: bool,
}

impl LayoutArgs {
    fn font_config(&self) -> FontConfig {
        FontConfig {
            font_dirs: self.font_dir.clone(),
            load_system_fonts: !self.no_system_fonts,
            ..FontConfig::default()
        }
    }

    fn request(&self, x: f32, y: f32) -> LayoutRequest {
        LayoutRequest {
            font: Some(self.font.clone()),
            emoji_size: self.emoji_size,
            max_width: self.max_width,
            multiline: self.multiline,
            wrap: self.wrap,
            ..LayoutRequest::new(self.text.clone(), x, y)
        }
    }
}

#[derive(Args, Debug)]
struct DrawTextArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Path to output PNG file to be created
    #[arg(short, long)]
    output: PathBuf,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 400)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 100)]
    height: u32,

    /// Anchor x of the first line
    #[arg(short, long, default_value_t = 10.0)]
    x: f32,

    /// Anchor y of the first line
    #[arg(short, long, default_value_t = 40.0)]
    y: f32,

    /// Distance between line baselines [default: 1.2 x emoji size]
    #[arg(long)]
    line_offset: Option<f32>,

    /// CSS color of the text
    #[arg(long)]
    style: Option<String>,

    /// Stroke the text outline instead of filling it
    #[arg(long)]
    stroke: bool,

    /// Outline width for --stroke
    #[arg(long)]
    line_width: Option<f32>,

    /// Text alignment: left, right, center, start, end
    #[arg(long, default_value = "start", value_parser = TextAlign::from_str)]
    align: TextAlign,

    /// Text baseline: top, hanging, middle, alphabetic, ideographic, bottom
    #[arg(long, default_value = "alphabetic", value_parser = TextBaseline::from_str)]
    baseline: TextBaseline,

    /// CSS color to fill the canvas with before drawing
    #[arg(long)]
    background: Option<String>,

    /// Pixels per inch stored in the PNG
    #[arg(long)]
    ppi: Option<f32>,

    /// Never fetch emoji images; draw them as text
    #[arg(long)]
    offline: bool,

    /// JSON file with emoji resolver settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LinesArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Serialize)]
struct LineReport {
    text: String,
    width: f32,
    tokens: Vec<forge_canvas_rs::Token>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::DrawText(args) => draw_text_command(args).await,
        Commands::Lines(args) => lines_command(args),
    }
}

async fn draw_text_command(args: DrawTextArgs) -> anyhow::Result<()> {
    let owned_resolver = match (&args.config, args.offline) {
        (None, false) => None,
        (Some(path), offline) => {
            let config = ResolverConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            Some(build_resolver(config, offline)?)
        }
        (None, true) => Some(build_resolver(ResolverConfig::default(), true)?),
    };
    let resolver = owned_resolver
        .as_ref()
        .unwrap_or_else(|| EmojiResolver::shared());

    let mut canvas =
        Canvas2dContext::with_config(args.width, args.height, &args.layout.font_config())?;
    if let Some(background) = &args.background {
        canvas.clear(background)?;
    }
    canvas.set_text_align(args.align);
    canvas.set_text_baseline(args.baseline);
    if let Some(line_width) = args.line_width {
        canvas.set_line_width(line_width);
    }

    let request = LayoutRequest {
        style: args.style.clone(),
        mode: if args.stroke {
            DrawMode::Stroke
        } else {
            DrawMode::Fill
        },
        line_offset: args.line_offset,
        ..args.layout.request(args.x, args.y)
    };
    let summary = draw_text(&mut canvas, &request, resolver).await;

    let png = canvas.to_png(args.ppi)?;
    std::fs::write(&args.output, png)
        .with_context(|| format!("Failed to write output file {}", args.output.display()))?;

    println!(
        "Drew {} line(s): {} emoji image(s), {} emoji fallback(s)",
        summary.lines, summary.emoji_images, summary.emoji_fallbacks
    );
    Ok(())
}

fn build_resolver(mut config: ResolverConfig, offline: bool) -> anyhow::Result<EmojiResolver> {
    if offline {
        config.allow_http_access = false;
        return Ok(EmojiResolver::new(config, Arc::new(DisabledImageFetcher)));
    }
    Ok(EmojiResolver::with_http(config)?)
}

fn lines_command(args: LinesArgs) -> anyhow::Result<()> {
    let mut canvas = Canvas2dContext::with_config(1, 1, &args.layout.font_config())?;
    let request = args.layout.request(0.0, 0.0);
    canvas
        .set_font(&args.layout.font)
        .with_context(|| format!("Invalid font: {}", args.layout.font))?;

    let (lines, mut oracle) = layout_lines(&mut canvas, &request);
    let mut reports = Vec::with_capacity(lines.len());
    for line in lines {
        reports.push(LineReport {
            text: line.text(),
            width: line.width(&mut oracle, &mut canvas)?,
            tokens: line.tokens,
        });
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{}", json);
    Ok(())
}
