use anyhow::{Context, Result};
use clap::Parser;
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use lacquer::landmark::Landmark;
use lacquer::mask::mask_to_rgba;
use lacquer::overlay::{NailRegion, PatternKind, RenderOptions};
use lacquer::pipeline::{FramePipeline, PerceptionInput, PipelineConfig};

/// Fingertip indices in the 21-point hand layout
const FINGERTIPS: [usize; 5] = [4, 8, 12, 16, 20];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Frame width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Perception mask resolution (square), like a segmentation model output
    #[arg(long, default_value_t = 256)]
    mask_size: u32,

    /// Number of synthetic frames to process
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Seed for the synthetic perception input and the glitter speckles
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Overlay pattern: solid, gradient, french, ombre or glitter
    #[arg(long, default_value = "solid")]
    pattern: String,

    /// Base polish color as RRGGBB hex
    #[arg(long, default_value = "c41e3a")]
    color: String,

    /// Tip color for french, second stop for gradients, as RRGGBB hex
    #[arg(long, default_value = "fffaf5")]
    tip_color: String,

    /// Global overlay opacity
    #[arg(long, default_value_t = 0.85)]
    opacity: f32,

    /// Brighten the overlay (glow)
    #[arg(long)]
    glow: bool,

    /// Use fixed balanced tuning instead of the adaptive policies
    #[arg(long)]
    fixed: bool,

    /// Write composited frames as PNGs into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write the stabilized mask visualization instead of the composite
    #[arg(long)]
    show_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Lacquer demo starting");
    tracing::info!("Frame: {}x{}", args.width, args.height);
    tracing::info!("Mask: {}x{}", args.mask_size, args.mask_size);
    tracing::info!("Pattern: {}", args.pattern);

    let options = RenderOptions {
        pattern: parse_pattern(&args.pattern)?,
        color: parse_color(&args.color).context("Failed to parse --color")?,
        tip_color: parse_color(&args.tip_color).context("Failed to parse --tip-color")?,
        opacity: args.opacity,
        glow: args.glow,
        ..RenderOptions::default()
    };
    let options = match options.pattern {
        PatternKind::Gradient | PatternKind::Ombre => RenderOptions {
            stops: vec![options.color, options.tip_color],
            ..options
        },
        _ => options,
    };

    let config = PipelineConfig {
        adaptive: !args.fixed,
        seed: Some(args.seed),
        ..PipelineConfig::default()
    };
    let mut pipeline = FramePipeline::new(config).context("Failed to build frame pipeline")?;

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    run_demo(&mut pipeline, &args, &options)
}

fn run_demo(pipeline: &mut FramePipeline, args: &Args, options: &RenderOptions) -> Result<()> {
    let mut perception = SyntheticPerception::new(args.seed, args.mask_size, args.mask_size);
    let background = background(args.width, args.height);

    let mut total_process_time = Duration::ZERO;
    let mut frame_count = 0u64;

    tracing::info!("Processing {} synthetic frames", args.frames);

    for index in 0..args.frames {
        let landmarks = perception.landmarks();
        let mask = perception.mask(&landmarks);
        let regions = perception.regions(&landmarks, args.width, args.height);
        perception.advance();

        let mut frame = background.clone();
        let input = PerceptionInput {
            mask: &mask,
            mask_width: args.mask_size,
            mask_height: args.mask_size,
            landmarks: &landmarks,
            regions: &regions,
        };

        let process_start = Instant::now();
        let output = pipeline.process_frame(&mut frame, &input, options);
        total_process_time += process_start.elapsed();
        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_ms = total_process_time.as_secs_f64() * 1000.0 / frame_count as f64;
            tracing::info!(
                "Frame {}: process={:.2}ms, fps_budget={:.0}",
                frame_count,
                avg_ms,
                1000.0 / avg_ms
            );
        }

        if let Some(dir) = &args.out_dir {
            let path = dir.join(format!("frame_{index:04}.png"));
            let image = if args.show_mask {
                mask_to_rgba(&output.mask, args.width, args.height)
            } else {
                frame
            };
            image
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    let avg_ms = total_process_time.as_secs_f64() * 1000.0 / frame_count.max(1) as f64;
    tracing::info!("Done: {} frames, {:.2}ms average", frame_count, avg_ms);
    Ok(())
}

fn parse_pattern(name: &str) -> Result<PatternKind> {
    match name.to_ascii_lowercase().as_str() {
        "solid" => Ok(PatternKind::Solid),
        "gradient" => Ok(PatternKind::Gradient),
        "french" => Ok(PatternKind::French),
        "ombre" => Ok(PatternKind::Ombre),
        "glitter" => Ok(PatternKind::Glitter),
        other => anyhow::bail!(
            "unknown pattern '{other}', expected solid, gradient, french, ombre or glitter"
        ),
    }
}

fn parse_color(hex: &str) -> Result<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    anyhow::ensure!(
        hex.len() == 6 && hex.is_ascii(),
        "color must be RRGGBB hex, got '{hex}'"
    );
    Ok([
        u8::from_str_radix(&hex[0..2], 16)?,
        u8::from_str_radix(&hex[2..4], 16)?,
        u8::from_str_radix(&hex[4..6], 16)?,
    ])
}

/// Neutral skin-toned backdrop with a little texture, so the blend is
/// visible in saved frames.
fn background(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let shade = 140 + ((x + y) % 40) as u8;
        image::Rgba([shade, shade - 30, shade - 45, 255])
    })
}

/// Synthetic stand-in for the perception model: a 21-point hand swaying
/// sinusoidally with per-frame measurement jitter, fingertip ellipse masks
/// with speckle noise, and matching nail regions.
struct SyntheticPerception {
    rng: StdRng,
    frame: u32,
    mask_width: u32,
    mask_height: u32,
}

impl SyntheticPerception {
    fn new(seed: u64, mask_width: u32, mask_height: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            frame: 0,
            mask_width,
            mask_height,
        }
    }

    fn advance(&mut self) {
        self.frame += 1;
    }

    fn landmarks(&mut self) -> Vec<Landmark> {
        let t = self.frame as f32 / 30.0;
        let sway_x = 0.06 * (t * 0.9).sin();
        let sway_y = 0.03 * (t * 0.6).cos();

        let mut points = Vec::with_capacity(21);
        points.push(self.jitter(0.5 + sway_x, 0.85 + sway_y));
        for finger in 0..5 {
            let base_x = 0.32 + 0.09 * finger as f32 + sway_x;
            for joint in 1..=4 {
                let y = 0.78 - 0.13 * joint as f32 + sway_y;
                points.push(self.jitter(base_x, y));
            }
        }
        points
    }

    fn jitter(&mut self, x: f32, y: f32) -> Landmark {
        Landmark::new(
            x + self.rng.random_range(-0.004..0.004),
            y + self.rng.random_range(-0.004..0.004),
        )
    }

    /// Ellipse of full coverage under each fingertip, plus sparse speckle
    /// noise standing in for inference flicker.
    fn mask(&mut self, landmarks: &[Landmark]) -> Vec<f32> {
        let (w, h) = (self.mask_width as usize, self.mask_height as usize);
        let mut mask = vec![0.0f32; w * h];
        for &tip in &FINGERTIPS {
            let lm = landmarks[tip];
            let cx = lm.x * w as f32;
            let cy = lm.y * h as f32;
            let rx = (w as f32 * 0.022).max(2.0);
            let ry = (h as f32 * 0.038).max(3.0);
            let y0 = ((cy - ry).floor().max(0.0)) as usize;
            let y1 = ((cy + ry).ceil().min(h as f32 - 1.0)).max(0.0) as usize;
            let x0 = ((cx - rx).floor().max(0.0)) as usize;
            let x1 = ((cx + rx).ceil().min(w as f32 - 1.0)).max(0.0) as usize;
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = (x as f32 - cx) / rx;
                    let dy = (y as f32 - cy) / ry;
                    if dx * dx + dy * dy <= 1.0 {
                        mask[y * w + x] = 1.0;
                    }
                }
            }
        }
        for v in mask.iter_mut() {
            if self.rng.random_range(0.0..1.0) < 0.002 {
                *v = if *v > 0.5 { 0.0 } else { 0.8 };
            }
        }
        mask
    }

    fn regions(
        &self,
        landmarks: &[Landmark],
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<NailRegion> {
        let rw = ((frame_width as f32 * 0.045) as u32).max(4);
        let rh = ((frame_height as f32 * 0.075) as u32).max(6);
        FINGERTIPS
            .iter()
            .map(|&tip| {
                let lm = landmarks[tip];
                NailRegion {
                    x: (lm.x * frame_width as f32 - rw as f32 / 2.0) as i32,
                    y: (lm.y * frame_height as f32 - rh as f32 / 2.0) as i32,
                    width: rw,
                    height: rh,
                    rotation: 0.0,
                }
            })
            .collect()
    }
}
