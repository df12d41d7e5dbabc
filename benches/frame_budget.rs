use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::RgbaImage;
use lacquer::mask::{MaskConfig, MaskParams, MaskStabilizer};
use lacquer::overlay::{NailRegion, OverlayCompositor, RenderOptions};

/// Filled disc centered on the frame, shifted `offset` pixels right.
fn blob_mask(width: u32, height: u32, offset: f32) -> Vec<f32> {
    let cx = width as f32 / 2.0 + offset;
    let cy = height as f32 / 2.0;
    let radius = width.min(height) as f32 * 0.3;
    let mut mask = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if (dx * dx + dy * dy).sqrt() < radius {
                mask[(y * width + x) as usize] = 1.0;
            }
        }
    }
    mask
}

fn five_nail_regions() -> Vec<NailRegion> {
    (0..5)
        .map(|i| NailRegion {
            x: 90 + i * 110,
            y: 140,
            width: 56,
            height: 76,
            rotation: 0.1 * i as f32,
        })
        .collect()
}

/// Coverage painted over each region rect so every composite writes pixels.
fn coverage_for(regions: &[NailRegion], width: u32, height: u32) -> Vec<f32> {
    let mut mask = vec![0.0f32; (width * height) as usize];
    for region in regions {
        for dy in 0..region.height {
            for dx in 0..region.width {
                let x = region.x + dx as i32;
                let y = region.y + dy as i32;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    mask[(y as u32 * width + x as u32) as usize] = 0.9;
                }
            }
        }
    }
    mask
}

fn bench_mask_stabilization(c: &mut Criterion) {
    const WIDTH: u32 = 256;
    const HEIGHT: u32 = 256;

    // Two raws far enough apart that the change gate never short-circuits,
    // so each iteration pays for history blending, morphology, feathering
    // and the temporal blend.
    let settled = blob_mask(WIDTH, HEIGHT, 0.0);
    let shifted = blob_mask(WIDTH, HEIGHT, 12.0);

    let mut stabilizer = MaskStabilizer::new(MaskParams::default(), MaskConfig::default());
    stabilizer.stabilize(&settled, WIDTH, HEIGHT);

    let mut flip = false;
    c.bench_function("mask_stabilize_256x256", |b| {
        b.iter(|| {
            flip = !flip;
            let raw = if flip { &shifted } else { &settled };
            black_box(stabilizer.stabilize(black_box(raw), WIDTH, HEIGHT))
        })
    });
}

fn bench_compositing(c: &mut Criterion) {
    const WIDTH: u32 = 640;
    const HEIGHT: u32 = 480;

    let base = RgbaImage::from_pixel(WIDTH, HEIGHT, image::Rgba([120, 110, 100, 255]));
    let regions = five_nail_regions();
    let mask = coverage_for(&regions, WIDTH, HEIGHT);
    let options = RenderOptions::default();
    let mut compositor = OverlayCompositor::with_seed(7);

    c.bench_function("composite_640x480_five_nails", |b| {
        b.iter(|| {
            let mut frame = base.clone();
            compositor.render_frame(&mut frame, &mask, &regions, &options);
            black_box(frame)
        })
    });
}

criterion_group!(benches, bench_mask_stabilization, bench_compositing);
criterion_main!(benches);
