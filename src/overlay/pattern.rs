//! Overlay pattern synthesis
//!
//! Pure pixel generators: each produces an opaque RGBA buffer at the
//! requested region size. Coverage and opacity are applied later at
//! composite time, so patterns never need to know about masks.

use image::{Rgba, RgbaImage};
use rand::Rng;

use super::types::{Color, GradientDirection, PatternKind, RenderOptions};

/// One glitter speckle per this many pixels of region area
const SPECKLE_AREA: u32 = 20;
/// Fraction of the region height taken by the french tip
const FRENCH_TIP_FRACTION: f32 = 0.3;

/// Synthesize one region overlay.
pub fn synthesize(
    width: u32,
    height: u32,
    options: &RenderOptions,
    rng: &mut impl Rng,
) -> RgbaImage {
    let mut overlay = match options.pattern {
        PatternKind::Solid => solid(width, height, options.color),
        PatternKind::Gradient => gradient(width, height, &stops_of(options), options.direction),
        PatternKind::French => french(width, height, options.color, options.tip_color),
        // Ombre is a vertical gradient by definition: first stop at the tip.
        PatternKind::Ombre => {
            gradient(width, height, &stops_of(options), GradientDirection::Vertical)
        }
        PatternKind::Glitter => glitter(width, height, options.color, rng),
    };
    if options.glow {
        apply_glow(&mut overlay, options.glow_intensity);
    }
    overlay
}

fn stops_of(options: &RenderOptions) -> Vec<Color> {
    if options.stops.is_empty() {
        vec![options.color]
    } else {
        options.stops.clone()
    }
}

fn solid(width: u32, height: u32, color: Color) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255]))
}

fn gradient(width: u32, height: u32, stops: &[Color], direction: GradientDirection) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let t = axis_position(x, y, width, height, direction);
        let c = sample_stops(stops, t);
        Rgba([c[0], c[1], c[2], 255])
    })
}

/// Normalized [0, 1] position of a pixel along the gradient axis.
fn axis_position(x: u32, y: u32, width: u32, height: u32, direction: GradientDirection) -> f32 {
    let along = |v: u32, extent: u32| {
        if extent > 1 {
            v as f32 / (extent - 1) as f32
        } else {
            0.0
        }
    };
    match direction {
        GradientDirection::Vertical => along(y, height),
        GradientDirection::Horizontal => along(x, width),
        GradientDirection::Diagonal => {
            let extent = (width - 1) + (height - 1);
            if extent > 0 {
                (x + y) as f32 / extent as f32
            } else {
                0.0
            }
        }
    }
}

/// Sample an evenly spaced stop list at `t` in [0, 1].
fn sample_stops(stops: &[Color], t: f32) -> Color {
    match stops {
        [] => [0, 0, 0],
        [only] => *only,
        _ => {
            let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
            let i = (scaled.floor() as usize).min(stops.len() - 2);
            lerp_color(stops[i], stops[i + 1], scaled - i as f32)
        }
    }
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let mix =
        |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// French manicure: pure tip color above 80% of the tip height, pure base
/// below 120%, a linear blend band in between.
fn french(width: u32, height: u32, base: Color, tip: Color) -> RgbaImage {
    let tip_height = height as f32 * FRENCH_TIP_FRACTION;
    let band_start = tip_height * 0.8;
    let band_end = tip_height * 1.2;
    RgbaImage::from_fn(width, height, |_x, y| {
        let fy = y as f32;
        let c = if fy < band_start {
            tip
        } else if fy < band_end {
            lerp_color(tip, base, (fy - band_start) / (band_end - band_start))
        } else {
            base
        };
        Rgba([c[0], c[1], c[2], 255])
    })
}

fn glitter(width: u32, height: u32, base: Color, rng: &mut impl Rng) -> RgbaImage {
    let mut overlay = solid(width, height, base);
    let speckles = width * height / SPECKLE_AREA;
    for _ in 0..speckles {
        let cx = rng.random_range(0.0..width as f32);
        let cy = rng.random_range(0.0..height as f32);
        let radius = rng.random_range(0.5..=2.5f32);
        let brightness = rng.random_range(155..=255) as u8;
        fill_circle(&mut overlay, cx, cy, radius, [brightness; 3]);
    }
    overlay
}

fn fill_circle(overlay: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Color) {
    let (width, height) = overlay.dimensions();
    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil().max(0.0) as u32).min(width.saturating_sub(1));
    let y1 = ((cy + radius).ceil().max(0.0) as u32).min(height.saturating_sub(1));
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                overlay.put_pixel(x, y, Rgba([color[0], color[1], color[2], 255]));
            }
        }
    }
}

/// Brighten every color channel by a fraction of full scale, saturating.
fn apply_glow(overlay: &mut RgbaImage, intensity: f32) {
    let boost = (255.0 * intensity.max(0.0)).round().min(255.0) as u8;
    for pixel in overlay.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = channel.saturating_add(boost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn options(pattern: PatternKind) -> RenderOptions {
        RenderOptions {
            pattern,
            ..RenderOptions::default()
        }
    }

    fn squared_distance(a: Color, p: &Rgba<u8>) -> i32 {
        (0..3)
            .map(|c| (a[c] as i32 - p.0[c] as i32).pow(2))
            .sum()
    }

    #[test]
    fn solid_fills_with_base_color() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RenderOptions {
            color: [10, 20, 30],
            ..options(PatternKind::Solid)
        };
        let img = synthesize(4, 6, &opts, &mut rng);
        assert_eq!(img.dimensions(), (4, 6));
        for p in img.pixels() {
            assert_eq!(p.0, [10, 20, 30, 255]);
        }
    }

    #[test]
    fn vertical_gradient_hits_stops_at_both_ends() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RenderOptions {
            stops: vec![[0, 0, 0], [255, 255, 255]],
            ..options(PatternKind::Gradient)
        };
        let img = synthesize(3, 10, &opts, &mut rng);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 9).0, [255, 255, 255, 255]);
    }

    #[test]
    fn horizontal_gradient_varies_along_x() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RenderOptions {
            stops: vec![[0, 0, 0], [200, 100, 50]],
            direction: GradientDirection::Horizontal,
            ..options(PatternKind::Gradient)
        };
        let img = synthesize(10, 3, &opts, &mut rng);
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(9, 1).0, [200, 100, 50, 255]);
        assert_eq!(img.get_pixel(4, 0), img.get_pixel(4, 2));
    }

    #[test]
    fn diagonal_gradient_is_symmetric_across_the_antidiagonal() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RenderOptions {
            stops: vec![[0, 0, 0], [255, 255, 255]],
            direction: GradientDirection::Diagonal,
            ..options(PatternKind::Gradient)
        };
        let img = synthesize(8, 8, &opts, &mut rng);
        assert_eq!(img.get_pixel(2, 5), img.get_pixel(5, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(7, 7).0, [255, 255, 255, 255]);
    }

    #[test]
    fn three_stops_pass_through_the_middle_color() {
        let stops = [[0, 0, 0], [100, 200, 50], [255, 255, 255]];
        assert_eq!(sample_stops(&stops, 0.5), [100, 200, 50]);
        assert_eq!(sample_stops(&stops, 0.0), [0, 0, 0]);
        assert_eq!(sample_stops(&stops, 1.0), [255, 255, 255]);
    }

    #[test]
    fn empty_stops_fall_back_to_base_color() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RenderOptions {
            color: [40, 50, 60],
            stops: Vec::new(),
            ..options(PatternKind::Gradient)
        };
        let img = synthesize(5, 5, &opts, &mut rng);
        for p in img.pixels() {
            assert_eq!(p.0, [40, 50, 60, 255]);
        }
    }

    #[test]
    fn french_tip_rows_match_tip_and_base_rows_match_base() {
        // Height 10: tip height 3, blend band rows [2.4, 3.6), so rows 0-2
        // are pure tip and rows 4-9 pure base.
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RenderOptions {
            color: [200, 40, 60],
            tip_color: [250, 250, 245],
            ..options(PatternKind::French)
        };
        let img = synthesize(10, 10, &opts, &mut rng);
        for y in 0..3 {
            for x in 0..10 {
                let p = img.get_pixel(x, y);
                assert!(
                    squared_distance(opts.tip_color, p) < squared_distance(opts.color, p),
                    "row {y} should be closer to the tip color"
                );
            }
        }
        for y in 4..10 {
            for x in 0..10 {
                let p = img.get_pixel(x, y);
                assert!(
                    squared_distance(opts.color, p) < squared_distance(opts.tip_color, p),
                    "row {y} should be closer to the base color"
                );
            }
        }
        assert_eq!(img.get_pixel(0, 0).0, [250, 250, 245, 255]);
        assert_eq!(img.get_pixel(0, 9).0, [200, 40, 60, 255]);
    }

    #[test]
    fn glitter_is_reproducible_per_seed_and_speckles_brighten() {
        let opts = RenderOptions {
            color: [60, 60, 60],
            ..options(PatternKind::Glitter)
        };
        let a = synthesize(20, 20, &opts, &mut StdRng::seed_from_u64(9));
        let b = synthesize(20, 20, &opts, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.as_raw(), b.as_raw());

        // 400 pixels -> 20 speckles; at least one pixel must differ from the
        // base, and every non-base pixel is a gray speckle at 155 or above.
        let speckled = a
            .pixels()
            .filter(|p| p.0 != [60, 60, 60, 255])
            .collect::<Vec<_>>();
        assert!(!speckled.is_empty());
        for p in speckled {
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[1], p.0[2]);
            assert!(p.0[0] >= 155);
        }
    }

    #[test]
    fn tiny_region_gets_no_speckles() {
        let opts = RenderOptions {
            color: [60, 60, 60],
            ..options(PatternKind::Glitter)
        };
        let img = synthesize(4, 4, &opts, &mut StdRng::seed_from_u64(9));
        for p in img.pixels() {
            assert_eq!(p.0, [60, 60, 60, 255]);
        }
    }

    #[test]
    fn glow_brightens_and_saturates() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RenderOptions {
            color: [200, 10, 250],
            glow: true,
            glow_intensity: 0.3,
            ..options(PatternKind::Solid)
        };
        let img = synthesize(2, 2, &opts, &mut rng);
        // Boost = round(255 * 0.3) = 77, saturating per channel.
        for p in img.pixels() {
            assert_eq!(p.0, [255, 87, 255, 255]);
        }
    }

    #[test]
    fn default_glow_intensity_boost_is_bounded() {
        let mut overlay = solid(2, 2, [0, 0, 0]);
        apply_glow(&mut overlay, 2.0);
        for p in overlay.pixels() {
            assert_eq!(p.0, [255, 255, 255, 255]);
        }
    }
}
