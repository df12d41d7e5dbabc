//! Edge-restricted Gaussian feathering
//!
//! Softens hard mask boundaries so the composited overlay blends into skin
//! instead of ending in an aliased cliff. Only a band around detected edges
//! is blurred; uniform interior and exterior regions pass through untouched,
//! which keeps the cost proportional to the mask perimeter rather than its
//! area.

/// Neighbor difference above which a pixel counts as an edge
const EDGE_DELTA: f32 = 0.1;

/// Soften mask edges in a band of `radius` pixels (Chebyshev distance)
/// around every detected edge, using a separable Gaussian blur with clamped
/// sampling. Radius 0 disables feathering.
pub fn feather(mask: &[f32], width: usize, height: usize, radius: usize) -> Vec<f32> {
    if radius == 0 || mask.is_empty() {
        return mask.to_vec();
    }

    let band = edge_band(mask, width, height, radius);
    let kernel = gaussian_kernel(radius);
    let horizontal = blur_rows(mask, &band, &kernel, width, height, radius);
    blur_columns(&horizontal, &band, &kernel, width, height, radius)
}

/// Normalized 1D Gaussian kernel of size `2 * radius + 1` with
/// `sigma = radius / 2`.
pub fn gaussian_kernel(radius: usize) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f32 / 2.0;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

/// Pixels within `radius` of any 4-neighbor discontinuity.
fn edge_band(mask: &[f32], width: usize, height: usize, radius: usize) -> Vec<bool> {
    let mut band = vec![false; mask.len()];
    for y in 0..height {
        for x in 0..width {
            if !is_edge(mask, width, height, x, y) {
                continue;
            }
            let y0 = y.saturating_sub(radius);
            let y1 = (y + radius).min(height - 1);
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1);
            for by in y0..=y1 {
                for bx in x0..=x1 {
                    band[by * width + bx] = true;
                }
            }
        }
    }
    band
}

fn is_edge(mask: &[f32], width: usize, height: usize, x: usize, y: usize) -> bool {
    let v = mask[y * width + x];
    (x > 0 && (v - mask[y * width + x - 1]).abs() > EDGE_DELTA)
        || (x + 1 < width && (v - mask[y * width + x + 1]).abs() > EDGE_DELTA)
        || (y > 0 && (v - mask[(y - 1) * width + x]).abs() > EDGE_DELTA)
        || (y + 1 < height && (v - mask[(y + 1) * width + x]).abs() > EDGE_DELTA)
}

fn blur_rows(
    src: &[f32],
    band: &[bool],
    kernel: &[f32],
    width: usize,
    height: usize,
    radius: usize,
) -> Vec<f32> {
    let mut out = src.to_vec();
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if !band[idx] {
                continue;
            }
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - radius as isize)
                    .clamp(0, width as isize - 1) as usize;
                acc += weight * src[y * width + sx];
            }
            out[idx] = acc;
        }
    }
    out
}

fn blur_columns(
    src: &[f32],
    band: &[bool],
    kernel: &[f32],
    width: usize,
    height: usize,
    radius: usize,
) -> Vec<f32> {
    let mut out = src.to_vec();
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if !band[idx] {
                continue;
            }
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - radius as isize)
                    .clamp(0, height as isize - 1) as usize;
                acc += weight * src[sy * width + x];
            }
            out[idx] = acc;
        }
    }
    out
}
