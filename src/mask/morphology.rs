//! Morphological cleanup for segmentation masks
//!
//! Grayscale erosion and dilation over square windows, composed into the
//! usual open (despeckle) and close (fill holes) operations. The border
//! rules are part of the contract: erosion treats out-of-bounds neighbors
//! as 0.0, so the outermost ring always erodes toward background, while
//! dilation skips out-of-bounds neighbors entirely.

/// Per-pixel minimum over a `kernel` x `kernel` window.
pub fn erode(src: &[f32], width: usize, height: usize, kernel: usize) -> Vec<f32> {
    window_scan(src, width, height, kernel, f32::MAX, |acc, v| acc.min(v), Some(0.0))
}

/// Per-pixel maximum over a `kernel` x `kernel` window.
pub fn dilate(src: &[f32], width: usize, height: usize, kernel: usize) -> Vec<f32> {
    window_scan(src, width, height, kernel, f32::MIN, |acc, v| acc.max(v), None)
}

/// Erode then dilate: removes speckles and thin protrusions.
pub fn open(src: &[f32], width: usize, height: usize, kernel: usize) -> Vec<f32> {
    dilate(&erode(src, width, height, kernel), width, height, kernel)
}

/// Dilate then erode: fills pinholes and narrow gaps.
pub fn close(src: &[f32], width: usize, height: usize, kernel: usize) -> Vec<f32> {
    erode(&dilate(src, width, height, kernel), width, height, kernel)
}

/// Shared window scan. Out-of-bounds neighbors fold in `pad` when given and
/// are skipped otherwise (every window still contains its own center, so the
/// fold never runs empty).
fn window_scan(
    src: &[f32],
    width: usize,
    height: usize,
    kernel: usize,
    seed: f32,
    fold: impl Fn(f32, f32) -> f32,
    pad: Option<f32>,
) -> Vec<f32> {
    let half = (kernel / 2) as isize;
    let mut out = vec![0.0; src.len()];
    for y in 0..height as isize {
        for x in 0..width as isize {
            let mut acc = seed;
            for dy in -half..=half {
                for dx in -half..=half {
                    let ny = y + dy;
                    let nx = x + dx;
                    let inside =
                        ny >= 0 && ny < height as isize && nx >= 0 && nx < width as isize;
                    if inside {
                        acc = fold(acc, src[ny as usize * width + nx as usize]);
                    } else if let Some(pad) = pad {
                        acc = fold(acc, pad);
                    }
                }
            }
            out[y as usize * width + x as usize] = acc;
        }
    }
    out
}
