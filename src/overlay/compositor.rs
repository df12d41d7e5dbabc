//! Overlay composition onto source frames
//!
//! One compositor instance serves the whole session: it synthesizes a
//! pattern overlay per nail region, lets an optional gloss collaborator
//! shade it, then alpha-blends it into the frame weighted by the stabilized
//! coverage mask. Regions composite in caller order over the accumulating
//! frame, so overlap resolution is the caller's ordering.

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::pattern;
use super::types::{FinishPreset, GlossOptions, GlossRenderer, NailRegion, RenderOptions};

/// Coverage x opacity at or below this skips the blend. At this weight the
/// rounded result never differs visibly from the destination, and most mask
/// pixels inside a bounding region sit at exactly 0.
const MIN_EFFECTIVE_ALPHA: f32 = 0.01;

/// Synthesizes per-nail overlays and composites them onto frames.
///
/// Holds no per-frame state beyond the speckle RNG, so one instance can run
/// for the lifetime of a session. Specular shading is delegated to an
/// optional external [`GlossRenderer`].
pub struct OverlayCompositor {
    rng: StdRng,
    gloss: Option<Box<dyn GlossRenderer>>,
}

impl OverlayCompositor {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            gloss: None,
        }
    }

    /// Fixed speckle seed: glitter layouts become reproducible, which
    /// matters for tests and for comparing captures.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            gloss: None,
        }
    }

    /// Attach the specular shading collaborator.
    pub fn set_gloss(&mut self, gloss: Box<dyn GlossRenderer>) {
        self.gloss = Some(gloss);
    }

    pub fn has_gloss(&self) -> bool {
        self.gloss.is_some()
    }

    /// Forward a finish preset to the collaborator, if any.
    pub fn set_finish(&mut self, finish: FinishPreset) {
        if let Some(gloss) = self.gloss.as_mut() {
            gloss.set_finish(finish);
        }
    }

    /// Forward a partial gloss settings update to the collaborator, if any.
    pub fn update_gloss_options(&mut self, options: &GlossOptions) {
        if let Some(gloss) = self.gloss.as_mut() {
            gloss.update_options(options);
        }
    }

    /// Render every region onto `frame`, in order.
    ///
    /// `mask` is the stabilized coverage mask at frame resolution (row-major,
    /// width x height). A mismatched mask length degrades to a warned no-op
    /// rather than an error, matching the never-fail frame contract. Region
    /// parts outside the frame are skipped pixel by pixel.
    pub fn render_frame(
        &mut self,
        frame: &mut RgbaImage,
        mask: &[f32],
        regions: &[NailRegion],
        options: &RenderOptions,
    ) {
        let _span = tracing::debug_span!("render_frame", regions = regions.len()).entered();

        let (frame_width, frame_height) = frame.dimensions();
        if mask.len() != (frame_width as usize) * (frame_height as usize) {
            tracing::warn!(
                len = mask.len(),
                expected = frame_width as usize * frame_height as usize,
                "coverage mask does not match frame dimensions, skipping render"
            );
            return;
        }

        // Brightness comes from the unmodified source, so it runs before the
        // first region lands.
        let gloss_active = options.gloss && self.gloss.is_some();
        if gloss_active {
            if let Some(gloss) = self.gloss.as_mut() {
                gloss.set_finish(options.finish);
                let brightness = gloss.estimate_scene_brightness(frame);
                tracing::trace!(brightness, "scene brightness estimated");
            }
        }

        for region in regions {
            if region.width == 0 || region.height == 0 {
                continue;
            }
            tracing::trace!(
                x = region.x,
                y = region.y,
                width = region.width,
                height = region.height,
                rotation = region.rotation,
                "compositing region"
            );
            let mut overlay =
                pattern::synthesize(region.width, region.height, options, &mut self.rng);
            let coverage = crop_coverage(mask, frame_width, frame_height, region);
            if gloss_active {
                if let Some(gloss) = self.gloss.as_mut() {
                    gloss.apply(&mut overlay, &coverage);
                }
            }
            composite_region(frame, &overlay, &coverage, region, options.opacity);
        }
    }
}

impl Default for OverlayCompositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Stabilized-mask crop matching one region, row-major at region size.
/// Pixels falling outside the frame read as 0 coverage.
fn crop_coverage(
    mask: &[f32],
    frame_width: u32,
    frame_height: u32,
    region: &NailRegion,
) -> Vec<f32> {
    let mut coverage = vec![0.0; (region.width * region.height) as usize];
    for ry in 0..region.height {
        let fy = region.y + ry as i32;
        if fy < 0 || fy >= frame_height as i32 {
            continue;
        }
        for rx in 0..region.width {
            let fx = region.x + rx as i32;
            if fx < 0 || fx >= frame_width as i32 {
                continue;
            }
            coverage[(ry * region.width + rx) as usize] =
                mask[(fy as u32 * frame_width + fx as u32) as usize];
        }
    }
    coverage
}

/// Source-over blend of one overlay, weighted per pixel by
/// coverage x opacity. Destination alpha is left untouched.
fn composite_region(
    frame: &mut RgbaImage,
    overlay: &RgbaImage,
    coverage: &[f32],
    region: &NailRegion,
    opacity: f32,
) {
    let (frame_width, frame_height) = frame.dimensions();
    for ry in 0..region.height {
        let fy = region.y + ry as i32;
        if fy < 0 || fy >= frame_height as i32 {
            continue;
        }
        for rx in 0..region.width {
            let fx = region.x + rx as i32;
            if fx < 0 || fx >= frame_width as i32 {
                continue;
            }
            let alpha = (coverage[(ry * region.width + rx) as usize] * opacity).clamp(0.0, 1.0);
            if alpha <= MIN_EFFECTIVE_ALPHA {
                continue;
            }
            let src = overlay.get_pixel(rx, ry);
            let dst = frame.get_pixel_mut(fx as u32, fy as u32);
            for c in 0..3 {
                let blended = dst.0[c] as f32 * (1.0 - alpha) + src.0[c] as f32 * alpha;
                dst.0[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
