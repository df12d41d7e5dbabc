//! Per-frame orchestration of the stabilize-then-composite data flow
//!
//! [`FramePipeline`] owns one stabilizer per perception stream and one
//! compositor, for a single tracked hand. Everything runs on the caller's
//! thread: one `process_frame` call in, one composited frame out, no queues
//! and no shared state. Callers that want two hands run two pipelines.

use image::RgbaImage;

use crate::error::{ConfigError, Result};
use crate::landmark::{AdaptiveLandmarkStabilizer, Landmark, LandmarkParams, LandmarkStabilizer};
use crate::mask::{
    resize_mask, AdaptiveMaskStabilizer, Mask, MaskConfig, MaskParams, MaskStabilizer,
};
use crate::overlay::{
    FinishPreset, GlossOptions, GlossRenderer, NailRegion, OverlayCompositor, RenderOptions,
};

/// Consecutive empty-landmark frames tolerated before the landmark stage
/// drops its filter bank
const LANDMARK_LOST_LIMIT: u32 = 5;

/// Pipeline construction knobs, validated by [`FramePipeline::new`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Retune both stabilizers per frame from recent motion and change
    /// statistics; fixed params below apply when disabled
    pub adaptive: bool,
    pub landmark_params: LandmarkParams,
    pub mask_params: MaskParams,
    pub mask_config: MaskConfig,
    /// Glitter speckle seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adaptive: true,
            landmark_params: LandmarkParams::BALANCED,
            mask_params: MaskParams::BALANCED,
            mask_config: MaskConfig::default(),
            seed: None,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.mask_config.kernel_size == 0 || self.mask_config.kernel_size % 2 == 0 {
            return Err(ConfigError::InvalidKernelSize(self.mask_config.kernel_size));
        }
        if self.mask_config.history_depth == 0 {
            return Err(ConfigError::InvalidHistoryDepth(self.mask_config.history_depth));
        }
        for smoothing in [self.landmark_params.smoothing, self.mask_params.smoothing] {
            if !(smoothing > 0.0 && smoothing <= 1.0) {
                return Err(ConfigError::InvalidSmoothing(smoothing));
            }
        }
        Ok(())
    }
}

/// One frame of perception input, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct PerceptionInput<'a> {
    /// Raw segmentation mask, row-major, `mask_width * mask_height` long
    pub mask: &'a [f32],
    pub mask_width: u32,
    pub mask_height: u32,
    /// Raw hand landmarks; empty while no hand is detected
    pub landmarks: &'a [Landmark],
    /// Per-nail bounding geometry in frame pixels
    pub regions: &'a [NailRegion],
}

/// Stabilized per-frame outputs. The composited image itself is written into
/// the frame passed to [`FramePipeline::process_frame`].
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub landmarks: Vec<Landmark>,
    /// Stabilized coverage mask, resampled to frame resolution
    pub mask: Mask,
}

enum LandmarkStage {
    Fixed(LandmarkStabilizer),
    Adaptive(AdaptiveLandmarkStabilizer),
}

impl LandmarkStage {
    fn stabilize(&mut self, raw: &[Landmark]) -> Vec<Landmark> {
        match self {
            LandmarkStage::Fixed(inner) => inner.stabilize(raw),
            LandmarkStage::Adaptive(inner) => inner.stabilize(raw),
        }
    }

    fn reset(&mut self) {
        match self {
            LandmarkStage::Fixed(inner) => inner.reset(),
            LandmarkStage::Adaptive(inner) => inner.reset(),
        }
    }

    fn is_initialized(&self) -> bool {
        match self {
            LandmarkStage::Fixed(inner) => inner.is_initialized(),
            LandmarkStage::Adaptive(inner) => inner.is_initialized(),
        }
    }
}

enum MaskStage {
    Fixed(MaskStabilizer),
    Adaptive(AdaptiveMaskStabilizer),
}

impl MaskStage {
    fn stabilize(&mut self, raw: &[f32], width: u32, height: u32) -> Mask {
        match self {
            MaskStage::Fixed(inner) => inner.stabilize(raw, width, height),
            MaskStage::Adaptive(inner) => inner.stabilize(raw, width, height),
        }
    }

    fn reset(&mut self) {
        match self {
            MaskStage::Fixed(inner) => inner.reset(),
            MaskStage::Adaptive(inner) => inner.reset(),
        }
    }
}

/// End-to-end frame processor: landmark stabilization, mask stabilization,
/// mask resampling and overlay compositing in one call.
pub struct FramePipeline {
    landmarks: LandmarkStage,
    mask: MaskStage,
    compositor: OverlayCompositor,
    landmarks_missing: u32,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let landmarks = if config.adaptive {
            LandmarkStage::Adaptive(AdaptiveLandmarkStabilizer::new())
        } else {
            LandmarkStage::Fixed(LandmarkStabilizer::new(config.landmark_params))
        };
        let mask = if config.adaptive {
            MaskStage::Adaptive(AdaptiveMaskStabilizer::new(config.mask_config))
        } else {
            MaskStage::Fixed(MaskStabilizer::new(config.mask_params, config.mask_config))
        };
        let compositor = match config.seed {
            Some(seed) => OverlayCompositor::with_seed(seed),
            None => OverlayCompositor::new(),
        };

        tracing::info!(adaptive = config.adaptive, "frame pipeline ready");
        Ok(Self {
            landmarks,
            mask,
            compositor,
            landmarks_missing: 0,
        })
    }

    /// Attach the specular shading collaborator consumed during compositing.
    pub fn set_gloss(&mut self, gloss: Box<dyn GlossRenderer>) {
        self.compositor.set_gloss(gloss);
    }

    /// Forward a finish preset to the gloss collaborator, if any.
    pub fn set_finish(&mut self, finish: FinishPreset) {
        self.compositor.set_finish(finish);
    }

    /// Forward a partial gloss settings update to the collaborator, if any.
    pub fn update_gloss_options(&mut self, options: &GlossOptions) {
        self.compositor.update_gloss_options(options);
    }

    /// Stabilize one frame of perception data and composite the polish
    /// overlay onto `frame` in place.
    ///
    /// Never fails: degraded input degrades the output (raw echo, skipped
    /// render) and logs instead.
    pub fn process_frame(
        &mut self,
        frame: &mut RgbaImage,
        input: &PerceptionInput<'_>,
        options: &RenderOptions,
    ) -> FrameOutput {
        let _span = tracing::debug_span!("process_frame").entered();

        // The landmark stage has no activity gate of its own (empty input is
        // a no-op there), so dropout tracking lives here, mirroring the mask
        // stage's tolerance before a full reset.
        if input.landmarks.is_empty() {
            self.landmarks_missing += 1;
            if self.landmarks_missing == LANDMARK_LOST_LIMIT + 1 && self.landmarks.is_initialized()
            {
                tracing::debug!("landmarks absent beyond limit, dropping filter bank");
                self.landmarks.reset();
            }
        } else {
            self.landmarks_missing = 0;
        }

        let landmarks = self.landmarks.stabilize(input.landmarks);
        let stabilized = self
            .mask
            .stabilize(input.mask, input.mask_width, input.mask_height);

        let (frame_width, frame_height) = frame.dimensions();
        let mask = resize_mask(
            &stabilized,
            input.mask_width,
            input.mask_height,
            frame_width,
            frame_height,
        );

        self.compositor
            .render_frame(frame, &mask, input.regions, options);

        FrameOutput { landmarks, mask }
    }

    /// Drop all temporal state, e.g. on a camera or scene switch.
    pub fn reset(&mut self) {
        tracing::info!("pipeline reset");
        self.landmarks.reset();
        self.mask.reset();
        self.landmarks_missing = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(FramePipeline::new(PipelineConfig::default()).is_ok());
    }

    #[test]
    fn even_kernel_is_rejected() {
        let config = PipelineConfig {
            mask_config: MaskConfig {
                kernel_size: 4,
                ..MaskConfig::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            FramePipeline::new(config),
            Err(ConfigError::InvalidKernelSize(4))
        ));
    }

    #[test]
    fn zero_history_depth_is_rejected() {
        let config = PipelineConfig {
            mask_config: MaskConfig {
                history_depth: 0,
                ..MaskConfig::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            FramePipeline::new(config),
            Err(ConfigError::InvalidHistoryDepth(0))
        ));
    }

    #[test]
    fn out_of_range_smoothing_is_rejected() {
        let config = PipelineConfig {
            adaptive: false,
            mask_params: MaskParams {
                smoothing: 1.5,
                ..MaskParams::BALANCED
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            FramePipeline::new(config),
            Err(ConfigError::InvalidSmoothing(_))
        ));
    }
}
