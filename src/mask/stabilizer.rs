//! Temporal stabilization of segmentation masks
//!
//! Raw per-frame masks flicker: edges crawl, blobs wink in and out, and a
//! single bad inference drops the whole hand. This stabilizer trades a little
//! latency for stability with four cooperating mechanisms, applied in order
//! each frame:
//!
//! 1. an activity gate that survives short detection dropouts,
//! 2. a change gate that serves the previous stable mask verbatim while the
//!    scene is static,
//! 3. an exponentially weighted blend over a short raw-mask history,
//! 4. morphological cleanup plus edge feathering on the blended result,
//!    folded into the stable mask by an exponential moving average.

use std::collections::VecDeque;

use super::feather::feather;
use super::morphology;
use super::types::{Mask, MaskConfig, MaskParams};

/// Pixel values above this count toward mask activity
const ACTIVITY_VALUE: f32 = 0.3;
/// Active-pixel fraction below which the hand is considered absent
const MIN_ACTIVITY: f32 = 0.001;
/// Consecutive absent frames tolerated before all state is dropped
const HAND_LOST_LIMIT: u32 = 5;

/// Mean absolute per-pixel difference; 0 when lengths differ or are empty.
pub(crate) fn mean_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let total: f32 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    total / a.len() as f32
}

/// Turns a flickering stream of raw segmentation masks into a temporally
/// stable one.
///
/// Frame processing never fails: inconsistent input (length/dimension
/// mismatches) degrades to a logged reset with the raw mask echoed back, so
/// one bad frame cannot take the effect down.
pub struct MaskStabilizer {
    params: MaskParams,
    config: MaskConfig,
    width: usize,
    height: usize,
    stable: Option<Mask>,
    history: VecDeque<Mask>,
    hand_lost: u32,
    stale_frames: u32,
}

impl MaskStabilizer {
    /// Config fields are sanitized rather than rejected here: an even kernel
    /// is bumped to the next odd size and a zero history depth to 1, each
    /// with a warning. Reject-early validation belongs to the pipeline
    /// constructor.
    pub fn new(params: MaskParams, config: MaskConfig) -> Self {
        let mut config = config;
        if config.kernel_size % 2 == 0 {
            let fixed = config.kernel_size + 1;
            tracing::warn!(
                from = config.kernel_size,
                to = fixed,
                "even morphology kernel, bumping to odd"
            );
            config.kernel_size = fixed;
        }
        if config.history_depth == 0 {
            tracing::warn!("zero history depth, clamping to 1");
            config.history_depth = 1;
        }
        Self {
            params,
            config,
            width: 0,
            height: 0,
            stable: None,
            history: VecDeque::with_capacity(config.history_depth),
            hand_lost: 0,
            stale_frames: 0,
        }
    }

    /// Swap the tuning; takes effect on the next recompute.
    pub fn set_params(&mut self, params: MaskParams) {
        self.params = params;
    }

    pub fn params(&self) -> MaskParams {
        self.params
    }

    /// Whether a stable mask currently exists.
    pub fn is_initialized(&self) -> bool {
        self.stable.is_some()
    }

    /// Last stabilized mask, if any.
    pub fn stable_mask(&self) -> Option<&[f32]> {
        self.stable.as_deref()
    }

    /// Consecutive frames served from the change gate since the last
    /// recompute.
    pub fn stale_frames(&self) -> u32 {
        self.stale_frames
    }

    /// Drop all temporal state.
    pub fn reset(&mut self) {
        self.stable = None;
        self.history.clear();
        self.hand_lost = 0;
        self.stale_frames = 0;
        self.width = 0;
        self.height = 0;
    }

    /// Stabilize one raw mask of `width` x `height` pixels.
    ///
    /// The output length always matches the input except while a short
    /// detection dropout is bridged, where the previous stable mask (at its
    /// own dimensions) is served instead.
    pub fn stabilize(&mut self, raw: &[f32], width: u32, height: u32) -> Mask {
        let _span = tracing::debug_span!("mask_stabilize", width, height).entered();

        let (w, h) = (width as usize, height as usize);
        if raw.is_empty() || w == 0 || h == 0 {
            return raw.to_vec();
        }
        if raw.len() != w * h {
            tracing::warn!(
                len = raw.len(),
                expected = w * h,
                "mask length does not match dimensions, resetting"
            );
            self.reset();
            return raw.to_vec();
        }

        // Activity gate: bridge short dropouts with the last stable mask,
        // then give up and start over so a reappearing hand is not blended
        // against a ghost.
        let active = raw.iter().filter(|&&v| v > ACTIVITY_VALUE).count();
        let activity = active as f32 / raw.len() as f32;
        if activity < MIN_ACTIVITY {
            self.hand_lost += 1;
            if self.hand_lost > HAND_LOST_LIMIT {
                tracing::debug!(
                    frames = self.hand_lost,
                    "hand absent beyond limit, dropping mask state"
                );
                self.reset();
                return raw.to_vec();
            }
            return match &self.stable {
                Some(stable) => stable.clone(),
                None => raw.to_vec(),
            };
        }
        self.hand_lost = 0;

        if self.stable.is_some() && (self.width != w || self.height != h) {
            tracing::debug!(
                from_width = self.width,
                from_height = self.height,
                to_width = w,
                to_height = h,
                "mask dimensions changed, resetting"
            );
            self.reset();
        }

        let Some(previous_stable) = self.stable.take() else {
            // First valid frame: clean it up and adopt it wholesale.
            let cleaned = self.cleanup(raw.to_vec(), w, h);
            self.width = w;
            self.height = h;
            self.history.clear();
            self.history.push_back(cleaned.clone());
            self.stable = Some(cleaned.clone());
            return cleaned;
        };

        // Change gate: while the raw mask barely moves, serve the previous
        // stable mask bit-identical. The staleness cap forces a periodic
        // refresh so slow drift cannot accumulate unseen.
        let change = mean_abs_diff(raw, &previous_stable);
        self.stale_frames += 1;
        if change < self.params.change_threshold && self.stale_frames < self.config.max_stale_frames
        {
            let out = previous_stable.clone();
            self.stable = Some(previous_stable);
            return out;
        }
        self.stale_frames = 0;

        if self.history.len() >= self.config.history_depth {
            self.history.pop_front();
        }
        self.history.push_back(raw.to_vec());

        let blended = blend_history(&self.history, w * h);
        let cleaned = self.cleanup(blended, w, h);

        let alpha = self.params.smoothing;
        let stable: Mask = cleaned
            .iter()
            .zip(&previous_stable)
            .map(|(new, old)| alpha * new + (1.0 - alpha) * old)
            .collect();
        self.stable = Some(stable.clone());
        stable
    }

    fn cleanup(&self, mask: Mask, w: usize, h: usize) -> Mask {
        let cleaned = if self.config.morphology {
            let opened = morphology::open(&mask, w, h, self.config.kernel_size);
            morphology::close(&opened, w, h, self.config.kernel_size)
        } else {
            mask
        };
        feather(&cleaned, w, h, self.params.feather_radius)
    }
}

impl Default for MaskStabilizer {
    fn default() -> Self {
        Self::new(MaskParams::default(), MaskConfig::default())
    }
}

/// Exponentially weighted history blend: entry `i` (oldest first) weighs
/// `2^i`, so the newest frame always dominates and the smoothing depth ramps
/// up naturally while the buffer refills after a reset.
fn blend_history(history: &VecDeque<Mask>, len: usize) -> Mask {
    let total: f32 = (0..history.len()).map(|i| (1u32 << i) as f32).sum();
    let mut out = vec![0.0; len];
    for (i, mask) in history.iter().enumerate() {
        let weight = (1u32 << i) as f32 / total;
        for (acc, v) in out.iter_mut().zip(mask) {
            *acc += weight * v;
        }
    }
    out
}
