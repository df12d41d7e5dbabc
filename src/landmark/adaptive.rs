//! Motion-adaptive tuning for landmark stabilization
//!
//! Split in two so each piece stays testable on its own:
//! [`MotionPresetSelector`] turns recent raw displacement into a
//! [`LandmarkParams`] preset, and [`AdaptiveLandmarkStabilizer`] applies the
//! selected preset to a plain [`LandmarkStabilizer`] before delegating. The
//! filter bank is shared across preset switches, so retuning never restarts
//! the filters.

use std::collections::VecDeque;

use super::stabilizer::LandmarkStabilizer;
use super::types::{Landmark, LandmarkParams};

/// Displacements are averaged over this many recent frames
const MOTION_WINDOW: usize = 10;
/// Mean displacement above which the hand counts as fast-moving
const FAST_MOTION: f32 = 0.05;
/// Mean displacement below which the hand counts as still
const STILL_MOTION: f32 = 0.01;

/// Rolling-window motion statistic over raw landmark frames.
///
/// Displacement is measured on raw input, not stabilized output, so the
/// selector sees motion before the filters damp it away.
pub struct MotionPresetSelector {
    displacements: VecDeque<f32>,
    previous_raw: Option<Vec<Landmark>>,
}

impl MotionPresetSelector {
    pub fn new() -> Self {
        Self {
            displacements: VecDeque::with_capacity(MOTION_WINDOW),
            previous_raw: None,
        }
    }

    /// Record one raw frame and pick the preset for it.
    ///
    /// Displacement is the mean Euclidean x/y distance per landmark against
    /// the previous raw frame; 0 when no previous frame exists or the
    /// landmark count differs.
    pub fn observe(&mut self, raw: &[Landmark]) -> LandmarkParams {
        let displacement = match &self.previous_raw {
            Some(prev) if prev.len() == raw.len() && !raw.is_empty() => {
                let total: f32 = raw
                    .iter()
                    .zip(prev)
                    .map(|(a, b)| {
                        let dx = a.x - b.x;
                        let dy = a.y - b.y;
                        (dx * dx + dy * dy).sqrt()
                    })
                    .sum();
                total / raw.len() as f32
            }
            _ => 0.0,
        };
        self.previous_raw = Some(raw.to_vec());

        if self.displacements.len() == MOTION_WINDOW {
            self.displacements.pop_front();
        }
        self.displacements.push_back(displacement);

        let avg = self.displacements.iter().sum::<f32>() / self.displacements.len() as f32;
        if avg > FAST_MOTION {
            LandmarkParams::RESPONSIVE
        } else if avg < STILL_MOTION {
            LandmarkParams::STEADY
        } else {
            LandmarkParams::BALANCED
        }
    }

    pub fn reset(&mut self) {
        self.displacements.clear();
        self.previous_raw = None;
    }
}

impl Default for MotionPresetSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Landmark stabilizer that retunes itself from recent hand motion.
pub struct AdaptiveLandmarkStabilizer {
    selector: MotionPresetSelector,
    inner: LandmarkStabilizer,
}

impl AdaptiveLandmarkStabilizer {
    pub fn new() -> Self {
        Self {
            selector: MotionPresetSelector::new(),
            inner: LandmarkStabilizer::new(LandmarkParams::BALANCED),
        }
    }

    pub fn stabilize(&mut self, raw: &[Landmark]) -> Vec<Landmark> {
        let preset = self.selector.observe(raw);
        if preset != self.inner.params() {
            tracing::debug!(?preset, "switching landmark preset");
        }
        self.inner.set_params(preset);
        self.inner.stabilize(raw)
    }

    pub fn reset(&mut self) {
        self.selector.reset();
        self.inner.reset();
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    /// Tuning currently applied to the underlying stabilizer.
    pub fn params(&self) -> LandmarkParams {
        self.inner.params()
    }
}

impl Default for AdaptiveLandmarkStabilizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_hand() -> Vec<Landmark> {
        vec![Landmark::new(0.5, 0.5), Landmark::new(0.6, 0.6)]
    }

    #[test]
    fn first_observation_selects_steady() {
        // No previous frame means zero displacement, and a window of one
        // zero averages below the still threshold.
        let mut selector = MotionPresetSelector::new();
        assert_eq!(selector.observe(&still_hand()), LandmarkParams::STEADY);
    }

    #[test]
    fn still_input_stays_steady() {
        let mut selector = MotionPresetSelector::new();
        for _ in 0..20 {
            assert_eq!(selector.observe(&still_hand()), LandmarkParams::STEADY);
        }
    }

    #[test]
    fn fast_sweep_selects_responsive() {
        let mut selector = MotionPresetSelector::new();
        let mut x = 0.0;
        let mut preset = LandmarkParams::STEADY;
        for _ in 0..12 {
            // 0.08 per frame is well past the fast threshold.
            x += 0.08;
            preset = selector.observe(&[Landmark::new(x, 0.5)]);
        }
        assert_eq!(preset, LandmarkParams::RESPONSIVE);
    }

    #[test]
    fn moderate_motion_selects_balanced() {
        let mut selector = MotionPresetSelector::new();
        let mut x = 0.0;
        let mut preset = LandmarkParams::STEADY;
        for _ in 0..30 {
            x += 0.03;
            preset = selector.observe(&[Landmark::new(x, 0.5)]);
        }
        assert_eq!(preset, LandmarkParams::BALANCED);
    }

    #[test]
    fn count_change_contributes_zero_displacement() {
        let mut selector = MotionPresetSelector::new();
        selector.observe(&still_hand());
        let preset = selector.observe(&[Landmark::new(0.9, 0.9)]);
        assert_eq!(preset, LandmarkParams::STEADY);
    }

    #[test]
    fn window_forgets_old_motion() {
        let mut selector = MotionPresetSelector::new();
        let mut x = 0.0;
        for _ in 0..10 {
            x += 0.1;
            selector.observe(&[Landmark::new(x, 0.5)]);
        }
        // Hold still long enough for every fast sample to fall out.
        let mut preset = LandmarkParams::RESPONSIVE;
        for _ in 0..10 {
            preset = selector.observe(&[Landmark::new(x, 0.5)]);
        }
        assert_eq!(preset, LandmarkParams::STEADY);
    }

    #[test]
    fn adaptive_stabilizer_retunes_without_reseeding() {
        let mut stab = AdaptiveLandmarkStabilizer::new();
        stab.stabilize(&still_hand());
        assert!(stab.is_initialized());

        let mut x = 0.5;
        for _ in 0..12 {
            x += 0.08;
            stab.stabilize(&[Landmark::new(x, 0.5), Landmark::new(x, 0.6)]);
        }
        assert_eq!(stab.params(), LandmarkParams::RESPONSIVE);
        assert!(stab.is_initialized(), "preset switches must keep the bank");
    }
}
