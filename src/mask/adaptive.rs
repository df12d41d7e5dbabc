//! Change-adaptive tuning for mask stabilization
//!
//! Mirrors the landmark side: [`ChangePresetSelector`] watches how much the
//! raw mask moves frame to frame and picks a [`MaskParams`] preset,
//! [`AdaptiveMaskStabilizer`] applies it to a plain [`MaskStabilizer`]
//! before delegating. State (history, stable mask, gates) survives preset
//! switches.

use std::collections::VecDeque;

use super::stabilizer::{mean_abs_diff, MaskStabilizer};
use super::types::{Mask, MaskConfig, MaskParams};

/// Per-frame changes are averaged over this many recent frames
const CHANGE_WINDOW: usize = 10;
/// Mean change above which the mask counts as fast-moving
const FAST_CHANGE: f32 = 0.05;
/// Mean change below which the mask counts as static
const STILL_CHANGE: f32 = 0.01;

/// Rolling-window change statistic over raw masks.
pub struct ChangePresetSelector {
    changes: VecDeque<f32>,
    previous_raw: Option<Mask>,
}

impl ChangePresetSelector {
    pub fn new() -> Self {
        Self {
            changes: VecDeque::with_capacity(CHANGE_WINDOW),
            previous_raw: None,
        }
    }

    /// Record one raw mask and pick the preset for it.
    ///
    /// Change is the mean absolute per-pixel difference against the previous
    /// raw mask; 0 when no previous mask exists or the sizes differ.
    pub fn observe(&mut self, raw: &[f32]) -> MaskParams {
        let change = match &self.previous_raw {
            Some(prev) => mean_abs_diff(raw, prev),
            None => 0.0,
        };
        self.previous_raw = Some(raw.to_vec());

        if self.changes.len() == CHANGE_WINDOW {
            self.changes.pop_front();
        }
        self.changes.push_back(change);

        let avg = self.changes.iter().sum::<f32>() / self.changes.len() as f32;
        if avg > FAST_CHANGE {
            MaskParams::RESPONSIVE
        } else if avg < STILL_CHANGE {
            MaskParams::STEADY
        } else {
            MaskParams::BALANCED
        }
    }

    pub fn reset(&mut self) {
        self.changes.clear();
        self.previous_raw = None;
    }
}

impl Default for ChangePresetSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Mask stabilizer that retunes itself from recent mask change.
pub struct AdaptiveMaskStabilizer {
    selector: ChangePresetSelector,
    inner: MaskStabilizer,
}

impl AdaptiveMaskStabilizer {
    pub fn new(config: MaskConfig) -> Self {
        Self {
            selector: ChangePresetSelector::new(),
            inner: MaskStabilizer::new(MaskParams::BALANCED, config),
        }
    }

    pub fn stabilize(&mut self, raw: &[f32], width: u32, height: u32) -> Mask {
        let preset = self.selector.observe(raw);
        if preset != self.inner.params() {
            tracing::debug!(?preset, "switching mask preset");
        }
        self.inner.set_params(preset);
        self.inner.stabilize(raw, width, height)
    }

    pub fn reset(&mut self) {
        self.selector.reset();
        self.inner.reset();
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    pub fn stable_mask(&self) -> Option<&[f32]> {
        self.inner.stable_mask()
    }

    /// Tuning currently applied to the underlying stabilizer.
    pub fn params(&self) -> MaskParams {
        self.inner.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_selects_steady() {
        let mut selector = ChangePresetSelector::new();
        assert_eq!(selector.observe(&vec![0.5; 64]), MaskParams::STEADY);
    }

    #[test]
    fn static_masks_stay_steady() {
        let mut selector = ChangePresetSelector::new();
        for _ in 0..15 {
            assert_eq!(selector.observe(&vec![0.5; 64]), MaskParams::STEADY);
        }
    }

    #[test]
    fn flickering_masks_select_responsive() {
        let mut selector = ChangePresetSelector::new();
        let mut preset = MaskParams::STEADY;
        for i in 0..12 {
            // Alternating 0.0/0.2 gives a mean change of 0.2 per frame.
            let value = if i % 2 == 0 { 0.0 } else { 0.2 };
            preset = selector.observe(&vec![value; 64]);
        }
        assert_eq!(preset, MaskParams::RESPONSIVE);
    }

    #[test]
    fn moderate_drift_selects_balanced() {
        let mut selector = ChangePresetSelector::new();
        let mut preset = MaskParams::STEADY;
        for i in 0..30 {
            let value = 0.3 + 0.03 * (i % 2) as f32;
            preset = selector.observe(&vec![value; 64]);
        }
        assert_eq!(preset, MaskParams::BALANCED);
    }

    #[test]
    fn size_change_contributes_zero() {
        let mut selector = ChangePresetSelector::new();
        selector.observe(&vec![0.9; 64]);
        let preset = selector.observe(&vec![0.1; 16]);
        assert_eq!(preset, MaskParams::STEADY);
    }

    #[test]
    fn adaptive_stabilizer_keeps_state_across_preset_switches() {
        let config = MaskConfig {
            morphology: false,
            ..MaskConfig::default()
        };
        let mut stab = AdaptiveMaskStabilizer::new(config);
        stab.stabilize(&vec![0.5; 64], 8, 8);
        assert!(stab.is_initialized());

        for i in 0..12 {
            let value = if i % 2 == 0 { 0.4 } else { 0.8 };
            stab.stabilize(&vec![value; 64], 8, 8);
        }
        assert_eq!(stab.params(), MaskParams::RESPONSIVE);
        assert!(stab.is_initialized());
    }
}
