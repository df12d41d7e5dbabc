//! Frame-to-frame landmark denoising
//!
//! Two stages run per frame: a bank of scalar Kalman filters (one per
//! landmark axis) absorbs measurement jitter, then an exponential moving
//! average against the previous stabilized frame damps whatever the filters
//! let through. Output order always matches input order.

use super::kalman::ScalarKalman;
use super::types::{Landmark, LandmarkParams};

/// Denoises an ordered landmark list across frames.
///
/// The filter bank is allocated on the first non-empty frame, one scalar
/// filter per landmark axis, and stays fixed until [`reset`] or an implicit
/// reset when the incoming shape stops matching (different landmark count,
/// or depth appearing/disappearing).
///
/// [`reset`]: LandmarkStabilizer::reset
pub struct LandmarkStabilizer {
    params: LandmarkParams,
    bank: Option<FilterBank>,
    previous: Option<Vec<Landmark>>,
}

/// Flat bank of per-axis filters: landmark `i` owns filters
/// `[i * stride, i * stride + stride)`.
struct FilterBank {
    filters: Vec<ScalarKalman>,
    /// 2 for x/y, 3 when every seeded landmark carried depth
    stride: usize,
    landmarks: usize,
}

impl FilterBank {
    fn seeded(landmarks: &[Landmark]) -> Self {
        let with_depth = landmarks.iter().all(|lm| lm.z.is_some());
        let stride = if with_depth { 3 } else { 2 };
        let mut filters = Vec::with_capacity(landmarks.len() * stride);
        for lm in landmarks {
            filters.push(ScalarKalman::seeded(lm.x));
            filters.push(ScalarKalman::seeded(lm.y));
            if with_depth {
                filters.push(ScalarKalman::seeded(lm.z.unwrap_or(0.0)));
            }
        }
        Self {
            filters,
            stride,
            landmarks: landmarks.len(),
        }
    }

    fn matches(&self, landmarks: &[Landmark]) -> bool {
        self.landmarks == landmarks.len()
            && (self.stride == 3) == landmarks.iter().all(|lm| lm.z.is_some())
    }
}

impl LandmarkStabilizer {
    pub fn new(params: LandmarkParams) -> Self {
        Self {
            params,
            bank: None,
            previous: None,
        }
    }

    /// Swap the tuning without touching accumulated filter state.
    pub fn set_params(&mut self, params: LandmarkParams) {
        self.params = params;
    }

    pub fn params(&self) -> LandmarkParams {
        self.params
    }

    /// Whether a filter bank currently exists.
    pub fn is_initialized(&self) -> bool {
        self.bank.is_some()
    }

    /// Drop all filter state. Call when tracking is lost and reacquired, so
    /// a hand reappearing across the frame does not get dragged through the
    /// old position.
    pub fn reset(&mut self) {
        self.bank = None;
        self.previous = None;
    }

    /// Denoise one frame of landmarks. The output has the same length and
    /// order as the input.
    ///
    /// An empty input is a no-op that leaves state alone. The first
    /// non-empty frame seeds the filter bank and passes through unchanged;
    /// a shape change re-seeds the bank (implicit reset) and also passes
    /// through.
    pub fn stabilize(&mut self, raw: &[Landmark]) -> Vec<Landmark> {
        let _span = tracing::debug_span!("landmark_stabilize", count = raw.len()).entered();

        if raw.is_empty() {
            return Vec::new();
        }

        let needs_seed = match &self.bank {
            Some(bank) => !bank.matches(raw),
            None => true,
        };
        if needs_seed {
            if self.bank.is_some() {
                tracing::debug!(count = raw.len(), "landmark shape changed, re-seeding bank");
            }
            self.bank = Some(FilterBank::seeded(raw));
            self.previous = None;
            return raw.to_vec();
        }

        let Some(bank) = self.bank.as_mut() else {
            return raw.to_vec();
        };

        let q = self.params.process_noise;
        let r = self.params.measurement_noise;
        let mut output = Vec::with_capacity(raw.len());
        for (i, lm) in raw.iter().enumerate() {
            let base = i * bank.stride;
            let x = bank.filters[base].update(lm.x, q, r);
            let y = bank.filters[base + 1].update(lm.y, q, r);
            let z = if bank.stride == 3 {
                lm.z.map(|z| bank.filters[base + 2].update(z, q, r))
            } else {
                lm.z
            };
            output.push(Landmark { x, y, z });
        }

        if let Some(previous) = &self.previous {
            let alpha = self.params.smoothing;
            for (current, prev) in output.iter_mut().zip(previous) {
                current.x = alpha * current.x + (1.0 - alpha) * prev.x;
                current.y = alpha * current.y + (1.0 - alpha) * prev.y;
                if let (Some(z), Some(pz)) = (current.z, prev.z) {
                    current.z = Some(alpha * z + (1.0 - alpha) * pz);
                }
            }
        }
        self.previous = Some(output.clone());
        output
    }
}
