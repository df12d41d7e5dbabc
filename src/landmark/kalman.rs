//! Scalar Kalman filter for a single landmark axis
//!
//! Each tracked coordinate gets its own one-dimensional filter; the bank of
//! filters lives in the stabilizer. Keeping the state scalar avoids matrix
//! machinery for what is a per-axis jitter problem.

/// One-dimensional Kalman filter: recursive estimate of a slowly moving
/// value observed through noise.
///
/// Noise parameters are passed per update rather than stored, so a preset
/// switch applies to a whole filter bank on the next frame without touching
/// accumulated estimates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScalarKalman {
    /// Current best estimate of the true value
    estimate: f32,
    /// Estimate uncertainty
    covariance: f32,
    /// Gain from the most recent update
    gain: f32,
}

impl ScalarKalman {
    /// Seed a filter from the first raw measurement.
    ///
    /// Covariance starts at 1.0 (high uncertainty on an identity scale), so
    /// the first few updates lean strongly toward the measurements.
    pub(crate) fn seeded(value: f32) -> Self {
        Self {
            estimate: value,
            covariance: 1.0,
            gain: 0.0,
        }
    }

    /// One predict/correct cycle against a new measurement.
    ///
    /// The process model is constant position: prediction is the previous
    /// estimate with `process_noise` added to the uncertainty, then the
    /// innovation is folded in weighted by the Kalman gain.
    pub(crate) fn update(
        &mut self,
        measurement: f32,
        process_noise: f32,
        measurement_noise: f32,
    ) -> f32 {
        let predicted = self.estimate;
        let covariance = self.covariance + process_noise;
        let gain = covariance / (covariance + measurement_noise);

        self.estimate = predicted + gain * (measurement - predicted);
        self.covariance = (1.0 - gain) * covariance;
        self.gain = gain;
        self.estimate
    }

    pub(crate) fn estimate(&self) -> f32 {
        self.estimate
    }

    /// Gain applied on the last update; 1.0 means the measurement was taken
    /// verbatim, 0.0 means it was ignored.
    pub(crate) fn last_gain(&self) -> f32 {
        self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_filter_starts_at_measurement() {
        let filter = ScalarKalman::seeded(0.42);
        assert_eq!(filter.estimate(), 0.42);
        assert_eq!(filter.last_gain(), 0.0);
    }

    #[test]
    fn zero_measurement_noise_converges_in_one_update() {
        // r = 0 makes the gain exactly 1, so the estimate snaps to the
        // measurement regardless of history.
        let mut filter = ScalarKalman::seeded(0.0);
        let out = filter.update(1.0, 0.005, 0.0);
        assert!((out - 1.0).abs() < 1e-6);
        assert!((filter.last_gain() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn huge_measurement_noise_barely_moves_estimate() {
        // q = 0 and r = 1e6: fifty identical measurements far from the seed
        // should drag the estimate by less than 1e-3 total.
        let mut filter = ScalarKalman::seeded(0.0);
        let mut out = 0.0;
        for _ in 0..50 {
            out = filter.update(1.0, 0.0, 1e6);
        }
        assert!(out.abs() < 1e-3, "estimate drifted to {out}");
    }

    #[test]
    fn gain_decreases_as_estimates_settle() {
        let mut filter = ScalarKalman::seeded(0.5);
        filter.update(0.5, 0.005, 0.05);
        let first = filter.last_gain();
        for _ in 0..20 {
            filter.update(0.5, 0.005, 0.05);
        }
        assert!(filter.last_gain() < first);
    }

    #[test]
    fn default_noise_update_matches_hand_computed_value() {
        // Seed 0.0 (covariance 1.0), one update toward 1.0 with q = 0.005,
        // r = 0.05: gain = 1.005 / 1.055, estimate = gain.
        let mut filter = ScalarKalman::seeded(0.0);
        let out = filter.update(1.0, 0.005, 0.05);
        assert!((out - 0.952_606_6).abs() < 1e-4);
    }
}
