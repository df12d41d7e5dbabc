/// A single tracked hand landmark in normalized [0, 1] frame coordinates.
///
/// Identity is positional: landmark `i` in one frame corresponds to landmark
/// `i` in the next (e.g. the common 21-point hand layout with wrist = 0 and
/// fingertips at 4, 8, 12, 16, 20). Depth is optional because not every
/// perception backend reports it; when the first frame of a tracking run
/// carries depth on every point, depth is filtered too, otherwise it passes
/// through untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist, when the perception backend provides it
    pub z: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// Tuning for the Kalman + exponential smoothing pass.
///
/// Grouped so the adaptive policy can swap all three knobs atomically per
/// frame without touching accumulated filter state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkParams {
    /// Kalman process noise q: how much the true position is trusted to move
    /// between frames
    pub process_noise: f32,
    /// Kalman measurement noise r: how jittery the raw landmarks are
    pub measurement_noise: f32,
    /// Weight of the current filtered value against the previous stabilized
    /// frame; higher tracks faster, lower smooths harder
    pub smoothing: f32,
}

impl LandmarkParams {
    /// Middle-ground default for ordinary hand motion
    pub const BALANCED: Self = Self {
        process_noise: 0.005,
        measurement_noise: 0.05,
        smoothing: 0.3,
    };

    /// Fast hand movement: trust measurements, loosen smoothing
    pub const RESPONSIVE: Self = Self {
        process_noise: 0.01,
        measurement_noise: 0.03,
        smoothing: 0.5,
    };

    /// Nearly still hand: filter aggressively to pin residual jitter
    pub const STEADY: Self = Self {
        process_noise: 0.001,
        measurement_noise: 0.1,
        smoothing: 0.2,
    };
}

impl Default for LandmarkParams {
    fn default() -> Self {
        Self::BALANCED
    }
}
