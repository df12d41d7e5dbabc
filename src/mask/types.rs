/// Segmentation mask: per-pixel coverage where 0.0 = background and
/// 1.0 = nail, flattened in row-major order. Dimensions travel alongside
/// the buffer as explicit width/height arguments.
pub type Mask = Vec<f32>;

/// Tuning the adaptive policy swaps per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskParams {
    /// Weight of the freshly recomputed mask against the previous stable
    /// one; higher tracks faster, lower smooths harder
    pub smoothing: f32,
    /// Mean absolute per-pixel change below which the previous stable mask
    /// is reused verbatim
    pub change_threshold: f32,
    /// Blur reach around detected mask edges, in pixels
    pub feather_radius: usize,
}

impl MaskParams {
    /// Middle-ground default for ordinary hand motion
    pub const BALANCED: Self = Self {
        smoothing: 0.35,
        change_threshold: 0.02,
        feather_radius: 2,
    };

    /// Rapidly changing mask: track closely, gate rarely, feather lightly
    pub const RESPONSIVE: Self = Self {
        smoothing: 0.55,
        change_threshold: 0.005,
        feather_radius: 1,
    };

    /// Nearly static mask: smooth hard, gate eagerly, feather generously
    pub const STEADY: Self = Self {
        smoothing: 0.2,
        change_threshold: 0.03,
        feather_radius: 3,
    };
}

impl Default for MaskParams {
    fn default() -> Self {
        Self::BALANCED
    }
}

/// Structural knobs fixed for the lifetime of a stabilizer.
#[derive(Debug, Clone, Copy)]
pub struct MaskConfig {
    /// Raw-mask history depth for the temporal blend
    pub history_depth: usize,
    /// Morphological structuring element side length; odd
    pub kernel_size: usize,
    /// Whether the open/close cleanup runs at all
    pub morphology: bool,
    /// A recompute is forced once this many consecutive frames have been
    /// served from the change gate
    pub max_stale_frames: u32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            history_depth: 3,
            kernel_size: 3,
            morphology: true,
            max_stale_frames: 30,
        }
    }
}
