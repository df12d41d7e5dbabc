mod adaptive;
mod feather;
mod morphology;
mod resample;
mod stabilizer;
pub mod types;

pub use adaptive::{AdaptiveMaskStabilizer, ChangePresetSelector};
pub use feather::{feather, gaussian_kernel};
pub use morphology::{close, dilate, erode, open};
pub use resample::{mask_to_rgba, resize_mask};
pub use stabilizer::MaskStabilizer;
pub use types::{Mask, MaskConfig, MaskParams};
