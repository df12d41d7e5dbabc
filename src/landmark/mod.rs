mod adaptive;
mod kalman;
mod stabilizer;
pub mod types;

pub use adaptive::{AdaptiveLandmarkStabilizer, MotionPresetSelector};
pub use stabilizer::LandmarkStabilizer;
pub use types::{Landmark, LandmarkParams};
