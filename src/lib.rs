//! # Lacquer
//!
//! Real-time stabilization and compositing core for a live-camera nail
//! polish try-on effect.
//!
//! Every frame, an external perception model hands over a noisy nail
//! segmentation mask, a noisy hand landmark list and per-nail region
//! geometry. This crate turns that into temporally smooth output and renders
//! a colored, patterned polish overlay onto the frame:
//!
//! - [`landmark`]: per-axis Kalman filtering plus exponential smoothing over
//!   the landmark list, with a motion-adaptive tuning policy
//! - [`mask`]: temporal blending, morphological cleanup, edge feathering and
//!   change gating over the segmentation mask, with a change-adaptive policy
//! - [`overlay`]: pattern synthesis and coverage-weighted alpha compositing,
//!   delegating specular shading to an external [`overlay::GlossRenderer`]
//!
//! [`pipeline::FramePipeline`] wires the three together for one tracked
//! hand. Frame processing never fails; bad per-frame input degrades to a
//! logged reset or pass-through, and only construction returns errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lacquer::overlay::RenderOptions;
//! use lacquer::pipeline::{FramePipeline, PerceptionInput, PipelineConfig};
//!
//! let mut pipeline = FramePipeline::new(PipelineConfig::default())?;
//! let mut frame = image::RgbaImage::new(640, 480);
//! # let mask = vec![0.0f32; 256 * 256];
//! # let (landmarks, regions) = (Vec::new(), Vec::new());
//! let output = pipeline.process_frame(
//!     &mut frame,
//!     &PerceptionInput {
//!         mask: &mask,
//!         mask_width: 256,
//!         mask_height: 256,
//!         landmarks: &landmarks,
//!         regions: &regions,
//!     },
//!     &RenderOptions::default(),
//! );
//! println!("stabilized {} landmarks", output.landmarks.len());
//! # Ok::<(), lacquer::ConfigError>(())
//! ```

pub mod error;
pub mod landmark;
pub mod mask;
pub mod overlay;
pub mod pipeline;

pub use error::{ConfigError, Result};
