mod compositor;
mod pattern;
pub mod types;

pub use compositor::OverlayCompositor;
pub use pattern::synthesize;
pub use types::{
    Color, FinishPreset, GlossOptions, GlossRenderer, GradientDirection, NailRegion, PatternKind,
    RenderOptions,
};
