use image::RgbaImage;

/// RGB polish color
pub type Color = [u8; 3];

/// Bounding geometry for one detected nail, in source-frame pixels.
///
/// Supplied by the perception stage each frame. Regions may extend past the
/// frame edges while a nail slides out of view; off-frame pixels are simply
/// skipped during compositing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NailRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// In-plane nail angle in radians, straight up = 0
    pub rotation: f32,
}

/// Overlay fill patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternKind {
    /// Single flat color
    #[default]
    Solid,
    /// Linear blend across evenly spaced color stops
    Gradient,
    /// Classic french manicure: light tip over a base color
    French,
    /// Gradient locked to the vertical axis, first stop at the tip
    Ombre,
    /// Base color speckled with bright dots
    Glitter,
}

/// Axis of a linear gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientDirection {
    #[default]
    Vertical,
    Horizontal,
    Diagonal,
}

/// Finish preset forwarded to the gloss collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishPreset {
    #[default]
    Glossy,
    Matte,
    Satin,
}

/// Per-call rendering options.
///
/// Nothing here is persisted between frames; callers rebuild or reuse the
/// struct as they see fit.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub pattern: PatternKind,
    /// Base polish color
    pub color: Color,
    /// Tip color for the french pattern
    pub tip_color: Color,
    /// Ordered color stops for gradient and ombre patterns; when empty the
    /// base color is used alone
    pub stops: Vec<Color>,
    pub direction: GradientDirection,
    /// Global opacity multiplied into the per-pixel mask coverage
    pub opacity: f32,
    /// Brighten the overlay uniformly before compositing
    pub glow: bool,
    /// Glow strength as a fraction of full brightness
    pub glow_intensity: f32,
    /// Run the gloss collaborator, when one is attached
    pub gloss: bool,
    pub finish: FinishPreset,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pattern: PatternKind::Solid,
            color: [196, 30, 58],
            tip_color: [255, 255, 255],
            stops: Vec::new(),
            direction: GradientDirection::Vertical,
            opacity: 1.0,
            glow: false,
            glow_intensity: 0.3,
            gloss: false,
            finish: FinishPreset::Glossy,
        }
    }
}

/// Partial settings update for the gloss collaborator. `None` fields leave
/// the collaborator's current value alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlossOptions {
    /// Highlight intensity in [0, 1]
    pub intensity: Option<f32>,
    /// Scale factor for the highlight footprint
    pub highlight_scale: Option<f32>,
}

/// Specular shading collaborator.
///
/// Consumed, not implemented, by this crate: the compositor asks for one
/// scene-brightness estimate per frame (from the unmodified source) and then
/// hands each freshly synthesized overlay, with its coverage crop, over for
/// shading before compositing.
pub trait GlossRenderer {
    /// Estimate overall scene brightness in [0, 1] from the source frame.
    /// Called once per frame, before any region is composited.
    fn estimate_scene_brightness(&mut self, source: &RgbaImage) -> f32;

    /// Shade one region overlay in place. `coverage` is the stabilized mask
    /// cropped to the overlay's dimensions, row-major.
    fn apply(&mut self, overlay: &mut RgbaImage, coverage: &[f32]);

    fn set_finish(&mut self, finish: FinishPreset);

    /// Apply a partial settings update.
    fn update_options(&mut self, options: &GlossOptions) {
        // Default: stateless collaborators have nothing to update.
        let _ = options;
    }
}
