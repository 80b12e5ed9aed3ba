//! Font measurement used for line wrapping and line heights.

/// Font measurement abstraction.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// Layout only needs advance widths (to decide where lines wrap) and line
/// heights (to give blocks a height). Anything that can answer those two
/// questions can drive the builder.
pub trait FontMetrics {
    /// Total advance width of `text` at `font_size`.
    fn text_width(&self, text: &[char], font_size: f32) -> f32;

    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "We recommend a used value for 'normal' between 1.0 and 1.2."
    fn line_height(&self, font_size: f32) -> f32;
}

/// Approximate font metrics using fixed ratios.
///
/// Every glyph advances 0.6× the font size (typical for proportional Latin
/// body text) and lines are 1.2× the font size tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &[char], font_size: f32) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        text.len() as f32 * font_size * CHAR_WIDTH_RATIO
    }

    fn line_height(&self, font_size: f32) -> f32 {
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        font_size * LINE_HEIGHT_RATIO
    }
}
