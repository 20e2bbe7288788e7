//! Extensible Glyphs - Variant selection and glyph assembly
//!
//! Delimiters, radical signs and wide accents have to grow with their
//! content. A math font lists progressively larger pre-drawn variants of such
//! glyphs and, for arbitrary sizes, a recipe of parts (ends, optional middle,
//! repeatable extenders) that overlap at their connectors. The assembler
//! prefers a single variant and only builds an assembly when no variant is
//! large enough.

use crate::config::LayoutConfig;
use crate::display::{ConstructedGlyph, DisplayBox, GlyphBox, VerticalShift};
use crate::font::MathFont;
use crate::math_table::{Axis, GlyphPart};
use crate::metrics::GlyphId;
use std::ops::Range;

/// Result of sizing an extensible glyph
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensibleGlyph {
    Variant(GlyphBox),
    Constructed(ConstructedGlyph),
}

impl ExtensibleGlyph {
    /// Unshifted ascent
    pub fn ascent(&self) -> f32 {
        match self {
            ExtensibleGlyph::Variant(g) => g.ascent,
            ExtensibleGlyph::Constructed(c) => c.ascent,
        }
    }

    /// Unshifted descent
    pub fn descent(&self) -> f32 {
        match self {
            ExtensibleGlyph::Variant(g) => g.descent,
            ExtensibleGlyph::Constructed(c) => c.descent,
        }
    }

    pub fn height(&self) -> f32 {
        self.ascent() + self.descent()
    }

    pub fn width(&self) -> f32 {
        match self {
            ExtensibleGlyph::Variant(g) => g.width,
            ExtensibleGlyph::Constructed(c) => c.width,
        }
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self, ExtensibleGlyph::Constructed(_))
    }

    pub fn into_display(self, range: Range<usize>) -> DisplayBox {
        match self {
            ExtensibleGlyph::Variant(g) => DisplayBox::glyph(g, range),
            ExtensibleGlyph::Constructed(c) => DisplayBox::constructed(c, range),
        }
    }
}

impl VerticalShift for ExtensibleGlyph {
    fn shift_down(&self) -> f32 {
        match self {
            ExtensibleGlyph::Variant(g) => g.shift_down(),
            ExtensibleGlyph::Constructed(c) => c.shift_down(),
        }
    }

    fn with_shift_down(self, shift_down: f32) -> Self {
        match self {
            ExtensibleGlyph::Variant(g) => ExtensibleGlyph::Variant(g.with_shift_down(shift_down)),
            ExtensibleGlyph::Constructed(c) => {
                ExtensibleGlyph::Constructed(c.with_shift_down(shift_down))
            }
        }
    }
}

/// Sizes extensible glyphs of one font
pub struct ExtensibleGlyphAssembler<'a> {
    font: &'a MathFont,
    max_extender_repeats: usize,
}

impl<'a> ExtensibleGlyphAssembler<'a> {
    pub fn new(font: &'a MathFont) -> Self {
        Self::with_config(font, &LayoutConfig::default())
    }

    pub fn with_config(font: &'a MathFont, config: &LayoutConfig) -> Self {
        Self {
            font,
            max_extender_repeats: config.max_extender_repeats,
        }
    }

    /// Size `glyph` to at least `target` along `axis`.
    ///
    /// Returns the first variant that is large enough. Otherwise an assembly
    /// is built from the font's parts; without parts the largest variant is
    /// returned even though it falls short.
    pub fn build(&self, glyph: GlyphId, target: f32, axis: Axis) -> ExtensibleGlyph {
        let mut largest = glyph;
        for variant in self.font.glyph_variants(glyph, axis) {
            largest = variant;
            if self.extent(variant, axis) >= target {
                return ExtensibleGlyph::Variant(GlyphBox::new(variant, self.font));
            }
        }

        match self.font.glyph_assembly_parts(glyph, axis) {
            Some(parts) => {
                tracing::trace!(glyph = glyph.0, target, ?axis, "constructing glyph assembly");
                if let Some(constructed) = self.construct(&parts, target, axis) {
                    return ExtensibleGlyph::Constructed(constructed);
                }
                tracing::warn!(
                    glyph = glyph.0,
                    target,
                    max_repeats = self.max_extender_repeats,
                    "glyph assembly cannot reach target size"
                );
            }
            None => {
                tracing::warn!(
                    glyph = glyph.0,
                    target,
                    available = self.extent(largest, axis),
                    "no glyph assembly, using largest variant"
                );
            }
        }
        ExtensibleGlyph::Variant(GlyphBox::new(largest, self.font))
    }

    /// The widest variant of `glyph` not exceeding `max` along `axis`, or the
    /// base glyph when even that is too wide. When every variant is smaller
    /// than `max` and the font has parts for the glyph, an assembly of
    /// exactly `max` is built instead.
    pub fn widest_within(&self, glyph: GlyphId, max: f32, axis: Axis) -> ExtensibleGlyph {
        let variants = self.font.glyph_variants(glyph, axis);
        let mut chosen = glyph;
        let mut all_fit = true;
        for variant in variants {
            if self.extent(variant, axis) > max {
                all_fit = false;
                break;
            }
            chosen = variant;
        }

        if all_fit && self.extent(chosen, axis) < max {
            if let Some(parts) = self.font.glyph_assembly_parts(glyph, axis) {
                if let Some(constructed) = self.construct(&parts, max, axis) {
                    if constructed.extent <= max + f32::EPSILON * max.abs().max(1.0) {
                        return ExtensibleGlyph::Constructed(constructed);
                    }
                }
            }
        }
        ExtensibleGlyph::Variant(GlyphBox::new(chosen, self.font))
    }

    fn extent(&self, glyph: GlyphId, axis: Axis) -> f32 {
        let metrics = self.font.glyph_metrics(glyph);
        match axis {
            Axis::Vertical => metrics.height(),
            Axis::Horizontal => metrics.bounds.width(),
        }
    }

    /// Repeat the extenders 0, 1, 2, ... times until the parts, overlapped
    /// as much as their connectors allow, reach `target`; if they can reach it
    /// by overlapping less, spread the slack evenly over every joint.
    fn construct(&self, parts: &[GlyphPart], target: f32, axis: Axis) -> Option<ConstructedGlyph> {
        let has_extender = parts.iter().any(|p| p.is_extender);
        let min_overlap = self.font.min_connector_overlap();

        for repeats in 0..=self.max_extender_repeats {
            let mut glyphs = Vec::new();
            let mut offsets = Vec::new();
            let mut prev: Option<&GlyphPart> = None;
            let mut offset = 0.0f32;
            let mut max_delta = f32::MAX;

            for part in parts {
                let count = if part.is_extender { repeats } else { 1 };
                for _ in 0..count {
                    if let Some(prev) = prev {
                        let max_overlap = prev.end_connector_length.min(part.start_connector_length);
                        let min_offset_delta = prev.full_advance - max_overlap;
                        let max_offset_delta = prev.full_advance - min_overlap;
                        max_delta = max_delta.min(max_offset_delta - min_offset_delta);
                        offset += min_offset_delta;
                    }
                    glyphs.push(part.glyph);
                    offsets.push(offset);
                    prev = Some(part);
                }
            }

            let Some(last) = prev else {
                // Only extenders and none requested yet
                if has_extender {
                    continue;
                }
                return None;
            };

            let min_extent = offset + last.full_advance;
            if min_extent >= target {
                return Some(self.assembled(glyphs, offsets, min_extent, axis));
            }

            let joints = glyphs.len() - 1;
            if joints > 0 {
                let max_delta = max_delta.max(0.0);
                let max_extent = min_extent + max_delta * joints as f32;
                if target <= max_extent {
                    let step = (target - min_extent) / joints as f32;
                    for (i, offset) in offsets.iter_mut().enumerate() {
                        *offset += i as f32 * step;
                    }
                    return Some(self.assembled(glyphs, offsets, target, axis));
                }
            }

            if !has_extender {
                return None;
            }
        }
        None
    }

    fn assembled(
        &self,
        glyphs: Vec<GlyphId>,
        offsets: Vec<f32>,
        extent: f32,
        axis: Axis,
    ) -> ConstructedGlyph {
        let metrics: Vec<_> = glyphs.iter().map(|g| self.font.glyph_metrics(*g)).collect();
        let (ascent, descent, width) = match axis {
            // Parts stack upwards from the baseline; callers shift the result
            Axis::Vertical => (
                extent,
                0.0,
                metrics.iter().map(|m| m.advance).fold(0.0f32, f32::max),
            ),
            Axis::Horizontal => (
                metrics.iter().map(|m| m.ascent()).fold(0.0f32, f32::max),
                metrics.iter().map(|m| m.descent()).fold(0.0f32, f32::max),
                extent,
            ),
        };

        ConstructedGlyph {
            glyphs,
            offsets,
            axis,
            extent,
            font_size: self.font.size(),
            ascent,
            descent,
            width,
            shift_down: 0.0,
        }
    }
}
