//! Fonts - A loaded face plus a point size
//!
//! [`FontFace`] is what the font service hands back: glyph metrics and the
//! math table, immutable once loaded. [`MathFont`] binds a face to a point size
//! and answers every query in points, scaling design units by
//! `size / units_per_em`.

use crate::math_table::{Axis, FontMathTable, GlyphPart, MathConstant};
use crate::metrics::{GlyphBounds, GlyphId, GlyphMetricsProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a font face
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontId(pub String);

impl FontId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded font face with its math table
pub struct FontFace {
    id: FontId,
    metrics: Arc<dyn GlyphMetricsProvider>,
    math_table: FontMathTable,
    has_math_table: bool,
}

impl FontFace {
    /// Create a face. Without a math table, constants are derived from the
    /// face's plain metrics; a partial table is completed the same way.
    pub fn new(
        id: FontId,
        metrics: Arc<dyn GlyphMetricsProvider>,
        math_table: Option<FontMathTable>,
    ) -> Self {
        let heuristic = FontMathTable::heuristic(metrics.as_ref());
        match math_table {
            Some(table) => Self {
                id,
                metrics,
                math_table: table.with_fallback_constants(&heuristic),
                has_math_table: true,
            },
            None => {
                tracing::debug!(font = %id, "font has no math table, using heuristic constants");
                Self {
                    id,
                    metrics,
                    math_table: heuristic,
                    has_math_table: false,
                }
            }
        }
    }

    pub fn id(&self) -> &FontId {
        &self.id
    }

    pub fn metrics(&self) -> &dyn GlyphMetricsProvider {
        self.metrics.as_ref()
    }

    pub fn math_table(&self) -> &FontMathTable {
        &self.math_table
    }

    /// Whether the font carried real math data
    pub fn has_math_table(&self) -> bool {
        self.has_math_table
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("id", &self.id)
            .field("units_per_em", &self.metrics.units_per_em())
            .field("has_math_table", &self.has_math_table)
            .finish()
    }
}

/// Advance and ink bounds of a glyph, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    pub advance: f32,
    pub bounds: GlyphBounds,
}

impl GlyphMetrics {
    pub fn ascent(&self) -> f32 {
        self.bounds.ascent()
    }

    pub fn descent(&self) -> f32 {
        self.bounds.descent()
    }

    pub fn height(&self) -> f32 {
        self.ascent() + self.descent()
    }
}

/// A font face at a specific point size
#[derive(Clone)]
pub struct MathFont {
    face: Arc<FontFace>,
    size: f32,
    glyph_scale: f32,
    table_scale: f32,
    constants: Arc<[f32; MathConstant::ALL.len()]>,
}

impl MathFont {
    pub fn new(face: Arc<FontFace>, size: f32) -> Self {
        let glyph_scale = size / face.metrics().units_per_em().max(1) as f32;
        let table_scale = size / face.math_table().units_per_em().max(1) as f32;

        let mut constants = [0.0; MathConstant::ALL.len()];
        for constant in MathConstant::ALL {
            let raw = face.math_table().constant(constant).unwrap_or(0.0);
            constants[constant.index()] = if constant.is_percent() {
                raw / 100.0
            } else {
                raw * table_scale
            };
        }

        Self {
            face,
            size,
            glyph_scale,
            table_scale,
            constants: Arc::new(constants),
        }
    }

    /// Same face at another size
    pub fn with_size(&self, size: f32) -> Self {
        Self::new(self.face.clone(), size)
    }

    pub fn id(&self) -> &FontId {
        self.face.id()
    }

    pub fn face(&self) -> &Arc<FontFace> {
        &self.face
    }

    /// Point size
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn has_math_table(&self) -> bool {
        self.face.has_math_table()
    }

    /// A math constant scaled to this size; percent constants as fractions
    pub fn constant(&self, constant: MathConstant) -> f32 {
        self.constants[constant.index()]
    }

    /// One math unit, 1/18 em
    pub fn mu(&self) -> f32 {
        self.size / 18.0
    }

    pub fn glyph_id(&self, ch: char) -> GlyphId {
        self.face.metrics().glyph_id(ch)
    }

    pub fn glyph_metrics(&self, glyph: GlyphId) -> GlyphMetrics {
        let metrics = self.face.metrics();
        GlyphMetrics {
            advance: metrics.advance(glyph) * self.glyph_scale,
            bounds: metrics.bounds(glyph).scaled(self.glyph_scale),
        }
    }

    /// Variants of a glyph from smallest to largest, the glyph itself first
    pub fn glyph_variants(&self, glyph: GlyphId, axis: Axis) -> Vec<GlyphId> {
        match self.face.math_table().variants(glyph, axis) {
            Some(listed) if listed.first() == Some(&glyph) => listed.to_vec(),
            Some(listed) => std::iter::once(glyph).chain(listed.iter().copied()).collect(),
            None => vec![glyph],
        }
    }

    /// Assembly parts of a glyph scaled to this size, if the font has any
    pub fn glyph_assembly_parts(&self, glyph: GlyphId, axis: Axis) -> Option<Vec<GlyphPart>> {
        self.face.math_table().assembly(glyph, axis).map(|assembly| {
            assembly
                .parts
                .iter()
                .map(|part| part.scaled(self.table_scale))
                .collect()
        })
    }

    pub fn min_connector_overlap(&self) -> f32 {
        self.face.math_table().min_connector_overlap() * self.table_scale
    }

    pub fn italic_correction(&self, glyph: GlyphId) -> f32 {
        self.face
            .math_table()
            .italic_correction(glyph)
            .map(|v| v * self.table_scale)
            .unwrap_or(0.0)
    }

    /// Horizontal position where an accent attaches; half the advance when
    /// the font does not say
    pub fn top_accent_attachment(&self, glyph: GlyphId) -> f32 {
        match self.face.math_table().top_accent_attachment(glyph) {
            Some(value) => value * self.table_scale,
            None => self.glyph_metrics(glyph).advance / 2.0,
        }
    }

    /// The display-style form of an operator: the first larger vertical
    /// variant at least `min_height` tall, else the largest one
    pub fn larger_glyph(&self, glyph: GlyphId, min_height: f32) -> GlyphId {
        let variants = self.glyph_variants(glyph, Axis::Vertical);
        let mut chosen = glyph;
        for variant in variants.into_iter().filter(|v| *v != glyph) {
            chosen = variant;
            if self.glyph_metrics(variant).height() >= min_height {
                break;
            }
        }
        chosen
    }
}

impl fmt::Debug for MathFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MathFont")
            .field("id", self.id())
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::StaticGlyphMetrics;

    fn face(table: Option<FontMathTable>) -> Arc<FontFace> {
        let metrics = StaticGlyphMetrics::new(1000, 800.0, 200.0)
            .with_glyph(1, Some('x'), 500.0, GlyphBounds::new(0.0, 0.0, 480.0, 450.0))
            .with_glyph(2, None, 600.0, GlyphBounds::new(0.0, -500.0, 600.0, 900.0))
            .with_glyph(3, None, 700.0, GlyphBounds::new(0.0, -800.0, 700.0, 1400.0));
        Arc::new(FontFace::new(FontId::new("test"), Arc::new(metrics), table))
    }

    #[test]
    fn test_constants_scale_with_size() {
        let table = FontMathTable::new(1000)
            .with_constant(MathConstant::AxisHeight, 300.0)
            .with_constant(MathConstant::ScriptPercentScaleDown, 70.0);
        let font = MathFont::new(face(Some(table)), 20.0);

        assert!((font.constant(MathConstant::AxisHeight) - 6.0).abs() < 1e-5);
        assert!((font.constant(MathConstant::ScriptPercentScaleDown) - 0.7).abs() < 1e-6);

        let small = font.with_size(10.0);
        assert!((small.constant(MathConstant::AxisHeight) - 3.0).abs() < 1e-5);
        assert!((small.constant(MathConstant::ScriptPercentScaleDown) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_missing_table_uses_heuristics() {
        let font = MathFont::new(face(None), 12.0);
        assert!(!font.has_math_table());
        assert!(font.constant(MathConstant::AxisHeight) > 0.0);
        assert!(font.constant(MathConstant::FractionRuleThickness) > 0.0);
        assert_eq!(font.glyph_variants(GlyphId(2), Axis::Vertical), vec![GlyphId(2)]);
        assert!(font.glyph_assembly_parts(GlyphId(2), Axis::Vertical).is_none());
    }

    #[test]
    fn test_partial_table_with_other_em_size_matches_heuristics() {
        let metrics: Arc<dyn GlyphMetricsProvider> =
            Arc::new(StaticGlyphMetrics::new(2000, 1600.0, 400.0).with_x_height(900.0));
        let plain = FontFace::new(FontId::new("plain"), metrics.clone(), None);
        let partial = FontFace::new(
            FontId::new("partial"),
            metrics,
            Some(FontMathTable::new(1000)),
        );
        let plain = MathFont::new(Arc::new(plain), 10.0);
        let partial = MathFont::new(Arc::new(partial), 10.0);

        for constant in [
            MathConstant::AxisHeight,
            MathConstant::FractionRuleThickness,
            MathConstant::SuperscriptShiftUp,
            MathConstant::ScriptPercentScaleDown,
        ] {
            assert!(
                (plain.constant(constant) - partial.constant(constant)).abs() < 1e-4,
                "{:?} differs",
                constant
            );
        }
    }

    #[test]
    fn test_glyph_metrics_scaled() {
        let font = MathFont::new(face(None), 10.0);
        let x = font.glyph_metrics(font.glyph_id('x'));
        assert!((x.advance - 5.0).abs() < 1e-5);
        assert!((x.ascent() - 4.5).abs() < 1e-5);
        assert_eq!(x.descent(), 0.0);
    }

    #[test]
    fn test_variants_start_with_base_glyph() {
        let table =
            FontMathTable::new(1000).with_variants(GlyphId(2), Axis::Vertical, vec![GlyphId(3)]);
        let font = MathFont::new(face(Some(table)), 10.0);
        assert_eq!(
            font.glyph_variants(GlyphId(2), Axis::Vertical),
            vec![GlyphId(2), GlyphId(3)]
        );
    }

    #[test]
    fn test_larger_glyph() {
        let table = FontMathTable::new(1000).with_variants(
            GlyphId(1),
            Axis::Vertical,
            vec![GlyphId(1), GlyphId(2), GlyphId(3)],
        );
        let font = MathFont::new(face(Some(table)), 10.0);

        // Glyph 2 is 14pt tall, glyph 3 is 22pt
        assert_eq!(font.larger_glyph(GlyphId(1), 0.0), GlyphId(2));
        assert_eq!(font.larger_glyph(GlyphId(1), 20.0), GlyphId(3));
        assert_eq!(font.larger_glyph(GlyphId(1), 100.0), GlyphId(3));
        assert_eq!(font.larger_glyph(GlyphId(3), 0.0), GlyphId(3));
    }

    #[test]
    fn test_top_accent_attachment_defaults_to_half_advance() {
        let table = FontMathTable::new(1000).with_top_accent_attachment(GlyphId(2), 100.0);
        let font = MathFont::new(face(Some(table)), 10.0);
        assert!((font.top_accent_attachment(GlyphId(1)) - 2.5).abs() < 1e-5);
        assert!((font.top_accent_attachment(GlyphId(2)) - 1.0).abs() < 1e-5);
    }
}
