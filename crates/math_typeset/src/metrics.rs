//! Glyph Metrics - The narrow interface to the external font service
//!
//! Layout never talks to a platform font API. Everything it needs about
//! individual glyphs (identifier, advance, ink bounds) and about the face as a
//! whole (units per em, ascender, descender) comes through
//! [`GlyphMetricsProvider`]. All values are in font design units.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a glyph inside a font
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GlyphId(pub u16);

impl GlyphId {
    /// The glyph used for characters the font cannot map
    pub const NOTDEF: GlyphId = GlyphId(0);
}

/// Ink bounding box of a glyph, y axis pointing up, baseline at y = 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlyphBounds {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl GlyphBounds {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Part of the ink above the baseline
    pub fn ascent(&self) -> f32 {
        self.y_max.max(0.0)
    }

    /// Part of the ink below the baseline
    pub fn descent(&self) -> f32 {
        (-self.y_min).max(0.0)
    }

    pub fn width(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0)
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            x_min: self.x_min * factor,
            y_min: self.y_min * factor,
            x_max: self.x_max * factor,
            y_max: self.y_max * factor,
        }
    }
}

/// Glyph-level metrics supplied by the font service.
///
/// Implementations must be cheap to query and safe to share between threads;
/// layout passes running in parallel read the same provider.
pub trait GlyphMetricsProvider: Send + Sync {
    /// Design units per em
    fn units_per_em(&self) -> u16;

    /// Map a character to a glyph, [`GlyphId::NOTDEF`] when unmapped
    fn glyph_id(&self, ch: char) -> GlyphId;

    /// Horizontal advance of a glyph
    fn advance(&self, glyph: GlyphId) -> f32;

    /// Ink bounding box of a glyph
    fn bounds(&self, glyph: GlyphId) -> GlyphBounds;

    /// Typographic ascender of the face (positive)
    fn ascender(&self) -> f32;

    /// Typographic descender of the face (positive, below the baseline)
    fn descender(&self) -> f32;

    /// x-height of the face, when the font reports one
    fn x_height(&self) -> Option<f32> {
        None
    }
}

/// Metrics of one glyph in a [`StaticGlyphMetrics`] table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphRecord {
    pub id: GlyphId,
    /// Character mapped to this glyph, if any
    #[serde(default)]
    pub ch: Option<char>,
    pub advance: f32,
    pub bounds: GlyphBounds,
}

/// An in-memory [`GlyphMetricsProvider`] for hosts that precompute metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StaticMetricsData", into = "StaticMetricsData")]
pub struct StaticGlyphMetrics {
    units_per_em: u16,
    ascender: f32,
    descender: f32,
    x_height: Option<f32>,
    cmap: HashMap<char, GlyphId>,
    glyphs: HashMap<GlyphId, GlyphRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StaticMetricsData {
    units_per_em: u16,
    ascender: f32,
    descender: f32,
    #[serde(default)]
    x_height: Option<f32>,
    glyphs: Vec<GlyphRecord>,
}

impl From<StaticMetricsData> for StaticGlyphMetrics {
    fn from(data: StaticMetricsData) -> Self {
        let mut metrics = StaticGlyphMetrics::new(data.units_per_em, data.ascender, data.descender);
        metrics.x_height = data.x_height;
        for record in data.glyphs {
            metrics.insert(record);
        }
        metrics
    }
}

impl From<StaticGlyphMetrics> for StaticMetricsData {
    fn from(metrics: StaticGlyphMetrics) -> Self {
        let mut glyphs: Vec<GlyphRecord> = metrics.glyphs.into_values().collect();
        glyphs.sort_by_key(|g| g.id);
        Self {
            units_per_em: metrics.units_per_em,
            ascender: metrics.ascender,
            descender: metrics.descender,
            x_height: metrics.x_height,
            glyphs,
        }
    }
}

impl StaticGlyphMetrics {
    pub fn new(units_per_em: u16, ascender: f32, descender: f32) -> Self {
        Self {
            units_per_em,
            ascender,
            descender,
            x_height: None,
            cmap: HashMap::new(),
            glyphs: HashMap::new(),
        }
    }

    pub fn with_x_height(mut self, x_height: f32) -> Self {
        self.x_height = Some(x_height);
        self
    }

    /// Add or replace a glyph
    pub fn insert(&mut self, record: GlyphRecord) {
        if let Some(ch) = record.ch {
            self.cmap.insert(ch, record.id);
        }
        self.glyphs.insert(record.id, record);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_glyph(
        mut self,
        id: u16,
        ch: Option<char>,
        advance: f32,
        bounds: GlyphBounds,
    ) -> Self {
        self.insert(GlyphRecord {
            id: GlyphId(id),
            ch,
            advance,
            bounds,
        });
        self
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

impl GlyphMetricsProvider for StaticGlyphMetrics {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        self.cmap.get(&ch).copied().unwrap_or(GlyphId::NOTDEF)
    }

    fn advance(&self, glyph: GlyphId) -> f32 {
        self.glyphs.get(&glyph).map(|g| g.advance).unwrap_or(0.0)
    }

    fn bounds(&self, glyph: GlyphId) -> GlyphBounds {
        self.glyphs
            .get(&glyph)
            .map(|g| g.bounds)
            .unwrap_or_default()
    }

    fn ascender(&self) -> f32 {
        self.ascender
    }

    fn descender(&self) -> f32 {
        self.descender
    }

    fn x_height(&self) -> Option<f32> {
        self.x_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_split_at_baseline() {
        let b = GlyphBounds::new(10.0, -200.0, 510.0, 700.0);
        assert_eq!(b.ascent(), 700.0);
        assert_eq!(b.descent(), 200.0);
        assert_eq!(b.width(), 500.0);

        // Entirely above the baseline: nothing below it
        let raised = GlyphBounds::new(0.0, 300.0, 100.0, 600.0);
        assert_eq!(raised.descent(), 0.0);
        assert_eq!(raised.ascent(), 600.0);
    }

    #[test]
    fn test_static_metrics_lookup() {
        let metrics = StaticGlyphMetrics::new(1000, 800.0, 200.0).with_glyph(
            5,
            Some('x'),
            520.0,
            GlyphBounds::new(0.0, 0.0, 500.0, 450.0),
        );

        assert_eq!(metrics.glyph_id('x'), GlyphId(5));
        assert_eq!(metrics.glyph_id('y'), GlyphId::NOTDEF);
        assert_eq!(metrics.advance(GlyphId(5)), 520.0);
        assert_eq!(metrics.bounds(GlyphId(5)).ascent(), 450.0);
        assert_eq!(metrics.advance(GlyphId(42)), 0.0);
    }

    #[test]
    fn test_static_metrics_json() {
        let json = r#"{
            "units_per_em": 2048,
            "ascender": 1600,
            "descender": 400,
            "glyphs": [
                { "id": 3, "ch": "a", "advance": 1000,
                  "bounds": { "x_min": 0, "y_min": -10, "x_max": 950, "y_max": 1000 } },
                { "id": 4, "advance": 600,
                  "bounds": { "x_min": 0, "y_min": 0, "x_max": 600, "y_max": 300 } }
            ]
        }"#;
        let metrics: StaticGlyphMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.units_per_em(), 2048);
        assert_eq!(metrics.glyph_count(), 2);
        assert_eq!(metrics.glyph_id('a'), GlyphId(3));
        assert_eq!(metrics.bounds(GlyphId(3)).descent(), 10.0);
        assert_eq!(metrics.x_height(), None);
    }
}
