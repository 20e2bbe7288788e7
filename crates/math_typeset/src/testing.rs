//! Fixture font shared by the unit tests
//!
//! 1000 units per em. Glyph outlines are plain boxes; the math table carries
//! radical and operator variants, a vertical radical assembly and a horizontal
//! accent assembly.

use crate::font::{FontFace, FontId, MathFont};
use crate::math_table::{Axis, FontMathTable, GlyphAssembly, GlyphPart, MathConstant};
use crate::metrics::{GlyphBounds, GlyphId, StaticGlyphMetrics};
use std::sync::Arc;

pub const RADICAL: GlyphId = GlyphId(20);
pub const RADICAL_LARGE: GlyphId = GlyphId(21);
pub const RADICAL_LARGER: GlyphId = GlyphId(22);
pub const RADICAL_BOTTOM: GlyphId = GlyphId(23);
pub const RADICAL_EXTENDER: GlyphId = GlyphId(24);
pub const RADICAL_TOP: GlyphId = GlyphId(25);

pub const SUM: GlyphId = GlyphId(30);
pub const SUM_DISPLAY: GlyphId = GlyphId(31);
pub const INTEGRAL: GlyphId = GlyphId(32);
pub const INTEGRAL_DISPLAY: GlyphId = GlyphId(33);

pub const HAT: GlyphId = GlyphId(40);
pub const HAT_WIDE: GlyphId = GlyphId(41);
pub const HAT_WIDER: GlyphId = GlyphId(42);
pub const HAT_LEFT: GlyphId = GlyphId(43);
pub const HAT_EXTENDER: GlyphId = GlyphId(44);
pub const HAT_RIGHT: GlyphId = GlyphId(45);

pub const HAT_CHAR: char = '\u{0302}';

fn b(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> GlyphBounds {
    GlyphBounds::new(x_min, y_min, x_max, y_max)
}

pub fn metrics() -> StaticGlyphMetrics {
    StaticGlyphMetrics::new(1000, 800.0, 200.0)
        .with_x_height(450.0)
        .with_glyph(1, Some('x'), 500.0, b(0.0, 0.0, 480.0, 450.0))
        .with_glyph(2, Some('y'), 500.0, b(0.0, -220.0, 480.0, 450.0))
        .with_glyph(3, Some('o'), 500.0, b(20.0, -250.0, 480.0, 250.0))
        .with_glyph(4, Some('+'), 700.0, b(50.0, -50.0, 650.0, 550.0))
        .with_glyph(5, Some('='), 700.0, b(50.0, 100.0, 650.0, 400.0))
        .with_glyph(6, Some('2'), 500.0, b(30.0, 0.0, 470.0, 680.0))
        .with_glyph(7, Some('1'), 500.0, b(80.0, 0.0, 420.0, 680.0))
        .with_glyph(8, Some('n'), 550.0, b(20.0, 0.0, 530.0, 450.0))
        .with_glyph(9, Some('i'), 300.0, b(30.0, 0.0, 270.0, 660.0))
        .with_glyph(10, Some('a'), 500.0, b(20.0, -10.0, 480.0, 460.0))
        .with_glyph(11, Some('b'), 500.0, b(30.0, -10.0, 470.0, 700.0))
        .with_glyph(12, Some('f'), 400.0, b(0.0, -200.0, 520.0, 700.0))
        .with_glyph(13, Some('('), 350.0, b(80.0, -250.0, 300.0, 750.0))
        .with_glyph(14, Some(')'), 350.0, b(50.0, -250.0, 270.0, 750.0))
        // Radical sign, its variants and assembly parts
        .with_glyph(20, Some('\u{221A}'), 800.0, b(0.0, -200.0, 780.0, 800.0))
        .with_glyph(21, None, 850.0, b(0.0, -600.0, 830.0, 900.0))
        .with_glyph(22, None, 900.0, b(0.0, -1100.0, 880.0, 900.0))
        .with_glyph(23, None, 900.0, b(0.0, 0.0, 880.0, 600.0))
        .with_glyph(24, None, 300.0, b(200.0, 0.0, 300.0, 500.0))
        .with_glyph(25, None, 400.0, b(200.0, 0.0, 400.0, 600.0))
        // Operators
        .with_glyph(30, Some('\u{2211}'), 900.0, b(50.0, -300.0, 850.0, 800.0))
        .with_glyph(31, None, 1300.0, b(50.0, -800.0, 1250.0, 1000.0))
        .with_glyph(32, Some('\u{222B}'), 500.0, b(0.0, -300.0, 600.0, 800.0))
        .with_glyph(33, None, 600.0, b(0.0, -900.0, 800.0, 1100.0))
        // Circumflex accent, wider variants and assembly parts
        .with_glyph(40, Some(HAT_CHAR), 300.0, b(0.0, 550.0, 300.0, 700.0))
        .with_glyph(41, None, 500.0, b(0.0, 550.0, 500.0, 720.0))
        .with_glyph(42, None, 800.0, b(0.0, 550.0, 800.0, 740.0))
        .with_glyph(43, None, 400.0, b(0.0, 550.0, 400.0, 740.0))
        .with_glyph(44, None, 300.0, b(0.0, 600.0, 300.0, 660.0))
        .with_glyph(45, None, 400.0, b(0.0, 550.0, 400.0, 740.0))
}

fn part(glyph: GlyphId, start: f32, end: f32, advance: f32, is_extender: bool) -> GlyphPart {
    GlyphPart {
        glyph,
        start_connector_length: start,
        end_connector_length: end,
        full_advance: advance,
        is_extender,
    }
}

pub fn math_table() -> FontMathTable {
    use MathConstant::*;
    let constants = [
        (ScriptPercentScaleDown, 70.0),
        (ScriptScriptPercentScaleDown, 50.0),
        (DisplayOperatorMinHeight, 1500.0),
        (AxisHeight, 250.0),
        (AccentBaseHeight, 450.0),
        (SubscriptShiftDown, 200.0),
        (SubscriptTopMax, 350.0),
        (SubscriptBaselineDropMin, 200.0),
        (SuperscriptShiftUp, 360.0),
        (SuperscriptShiftUpCramped, 290.0),
        (SuperscriptBottomMin, 110.0),
        (SuperscriptBaselineDropMax, 250.0),
        (SubSuperscriptGapMin, 160.0),
        (SuperscriptBottomMaxWithSubscript, 350.0),
        (SpaceAfterScript, 50.0),
        (UpperLimitGapMin, 200.0),
        (UpperLimitBaselineRiseMin, 110.0),
        (LowerLimitGapMin, 170.0),
        (LowerLimitBaselineDropMin, 600.0),
        (LimitExtraAscenderDescender, 100.0),
        (StackTopShiftUp, 440.0),
        (StackTopDisplayStyleShiftUp, 680.0),
        (StackBottomShiftDown, 350.0),
        (StackBottomDisplayStyleShiftDown, 690.0),
        (StackGapMin, 120.0),
        (StackDisplayStyleGapMin, 280.0),
        (FractionNumeratorShiftUp, 390.0),
        (FractionNumeratorDisplayStyleShiftUp, 680.0),
        (FractionDenominatorShiftDown, 340.0),
        (FractionDenominatorDisplayStyleShiftDown, 690.0),
        (FractionNumeratorGapMin, 40.0),
        (FractionNumDisplayStyleGapMin, 120.0),
        (FractionRuleThickness, 40.0),
        (FractionDenominatorGapMin, 40.0),
        (FractionDenomDisplayStyleGapMin, 120.0),
        (OverbarVerticalGap, 120.0),
        (OverbarRuleThickness, 40.0),
        (OverbarExtraAscender, 40.0),
        (UnderbarVerticalGap, 120.0),
        (UnderbarRuleThickness, 40.0),
        (UnderbarExtraDescender, 40.0),
        (RadicalVerticalGap, 50.0),
        (RadicalDisplayStyleVerticalGap, 150.0),
        (RadicalRuleThickness, 40.0),
        (RadicalExtraAscender, 40.0),
        (RadicalKernBeforeDegree, 280.0),
        (RadicalKernAfterDegree, -550.0),
        (RadicalDegreeBottomRaisePercent, 60.0),
    ];

    let mut table = FontMathTable::new(1000).with_min_connector_overlap(50.0);
    for (constant, value) in constants {
        table = table.with_constant(constant, value);
    }

    table
        .with_variants(
            RADICAL,
            Axis::Vertical,
            vec![RADICAL, RADICAL_LARGE, RADICAL_LARGER],
        )
        .with_assembly(
            RADICAL,
            Axis::Vertical,
            GlyphAssembly {
                italic_correction: 0.0,
                parts: vec![
                    part(RADICAL_BOTTOM, 0.0, 200.0, 600.0, false),
                    part(RADICAL_EXTENDER, 200.0, 200.0, 500.0, true),
                    part(RADICAL_TOP, 200.0, 0.0, 600.0, false),
                ],
            },
        )
        .with_variants(SUM, Axis::Vertical, vec![SUM, SUM_DISPLAY])
        .with_variants(INTEGRAL, Axis::Vertical, vec![INTEGRAL, INTEGRAL_DISPLAY])
        .with_italic_correction(INTEGRAL, 150.0)
        .with_italic_correction(INTEGRAL_DISPLAY, 200.0)
        .with_italic_correction(GlyphId(12), 120.0)
        .with_variants(HAT, Axis::Horizontal, vec![HAT, HAT_WIDE, HAT_WIDER])
        .with_assembly(
            HAT,
            Axis::Horizontal,
            GlyphAssembly {
                italic_correction: 0.0,
                parts: vec![
                    part(HAT_LEFT, 0.0, 150.0, 400.0, false),
                    part(HAT_EXTENDER, 150.0, 150.0, 300.0, true),
                    part(HAT_RIGHT, 150.0, 0.0, 400.0, false),
                ],
            },
        )
        .with_top_accent_attachment(HAT, 150.0)
        .with_top_accent_attachment(GlyphId(12), 260.0)
}

pub fn face() -> Arc<FontFace> {
    Arc::new(FontFace::new(
        FontId::new("fixture"),
        Arc::new(metrics()),
        Some(math_table()),
    ))
}

pub fn font(size: f32) -> MathFont {
    MathFont::new(face(), size)
}

/// The same glyphs without any math data
pub fn plain_font(size: f32) -> MathFont {
    let face = FontFace::new(FontId::new("plain"), Arc::new(metrics()), None);
    MathFont::new(Arc::new(face), size)
}

/// A font whose only math data is the given table
pub fn font_with_table(table: FontMathTable, size: f32) -> MathFont {
    let face = FontFace::new(FontId::new("custom"), Arc::new(metrics()), Some(table));
    MathFont::new(Arc::new(face), size)
}
