//! Font Math Table - Math layout constants and glyph variant data
//!
//! A [`FontMathTable`] holds everything a math-aware font carries beyond plain
//! glyph metrics: the named layout constants, the lists of progressively larger
//! glyph variants, and the part lists used to assemble arbitrarily large
//! glyphs. Values are kept in design units; [`MathFont`](crate::font::MathFont)
//! scales them to a point size.
//!
//! Tables are loaded from a JSON description, or derived heuristically from a
//! plain font's ascender/descender when the font has no math data.

use crate::error::{MathError, MathResult};
use crate::metrics::{GlyphId, GlyphMetricsProvider};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Direction in which a glyph grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Named math layout constants (the OpenType MATH constant set)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MathConstant {
    ScriptPercentScaleDown,
    ScriptScriptPercentScaleDown,
    DelimitedSubFormulaMinHeight,
    DisplayOperatorMinHeight,
    AxisHeight,
    AccentBaseHeight,
    SubscriptShiftDown,
    SubscriptTopMax,
    SubscriptBaselineDropMin,
    SuperscriptShiftUp,
    SuperscriptShiftUpCramped,
    SuperscriptBottomMin,
    SuperscriptBaselineDropMax,
    SubSuperscriptGapMin,
    SuperscriptBottomMaxWithSubscript,
    SpaceAfterScript,
    UpperLimitGapMin,
    UpperLimitBaselineRiseMin,
    LowerLimitGapMin,
    LowerLimitBaselineDropMin,
    /// Not part of OpenType: padding kept above upper and below lower limits
    LimitExtraAscenderDescender,
    StackTopShiftUp,
    StackTopDisplayStyleShiftUp,
    StackBottomShiftDown,
    StackBottomDisplayStyleShiftDown,
    StackGapMin,
    StackDisplayStyleGapMin,
    FractionNumeratorShiftUp,
    FractionNumeratorDisplayStyleShiftUp,
    FractionDenominatorShiftDown,
    FractionDenominatorDisplayStyleShiftDown,
    FractionNumeratorGapMin,
    FractionNumDisplayStyleGapMin,
    FractionRuleThickness,
    FractionDenominatorGapMin,
    FractionDenomDisplayStyleGapMin,
    OverbarVerticalGap,
    OverbarRuleThickness,
    OverbarExtraAscender,
    UnderbarVerticalGap,
    UnderbarRuleThickness,
    UnderbarExtraDescender,
    RadicalVerticalGap,
    RadicalDisplayStyleVerticalGap,
    RadicalRuleThickness,
    RadicalExtraAscender,
    RadicalKernBeforeDegree,
    RadicalKernAfterDegree,
    RadicalDegreeBottomRaisePercent,
}

impl MathConstant {
    /// Every constant, in declaration order
    pub const ALL: [MathConstant; 49] = [
        MathConstant::ScriptPercentScaleDown,
        MathConstant::ScriptScriptPercentScaleDown,
        MathConstant::DelimitedSubFormulaMinHeight,
        MathConstant::DisplayOperatorMinHeight,
        MathConstant::AxisHeight,
        MathConstant::AccentBaseHeight,
        MathConstant::SubscriptShiftDown,
        MathConstant::SubscriptTopMax,
        MathConstant::SubscriptBaselineDropMin,
        MathConstant::SuperscriptShiftUp,
        MathConstant::SuperscriptShiftUpCramped,
        MathConstant::SuperscriptBottomMin,
        MathConstant::SuperscriptBaselineDropMax,
        MathConstant::SubSuperscriptGapMin,
        MathConstant::SuperscriptBottomMaxWithSubscript,
        MathConstant::SpaceAfterScript,
        MathConstant::UpperLimitGapMin,
        MathConstant::UpperLimitBaselineRiseMin,
        MathConstant::LowerLimitGapMin,
        MathConstant::LowerLimitBaselineDropMin,
        MathConstant::LimitExtraAscenderDescender,
        MathConstant::StackTopShiftUp,
        MathConstant::StackTopDisplayStyleShiftUp,
        MathConstant::StackBottomShiftDown,
        MathConstant::StackBottomDisplayStyleShiftDown,
        MathConstant::StackGapMin,
        MathConstant::StackDisplayStyleGapMin,
        MathConstant::FractionNumeratorShiftUp,
        MathConstant::FractionNumeratorDisplayStyleShiftUp,
        MathConstant::FractionDenominatorShiftDown,
        MathConstant::FractionDenominatorDisplayStyleShiftDown,
        MathConstant::FractionNumeratorGapMin,
        MathConstant::FractionNumDisplayStyleGapMin,
        MathConstant::FractionRuleThickness,
        MathConstant::FractionDenominatorGapMin,
        MathConstant::FractionDenomDisplayStyleGapMin,
        MathConstant::OverbarVerticalGap,
        MathConstant::OverbarRuleThickness,
        MathConstant::OverbarExtraAscender,
        MathConstant::UnderbarVerticalGap,
        MathConstant::UnderbarRuleThickness,
        MathConstant::UnderbarExtraDescender,
        MathConstant::RadicalVerticalGap,
        MathConstant::RadicalDisplayStyleVerticalGap,
        MathConstant::RadicalRuleThickness,
        MathConstant::RadicalExtraAscender,
        MathConstant::RadicalKernBeforeDegree,
        MathConstant::RadicalKernAfterDegree,
        MathConstant::RadicalDegreeBottomRaisePercent,
    ];

    /// Percent constants are unitless and are not scaled by the font size
    pub fn is_percent(self) -> bool {
        matches!(
            self,
            MathConstant::ScriptPercentScaleDown
                | MathConstant::ScriptScriptPercentScaleDown
                | MathConstant::RadicalDegreeBottomRaisePercent
        )
    }

    /// Position of this constant in [`MathConstant::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One piece of a glyph assembly, in the order the assembly grows
/// (bottom to top, or left to right)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphPart {
    pub glyph: GlyphId,
    /// Length of connector material at the start of the part
    pub start_connector_length: f32,
    /// Length of connector material at the end of the part
    pub end_connector_length: f32,
    /// Full advance of the part in the growth direction
    pub full_advance: f32,
    /// Extenders may be repeated any number of times, including zero
    #[serde(default)]
    pub is_extender: bool,
}

impl GlyphPart {
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            glyph: self.glyph,
            start_connector_length: self.start_connector_length * factor,
            end_connector_length: self.end_connector_length * factor,
            full_advance: self.full_advance * factor,
            is_extender: self.is_extender,
        }
    }
}

/// Recipe for building a glyph of arbitrary size out of parts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlyphAssembly {
    #[serde(default)]
    pub italic_correction: f32,
    pub parts: Vec<GlyphPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VariantRecord {
    glyph: GlyphId,
    variants: Vec<GlyphId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssemblyRecord {
    glyph: GlyphId,
    #[serde(flatten)]
    assembly: GlyphAssembly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GlyphValueRecord {
    glyph: GlyphId,
    value: f32,
}

/// Serialized form of a math table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MathTableData {
    units_per_em: u16,
    #[serde(default)]
    constants: BTreeMap<MathConstant, f32>,
    #[serde(default)]
    min_connector_overlap: f32,
    #[serde(default)]
    vertical_variants: Vec<VariantRecord>,
    #[serde(default)]
    horizontal_variants: Vec<VariantRecord>,
    #[serde(default)]
    vertical_assemblies: Vec<AssemblyRecord>,
    #[serde(default)]
    horizontal_assemblies: Vec<AssemblyRecord>,
    #[serde(default)]
    italic_corrections: Vec<GlyphValueRecord>,
    #[serde(default)]
    top_accent_attachments: Vec<GlyphValueRecord>,
}

/// Per-font math constants and glyph variant/assembly tables, in design units
#[derive(Debug, Clone, PartialEq)]
pub struct FontMathTable {
    units_per_em: u16,
    constants: HashMap<MathConstant, f32>,
    min_connector_overlap: f32,
    vertical_variants: HashMap<GlyphId, Vec<GlyphId>>,
    horizontal_variants: HashMap<GlyphId, Vec<GlyphId>>,
    vertical_assemblies: HashMap<GlyphId, GlyphAssembly>,
    horizontal_assemblies: HashMap<GlyphId, GlyphAssembly>,
    italic_corrections: HashMap<GlyphId, f32>,
    top_accent_attachments: HashMap<GlyphId, f32>,
}

impl FontMathTable {
    /// Create an empty table
    pub fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            constants: HashMap::new(),
            min_connector_overlap: 0.0,
            vertical_variants: HashMap::new(),
            horizontal_variants: HashMap::new(),
            vertical_assemblies: HashMap::new(),
            horizontal_assemblies: HashMap::new(),
            italic_corrections: HashMap::new(),
            top_accent_attachments: HashMap::new(),
        }
    }

    /// Parse a table from its JSON description
    pub fn from_json(json: &str) -> MathResult<Self> {
        let data: MathTableData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    fn from_data(data: MathTableData) -> MathResult<Self> {
        if data.units_per_em == 0 {
            return Err(MathError::MathTable(
                "units_per_em must be positive".to_string(),
            ));
        }
        if data.min_connector_overlap < 0.0 {
            return Err(MathError::MathTable(
                "min_connector_overlap must not be negative".to_string(),
            ));
        }

        let mut table = Self::new(data.units_per_em);
        table.constants = data.constants.into_iter().collect();
        table.min_connector_overlap = data.min_connector_overlap;

        for (axis, records) in [
            (Axis::Vertical, data.vertical_variants),
            (Axis::Horizontal, data.horizontal_variants),
        ] {
            for record in records {
                if record.variants.is_empty() {
                    return Err(MathError::MathTable(format!(
                        "empty variant list for glyph {}",
                        record.glyph.0
                    )));
                }
                table.variants_mut(axis).insert(record.glyph, record.variants);
            }
        }

        for (axis, records) in [
            (Axis::Vertical, data.vertical_assemblies),
            (Axis::Horizontal, data.horizontal_assemblies),
        ] {
            for record in records {
                if record.assembly.parts.is_empty() {
                    return Err(MathError::MathTable(format!(
                        "empty assembly for glyph {}",
                        record.glyph.0
                    )));
                }
                table.assemblies_mut(axis).insert(record.glyph, record.assembly);
            }
        }

        table.italic_corrections = data
            .italic_corrections
            .into_iter()
            .map(|r| (r.glyph, r.value))
            .collect();
        table.top_accent_attachments = data
            .top_accent_attachments
            .into_iter()
            .map(|r| (r.glyph, r.value))
            .collect();

        Ok(table)
    }

    /// Derive a complete set of constants from a plain text font.
    ///
    /// The result has no variants or assemblies; formulas still lay out, with
    /// spacing approximated from the face's ascender, descender and x-height.
    pub fn heuristic(metrics: &dyn GlyphMetricsProvider) -> Self {
        let em = metrics.units_per_em().max(1) as f32;
        let asc = metrics.ascender().max(0.0);
        let desc = metrics.descender().abs();
        let x = metrics.x_height().unwrap_or(asc * 0.55);
        let rule = em * 0.04;

        use MathConstant::*;
        let values = [
            (ScriptPercentScaleDown, 70.0),
            (ScriptScriptPercentScaleDown, 50.0),
            (DelimitedSubFormulaMinHeight, em * 1.3),
            (DisplayOperatorMinHeight, em * 1.3),
            (AxisHeight, x * 0.55),
            (AccentBaseHeight, x),
            (SubscriptShiftDown, desc * 1.2),
            (SubscriptTopMax, x * 0.8),
            (SubscriptBaselineDropMin, desc),
            (SuperscriptShiftUp, x * 0.83),
            (SuperscriptShiftUpCramped, x * 0.66),
            (SuperscriptBottomMin, x * 0.25),
            (SuperscriptBaselineDropMax, desc * 1.25),
            (SubSuperscriptGapMin, rule * 4.0),
            (SuperscriptBottomMaxWithSubscript, x * 0.8),
            (SpaceAfterScript, em * 0.056),
            (UpperLimitGapMin, em * 0.2),
            (UpperLimitBaselineRiseMin, em * 0.111),
            (LowerLimitGapMin, em * 0.167),
            (LowerLimitBaselineDropMin, em * 0.6),
            (LimitExtraAscenderDescender, 0.0),
            (StackTopShiftUp, asc * 0.55),
            (StackTopDisplayStyleShiftUp, asc * 0.85),
            (StackBottomShiftDown, desc * 1.72),
            (StackBottomDisplayStyleShiftDown, desc * 3.4),
            (StackGapMin, rule * 3.0),
            (StackDisplayStyleGapMin, rule * 7.0),
            (FractionNumeratorShiftUp, asc * 0.49),
            (FractionNumeratorDisplayStyleShiftUp, asc * 0.85),
            (FractionDenominatorShiftDown, desc * 1.72),
            (FractionDenominatorDisplayStyleShiftDown, desc * 3.4),
            (FractionNumeratorGapMin, rule),
            (FractionNumDisplayStyleGapMin, rule * 3.0),
            (FractionRuleThickness, rule),
            (FractionDenominatorGapMin, rule),
            (FractionDenomDisplayStyleGapMin, rule * 3.0),
            (OverbarVerticalGap, rule * 3.0),
            (OverbarRuleThickness, rule),
            (OverbarExtraAscender, rule),
            (UnderbarVerticalGap, rule * 3.0),
            (UnderbarRuleThickness, rule),
            (UnderbarExtraDescender, rule),
            (RadicalVerticalGap, rule * 1.25),
            (RadicalDisplayStyleVerticalGap, x * 0.34),
            (RadicalRuleThickness, rule),
            (RadicalExtraAscender, rule),
            (RadicalKernBeforeDegree, em * 0.278),
            (RadicalKernAfterDegree, em * -0.556),
            (RadicalDegreeBottomRaisePercent, 60.0),
        ];

        let mut table = Self::new(metrics.units_per_em().max(1));
        table.constants = values.into_iter().collect();
        table
    }

    /// Fill in every constant this table lacks from `fallback`, converting
    /// design units when the two tables use a different em size.
    pub fn with_fallback_constants(mut self, fallback: &FontMathTable) -> Self {
        let ratio = self.units_per_em as f32 / fallback.units_per_em.max(1) as f32;
        for (constant, value) in &fallback.constants {
            let value = if constant.is_percent() {
                *value
            } else {
                value * ratio
            };
            self.constants.entry(*constant).or_insert(value);
        }
        self
    }

    pub fn with_constant(mut self, constant: MathConstant, value: f32) -> Self {
        self.constants.insert(constant, value);
        self
    }

    pub fn with_min_connector_overlap(mut self, overlap: f32) -> Self {
        self.min_connector_overlap = overlap;
        self
    }

    pub fn with_variants(mut self, glyph: GlyphId, axis: Axis, variants: Vec<GlyphId>) -> Self {
        self.variants_mut(axis).insert(glyph, variants);
        self
    }

    pub fn with_assembly(mut self, glyph: GlyphId, axis: Axis, assembly: GlyphAssembly) -> Self {
        self.assemblies_mut(axis).insert(glyph, assembly);
        self
    }

    pub fn with_italic_correction(mut self, glyph: GlyphId, value: f32) -> Self {
        self.italic_corrections.insert(glyph, value);
        self
    }

    pub fn with_top_accent_attachment(mut self, glyph: GlyphId, value: f32) -> Self {
        self.top_accent_attachments.insert(glyph, value);
        self
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Raw design-unit value of a constant
    pub fn constant(&self, constant: MathConstant) -> Option<f32> {
        self.constants.get(&constant).copied()
    }

    pub fn min_connector_overlap(&self) -> f32 {
        self.min_connector_overlap
    }

    /// Listed variants of a glyph, smallest first
    pub fn variants(&self, glyph: GlyphId, axis: Axis) -> Option<&[GlyphId]> {
        let map = match axis {
            Axis::Vertical => &self.vertical_variants,
            Axis::Horizontal => &self.horizontal_variants,
        };
        map.get(&glyph).map(Vec::as_slice)
    }

    pub fn assembly(&self, glyph: GlyphId, axis: Axis) -> Option<&GlyphAssembly> {
        let map = match axis {
            Axis::Vertical => &self.vertical_assemblies,
            Axis::Horizontal => &self.horizontal_assemblies,
        };
        map.get(&glyph)
    }

    pub fn italic_correction(&self, glyph: GlyphId) -> Option<f32> {
        self.italic_corrections.get(&glyph).copied()
    }

    pub fn top_accent_attachment(&self, glyph: GlyphId) -> Option<f32> {
        self.top_accent_attachments.get(&glyph).copied()
    }

    fn variants_mut(&mut self, axis: Axis) -> &mut HashMap<GlyphId, Vec<GlyphId>> {
        match axis {
            Axis::Vertical => &mut self.vertical_variants,
            Axis::Horizontal => &mut self.horizontal_variants,
        }
    }

    fn assemblies_mut(&mut self, axis: Axis) -> &mut HashMap<GlyphId, GlyphAssembly> {
        match axis {
            Axis::Vertical => &mut self.vertical_assemblies,
            Axis::Horizontal => &mut self.horizontal_assemblies,
        }
    }
}
