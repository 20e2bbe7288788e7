//! Display Boxes - The positioned output of layout
//!
//! A [`DisplayBox`] is a sized box (ascent above the baseline, descent below
//! it, width) placed at an `origin` relative to its parent's baseline-left
//! point, with the y axis pointing up. The set of box kinds is closed; each
//! composite constructor reads its children's metrics, positions them and
//! derives its own geometry. Trees are built once and never mutated.

use crate::error::{MathError, MathResult};
use crate::font::MathFont;
use crate::math_table::Axis;
use crate::metrics::GlyphId;
use crate::model::hull;
use serde::{Deserialize, Serialize};
use std::ops::Range;

// =============================================================================
// Geometry
// =============================================================================

/// A position in 2D space, y axis pointing up
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

// =============================================================================
// Glyph Boxes
// =============================================================================

/// Boxes that can be moved vertically without changing their content.
///
/// A positive shift moves the glyph down: the reported ascent shrinks and the
/// reported descent grows by the same amount.
pub trait VerticalShift {
    fn shift_down(&self) -> f32;

    fn with_shift_down(self, shift_down: f32) -> Self
    where
        Self: Sized;
}

/// A single glyph with its unshifted metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphBox {
    pub glyph: GlyphId,
    pub font_size: f32,
    pub ascent: f32,
    pub descent: f32,
    pub width: f32,
    pub shift_down: f32,
}

impl GlyphBox {
    pub fn new(glyph: GlyphId, font: &MathFont) -> Self {
        let metrics = font.glyph_metrics(glyph);
        Self {
            glyph,
            font_size: font.size(),
            ascent: metrics.ascent(),
            descent: metrics.descent(),
            width: metrics.advance.max(0.0),
            shift_down: 0.0,
        }
    }
}

impl VerticalShift for GlyphBox {
    fn shift_down(&self) -> f32 {
        self.shift_down
    }

    fn with_shift_down(mut self, shift_down: f32) -> Self {
        self.shift_down = shift_down;
        self
    }
}

/// A glyph assembled from several parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructedGlyph {
    pub glyphs: Vec<GlyphId>,
    /// Position of each part along `axis`, from the start of the assembly
    pub offsets: Vec<f32>,
    pub axis: Axis,
    /// Total length along `axis`
    pub extent: f32,
    pub font_size: f32,
    pub ascent: f32,
    pub descent: f32,
    pub width: f32,
    pub shift_down: f32,
}

impl VerticalShift for ConstructedGlyph {
    fn shift_down(&self) -> f32 {
        self.shift_down
    }

    fn with_shift_down(mut self, shift_down: f32) -> Self {
        self.shift_down = shift_down;
        self
    }
}

fn shifted(ascent: f32, descent: f32, shift_down: f32) -> (f32, f32) {
    ((ascent - shift_down).max(0.0), (descent + shift_down).max(0.0))
}

// =============================================================================
// Display Box
// =============================================================================

/// A positioned, sized node of the display tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayBox {
    pub ascent: f32,
    pub descent: f32,
    pub width: f32,
    /// Baseline-left point relative to the parent's
    pub origin: Point,
    /// Source characters this box was laid out from
    pub range: Range<usize>,
    /// Whether trailing scripts are attached to this box
    pub has_script: bool,
    pub kind: BoxKind,
}

/// What a display box draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoxKind {
    /// A laid-out math list
    List { children: Vec<DisplayBox> },
    /// Consecutive glyphs on the baseline, each with its x offset
    GlyphRun {
        glyphs: Vec<(GlyphId, f32)>,
        text: String,
        font_size: f32,
    },
    Glyph(GlyphBox),
    Constructed(ConstructedGlyph),
    Fraction {
        numerator: Box<DisplayBox>,
        denominator: Box<DisplayBox>,
        numerator_up: f32,
        denominator_down: f32,
        /// Height of the rule's center above the baseline
        line_position: f32,
        /// Zero for a fraction without a rule
        line_thickness: f32,
    },
    Radical {
        glyph: Box<DisplayBox>,
        radicand: Box<DisplayBox>,
        degree: Option<Box<DisplayBox>>,
        /// Clearance between the radicand and the rule
        top_kern: f32,
        line_thickness: f32,
        /// Horizontal offset of the radical sign, making room for the degree
        radical_shift: f32,
    },
    LargeOperator {
        nucleus: Box<DisplayBox>,
        upper_limit: Option<Box<DisplayBox>>,
        lower_limit: Option<Box<DisplayBox>>,
        upper_limit_gap: f32,
        lower_limit_gap: f32,
        /// Upper limit moves right and lower limit left by this amount
        limit_shift: f32,
        extra_padding: f32,
    },
    /// Over- or underline; `line_shift_up` is negative for an underline
    Line {
        inner: Box<DisplayBox>,
        line_shift_up: f32,
        line_thickness: f32,
    },
    Accent {
        accent: Box<DisplayBox>,
        accentee: Box<DisplayBox>,
    },
}

/// Geometry of a radical, computed by layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadicalMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub top_kern: f32,
    pub line_thickness: f32,
}

/// A laid-out limit and its gap to the nucleus
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub display: DisplayBox,
    pub gap: f32,
}

impl DisplayBox {
    fn leaf(ascent: f32, descent: f32, width: f32, range: Range<usize>, kind: BoxKind) -> Self {
        Self {
            ascent,
            descent,
            width,
            origin: Point::origin(),
            range,
            has_script: false,
            kind,
        }
    }

    /// Place this box at `origin`
    pub fn at(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// A list of already positioned children. Metrics and range are the
    /// aggregates of the children.
    pub fn list(children: Vec<DisplayBox>) -> Self {
        let mut ascent: f32 = 0.0;
        let mut descent: f32 = 0.0;
        let mut width: f32 = 0.0;
        for child in &children {
            ascent = ascent.max(child.origin.y + child.ascent);
            descent = descent.max(child.descent - child.origin.y);
            width = width.max(child.origin.x + child.width);
        }
        let range = hull(children.iter().map(|c| c.range.clone()));
        Self::leaf(ascent, descent, width, range, BoxKind::List { children })
    }

    /// A run of glyphs. `glyphs` carries each glyph's x offset; `width` is the
    /// advance of the whole run.
    pub fn glyph_run(
        glyphs: Vec<(GlyphId, f32)>,
        text: String,
        width: f32,
        font: &MathFont,
        range: Range<usize>,
    ) -> Self {
        let (ascent, descent) = glyphs.iter().fold((0.0f32, 0.0f32), |(a, d), (glyph, _)| {
            let metrics = font.glyph_metrics(*glyph);
            (a.max(metrics.ascent()), d.max(metrics.descent()))
        });
        Self::leaf(
            ascent,
            descent,
            width.max(0.0),
            range,
            BoxKind::GlyphRun {
                glyphs,
                text,
                font_size: font.size(),
            },
        )
    }

    /// A single glyph; reported metrics include its vertical shift
    pub fn glyph(glyph: GlyphBox, range: Range<usize>) -> Self {
        let (ascent, descent) = shifted(glyph.ascent, glyph.descent, glyph.shift_down);
        Self::leaf(ascent, descent, glyph.width, range, BoxKind::Glyph(glyph))
    }

    pub fn constructed(glyph: ConstructedGlyph, range: Range<usize>) -> Self {
        let (ascent, descent) = shifted(glyph.ascent, glyph.descent, glyph.shift_down);
        Self::leaf(
            ascent,
            descent,
            glyph.width,
            range,
            BoxKind::Constructed(glyph),
        )
    }

    /// Stack `numerator` over `denominator`, both centered
    pub fn fraction(
        numerator: DisplayBox,
        denominator: DisplayBox,
        numerator_up: f32,
        denominator_down: f32,
        line_position: f32,
        line_thickness: f32,
        range: Range<usize>,
    ) -> Self {
        let width = numerator.width.max(denominator.width);
        let ascent = (numerator_up + numerator.ascent).max(0.0);
        let descent = (denominator_down + denominator.descent).max(0.0);

        let numerator_x = (width - numerator.width) / 2.0;
        let denominator_x = (width - denominator.width) / 2.0;
        let numerator = numerator.at(Point::new(numerator_x, numerator_up));
        let denominator = denominator.at(Point::new(denominator_x, -denominator_down));

        Self::leaf(
            ascent,
            descent,
            width,
            range,
            BoxKind::Fraction {
                numerator: Box::new(numerator),
                denominator: Box::new(denominator),
                numerator_up,
                denominator_down,
                line_position,
                line_thickness,
            },
        )
    }

    /// A radical sign followed by its radicand, with an optional degree
    /// tucked into the sign's notch.
    ///
    /// `degree` carries the degree box with its kerns before and after and
    /// its raise above the baseline. The radical sign is never moved left of
    /// the box origin: a negative total shift is absorbed by the kern before
    /// the degree.
    pub fn radical(
        glyph: DisplayBox,
        radicand: DisplayBox,
        degree: Option<(DisplayBox, f32, f32, f32)>,
        metrics: RadicalMetrics,
        range: Range<usize>,
    ) -> Self {
        let mut ascent = metrics.ascent;
        let mut descent = metrics.descent;
        let mut radical_shift = 0.0;

        let degree = degree.map(|(degree, mut kern_before, kern_after, raise)| {
            radical_shift = kern_before + degree.width + kern_after;
            if radical_shift < 0.0 {
                kern_before -= radical_shift;
                radical_shift = 0.0;
            }
            ascent = ascent.max(raise + degree.ascent);
            descent = descent.max(degree.descent - raise);
            Box::new(degree.at(Point::new(kern_before, raise)))
        });

        let glyph_width = glyph.width;
        let width = radical_shift + glyph_width + radicand.width;
        let glyph = glyph.at(Point::new(radical_shift, 0.0));
        let radicand = radicand.at(Point::new(radical_shift + glyph_width, 0.0));

        Self::leaf(
            ascent.max(0.0),
            descent.max(0.0),
            width,
            range,
            BoxKind::Radical {
                glyph: Box::new(glyph),
                radicand: Box::new(radicand),
                degree,
                top_kern: metrics.top_kern,
                line_thickness: metrics.line_thickness,
                radical_shift,
            },
        )
    }

    /// A large operator with limits stacked above and below
    pub fn large_operator(
        nucleus: DisplayBox,
        upper: Option<Limit>,
        lower: Option<Limit>,
        limit_shift: f32,
        extra_padding: f32,
        range: Range<usize>,
    ) -> Self {
        let width = [
            Some(nucleus.width),
            upper.as_ref().map(|l| l.display.width),
            lower.as_ref().map(|l| l.display.width),
        ]
        .into_iter()
        .flatten()
        .fold(0.0f32, f32::max);

        let mut ascent = nucleus.ascent;
        let mut descent = nucleus.descent;
        let mut upper_limit_gap = 0.0;
        let mut lower_limit_gap = 0.0;

        let upper_limit = upper.map(|Limit { display, gap }| {
            upper_limit_gap = gap;
            ascent = nucleus.ascent + extra_padding + display.ascent + gap + display.descent;
            let origin = Point::new(
                limit_shift + (width - display.width) / 2.0,
                nucleus.ascent + gap + display.descent,
            );
            Box::new(display.at(origin))
        });
        let lower_limit = lower.map(|Limit { display, gap }| {
            lower_limit_gap = gap;
            descent = nucleus.descent + extra_padding + gap + display.ascent + display.descent;
            let origin = Point::new(
                -limit_shift + (width - display.width) / 2.0,
                -(nucleus.descent + gap + display.ascent),
            );
            Box::new(display.at(origin))
        });

        let nucleus_x = (width - nucleus.width) / 2.0;
        let nucleus = nucleus.at(Point::new(nucleus_x, 0.0));

        Self::leaf(
            ascent.max(0.0),
            descent.max(0.0),
            width,
            range,
            BoxKind::LargeOperator {
                nucleus: Box::new(nucleus),
                upper_limit,
                lower_limit,
                upper_limit_gap,
                lower_limit_gap,
                limit_shift,
                extra_padding,
            },
        )
    }

    /// A rule over (`line_shift_up` > 0) or under the inner list. Ascent and
    /// descent are supplied by layout, which knows the gaps.
    pub fn line(
        inner: DisplayBox,
        line_shift_up: f32,
        line_thickness: f32,
        ascent: f32,
        descent: f32,
        range: Range<usize>,
    ) -> Self {
        let width = inner.width;
        Self::leaf(
            ascent.max(0.0),
            descent.max(0.0),
            width,
            range,
            BoxKind::Line {
                inner: Box::new(inner.at(Point::origin())),
                line_shift_up,
                line_thickness,
            },
        )
    }

    /// An accent glyph placed at `accent_origin` above the accentee
    pub fn accent(
        accent: DisplayBox,
        accentee: DisplayBox,
        accent_origin: Point,
        range: Range<usize>,
    ) -> Self {
        let ascent = accentee
            .ascent
            .max(accent_origin.y + accent.ascent);
        let descent = accentee.descent;
        let width = accentee.width;
        Self::leaf(
            ascent,
            descent,
            width,
            range,
            BoxKind::Accent {
                accent: Box::new(accent.at(accent_origin)),
                accentee: Box::new(accentee.at(Point::origin())),
            },
        )
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, BoxKind::List { .. })
    }

    /// Children owned by this box
    pub fn children(&self) -> Vec<&DisplayBox> {
        match &self.kind {
            BoxKind::List { children } => children.iter().collect(),
            BoxKind::GlyphRun { .. } | BoxKind::Glyph(_) | BoxKind::Constructed(_) => Vec::new(),
            BoxKind::Fraction {
                numerator,
                denominator,
                ..
            } => vec![numerator.as_ref(), denominator.as_ref()],
            BoxKind::Radical {
                glyph,
                radicand,
                degree,
                ..
            } => {
                let mut children = vec![glyph.as_ref(), radicand.as_ref()];
                children.extend(degree.as_deref());
                children
            }
            BoxKind::LargeOperator {
                nucleus,
                upper_limit,
                lower_limit,
                ..
            } => {
                let mut children = vec![nucleus.as_ref()];
                children.extend(upper_limit.as_deref());
                children.extend(lower_limit.as_deref());
                children
            }
            BoxKind::Line { inner, .. } => vec![inner.as_ref()],
            BoxKind::Accent { accent, accentee } => vec![accent.as_ref(), accentee.as_ref()],
        }
    }

    /// Walk the tree depth first, passing each box with its absolute origin.
    /// `parent` is the absolute baseline-left point of this box's parent.
    pub fn visit<F>(&self, parent: Point, f: &mut F)
    where
        F: FnMut(&DisplayBox, Point),
    {
        let origin = parent.offset(self.origin.x, self.origin.y);
        f(self, origin);
        for child in self.children() {
            child.visit(origin, f);
        }
    }

    /// Check the geometric and range invariants of the whole tree
    pub fn validate(&self) -> MathResult<()> {
        self.check_metrics()?;

        let children = self.children();
        let mut ranges = Vec::with_capacity(children.len());
        for child in &children {
            if !child.range.is_empty() {
                if child.range.start < self.range.start || child.range.end > self.range.end {
                    return Err(violation(format!(
                        "child range {:?} outside parent range {:?}",
                        child.range, self.range
                    )));
                }
                ranges.push(child.range.clone());
            }
            child.validate()?;
        }

        if self.is_list() {
            if ranges.windows(2).any(|w| w[0].end > w[1].start) {
                return Err(violation(format!(
                    "list children out of order or overlapping: {:?}",
                    ranges
                )));
            }
            let covered = hull(ranges.iter().cloned());
            if !ranges.is_empty() && covered != self.range {
                return Err(violation(format!(
                    "list range {:?} differs from children hull {:?}",
                    self.range, covered
                )));
            }
        } else {
            ranges.sort_by_key(|r| r.start);
            if ranges.windows(2).any(|w| w[0].end > w[1].start) {
                return Err(violation(format!("overlapping sibling ranges: {:?}", ranges)));
            }
        }
        Ok(())
    }

    fn check_metrics(&self) -> MathResult<()> {
        let metrics = [
            ("ascent", self.ascent),
            ("descent", self.descent),
            ("width", self.width),
        ];
        for (name, value) in metrics {
            if !value.is_finite() || value < 0.0 {
                return Err(violation(format!(
                    "{} is {} for box at {:?}",
                    name, value, self.range
                )));
            }
        }
        if !self.origin.x.is_finite() || !self.origin.y.is_finite() {
            return Err(violation(format!("non-finite origin for box at {:?}", self.range)));
        }
        Ok(())
    }
}

fn violation(message: String) -> MathError {
    MathError::InvariantViolation(message)
}
