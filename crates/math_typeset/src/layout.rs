//! Math Layout - Calculate positions and sizes for math atoms
//!
//! [`AtomLayoutEngine`] walks a [`MathList`] and produces a [`DisplayBox`]
//! tree. Style and cramping travel down the recursion in a
//! [`LayoutContext`] value; the engine itself holds only the fonts for each
//! style and its configuration, so one engine can serve any number of
//! concurrent passes.

use crate::assembler::{ExtensibleGlyph, ExtensibleGlyphAssembler};
use crate::config::LayoutConfig;
use crate::display::{BoxKind, DisplayBox, GlyphBox, Limit, Point, RadicalMetrics, VerticalShift};
use crate::error::MathResult;
use crate::font::MathFont;
use crate::math_table::{Axis, MathConstant};
use crate::metrics::GlyphId;
use crate::model::{hull, Atom, AtomKind, MathList};
use crate::spacing::{atom_space, resolve_binary_classes, SpacingClass};
use crate::style::{LayoutContext, LineStyle};
use std::ops::Range;

/// Character looked up for the radical sign
pub const RADICAL_SIGN: char = '\u{221A}';

// =============================================================================
// Line Building
// =============================================================================

/// Children of the list being built and the horizontal cursor
#[derive(Default)]
struct ListBuilder {
    children: Vec<DisplayBox>,
    x: f32,
}

impl ListBuilder {
    /// Place a box at the cursor on the baseline and advance past it
    fn push(&mut self, display: DisplayBox) {
        let width = display.width;
        self.children.push(display.at(Point::new(self.x, 0.0)));
        self.x += width;
    }

    fn push_at(&mut self, display: DisplayBox, origin: Point) {
        self.children.push(display.at(origin));
    }

    fn finish(self) -> DisplayBox {
        DisplayBox::list(self.children)
    }
}

/// Consecutive plain symbols waiting to become one glyph run
#[derive(Default)]
struct PendingRun {
    glyphs: Vec<(GlyphId, f32)>,
    text: String,
    cursor: f32,
    range: Range<usize>,
}

impl PendingRun {
    fn push(&mut self, text: &str, range: Range<usize>, font: &MathFont) {
        for ch in text.chars() {
            let glyph = font.glyph_id(ch);
            self.glyphs.push((glyph, self.cursor));
            self.cursor += font.glyph_metrics(glyph).advance;
        }
        self.text.push_str(text);
        self.range = hull([self.range.clone(), range]);
    }

    fn finish(self, font: &MathFont) -> DisplayBox {
        DisplayBox::glyph_run(self.glyphs, self.text, self.cursor, font, self.range)
    }
}

// =============================================================================
// Layout Engine
// =============================================================================

/// Lays out math lists with one font
pub struct AtomLayoutEngine {
    config: LayoutConfig,
    text_font: MathFont,
    script_font: MathFont,
    script_script_font: MathFont,
}

impl AtomLayoutEngine {
    pub fn new(font: MathFont) -> Self {
        Self::with_config(font, LayoutConfig::default())
    }

    pub fn with_config(font: MathFont, config: LayoutConfig) -> Self {
        let script_font = font.with_size(LineStyle::Script.font_size(&font));
        let script_script_font = font.with_size(LineStyle::ScriptScript.font_size(&font));
        Self {
            config,
            text_font: font,
            script_font,
            script_script_font,
        }
    }

    /// The base (display and text style) font
    pub fn font(&self) -> &MathFont {
        &self.text_font
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out a math list in `style`.
    ///
    /// Returns a list box whose children are the positioned boxes of the
    /// atoms and whose metrics are their aggregate. The tree is validated
    /// before it is returned; a tree breaking a geometric or range invariant
    /// is never handed out.
    pub fn layout(&self, list: &MathList, style: LineStyle) -> MathResult<DisplayBox> {
        let list_box = self.layout_list(list, LayoutContext::new(style));
        if let Err(err) = list_box.validate() {
            tracing::error!(error = %err, ?style, font = %self.text_font.id(), "invalid display tree");
            return Err(err);
        }

        tracing::trace!(
            atoms = list.len(),
            ascent = list_box.ascent,
            descent = list_box.descent,
            width = list_box.width,
            "laid out math list"
        );
        Ok(list_box)
    }

    fn style_font(&self, style: LineStyle) -> &MathFont {
        match style {
            LineStyle::Display | LineStyle::Text => &self.text_font,
            LineStyle::Script => &self.script_font,
            LineStyle::ScriptScript => &self.script_script_font,
        }
    }

    fn assembler<'a>(&'a self, font: &'a MathFont) -> ExtensibleGlyphAssembler<'a> {
        ExtensibleGlyphAssembler::with_config(font, &self.config)
    }

    fn layout_list(&self, list: &MathList, ctx: LayoutContext) -> DisplayBox {
        let font = self.style_font(ctx.style);
        let mut line = ListBuilder::default();
        let mut run: Option<PendingRun> = None;
        let mut prev_class: Option<SpacingClass> = None;

        for (atom, class) in list.atoms.iter().zip(spacing_classes(list)) {
            if let AtomKind::Space { mu } = atom.kind {
                flush_run(&mut run, &mut line, font);
                line.x += mu * font.mu();
                continue;
            }

            let space = match (prev_class, class) {
                (Some(left), Some(right)) if self.config.inter_atom_spacing => {
                    atom_space(left, right, ctx.style).mu() * font.mu()
                }
                _ => 0.0,
            };
            prev_class = class;

            if let AtomKind::Symbol { text, .. } = &atom.kind {
                if !atom.has_scripts() {
                    match run.as_mut() {
                        Some(pending) => pending.cursor += space,
                        None => line.x += space,
                    }
                    run.get_or_insert_with(PendingRun::default)
                        .push(text, atom.range.clone(), font);
                    continue;
                }
            }

            flush_run(&mut run, &mut line, font);
            line.x += space;
            self.layout_atom(atom, ctx, &mut line);
        }
        flush_run(&mut run, &mut line, font);

        line.finish()
    }

    fn layout_atom(&self, atom: &Atom, ctx: LayoutContext, line: &mut ListBuilder) {
        let font = self.style_font(ctx.style);
        match &atom.kind {
            AtomKind::Symbol { text, .. } => {
                let host = glyph_run(text, atom.nucleus_range(), font);
                let delta = text
                    .chars()
                    .last()
                    .map(|ch| font.italic_correction(font.glyph_id(ch)))
                    .unwrap_or(0.0);
                self.place_scripted(host, atom, ctx, delta, true, line);
            }
            AtomKind::Fraction {
                numerator,
                denominator,
                has_rule,
            } => {
                let display =
                    self.make_fraction(numerator, denominator, *has_rule, ctx, atom.nucleus_range());
                self.place_scripted(display, atom, ctx, 0.0, false, line);
            }
            AtomKind::Radical { radicand, degree } => {
                let display =
                    self.make_radical(radicand, degree.as_ref(), ctx, atom.nucleus_range());
                self.place_scripted(display, atom, ctx, 0.0, false, line);
            }
            AtomKind::Accent { accent, accentee } => {
                self.make_accent(atom, *accent, accentee, ctx, line);
            }
            AtomKind::LargeOperator { text, limits } => {
                self.make_large_op(atom, text, *limits, ctx, line);
            }
            AtomKind::Overline(inner) => {
                let display = self.make_overline(inner, ctx, atom.nucleus_range());
                self.place_scripted(display, atom, ctx, 0.0, false, line);
            }
            AtomKind::Underline(inner) => {
                let display = self.make_underline(inner, ctx, atom.nucleus_range());
                self.place_scripted(display, atom, ctx, 0.0, false, line);
            }
            AtomKind::Space { mu } => line.x += mu * font.mu(),
        }
    }

    // =========================================================================
    // Scripts
    // =========================================================================

    /// Push `host` and lay out the atom's trailing scripts after it.
    ///
    /// `delta` is the italic correction of the host's last glyph; with
    /// `kern_italic` the cursor also moves past it when there is no
    /// subscript.
    fn place_scripted(
        &self,
        mut host: DisplayBox,
        atom: &Atom,
        ctx: LayoutContext,
        delta: f32,
        kern_italic: bool,
        line: &mut ListBuilder,
    ) {
        if !atom.has_scripts() {
            line.push(host);
            return;
        }

        host.has_script = true;
        // Glyph runs start their scripts from the baseline
        let host_metrics = match host.kind {
            BoxKind::GlyphRun { .. } => None,
            _ => Some((host.ascent, host.descent)),
        };
        line.push(host);
        if kern_italic && delta > 0.0 && atom.subscript.is_none() {
            line.x += delta;
        }
        self.attach_scripts(atom, ctx, host_metrics, delta, line);
    }

    fn attach_scripts(
        &self,
        atom: &Atom,
        ctx: LayoutContext,
        host: Option<(f32, f32)>,
        delta: f32,
        line: &mut ListBuilder,
    ) {
        use MathConstant::*;

        let font = self.style_font(ctx.style);
        let script_font = self.style_font(ctx.style.script_style());
        let (mut shift_up, mut shift_down) = match host {
            Some((ascent, descent)) => (
                ascent - script_font.constant(SuperscriptBaselineDropMax),
                descent + script_font.constant(SubscriptBaselineDropMin),
            ),
            None => (0.0, 0.0),
        };
        let superscript_shift = if ctx.cramped {
            font.constant(SuperscriptShiftUpCramped)
        } else {
            font.constant(SuperscriptShiftUp)
        };
        let space_after = font.constant(SpaceAfterScript);

        let superscript = atom
            .superscript
            .as_ref()
            .map(|list| self.layout_list(list, ctx.superscript()));
        let subscript = atom
            .subscript
            .as_ref()
            .map(|list| self.layout_list(list, ctx.subscript()));

        match (superscript, subscript) {
            (None, None) => {}
            (None, Some(sub)) => {
                shift_down = shift_down
                    .max(font.constant(SubscriptShiftDown))
                    .max(sub.ascent - font.constant(SubscriptTopMax));
                let advance = sub.width + space_after;
                line.push_at(sub, Point::new(line.x, -shift_down));
                line.x += advance;
            }
            (Some(sup), None) => {
                shift_up = shift_up
                    .max(superscript_shift)
                    .max(sup.descent + font.constant(SuperscriptBottomMin));
                let advance = sup.width + space_after;
                line.push_at(sup, Point::new(line.x, shift_up));
                line.x += advance;
            }
            (Some(sup), Some(sub)) => {
                shift_up = shift_up
                    .max(superscript_shift)
                    .max(sup.descent + font.constant(SuperscriptBottomMin));
                shift_down = shift_down.max(font.constant(SubscriptShiftDown));

                let gap = (shift_up - sup.descent) + (shift_down - sub.ascent);
                let gap_min = font.constant(SubSuperscriptGapMin);
                if gap < gap_min {
                    shift_down += gap_min - gap;
                    let bottom_delta =
                        font.constant(SuperscriptBottomMaxWithSubscript) - (shift_up - sup.descent);
                    if bottom_delta > 0.0 {
                        shift_up += bottom_delta;
                        shift_down -= bottom_delta;
                    }
                }

                let advance = (sup.width + delta).max(sub.width) + space_after;
                let mut scripts = [
                    sup.at(Point::new(line.x + delta, shift_up)),
                    sub.at(Point::new(line.x, -shift_down)),
                ];
                scripts.sort_by_key(|s| s.range.start);
                for script in scripts {
                    let origin = script.origin;
                    line.push_at(script, origin);
                }
                line.x += advance;
            }
        }
    }

    // =========================================================================
    // Fractions
    // =========================================================================

    fn make_fraction(
        &self,
        numerator: &MathList,
        denominator: &MathList,
        has_rule: bool,
        ctx: LayoutContext,
        range: Range<usize>,
    ) -> DisplayBox {
        use MathConstant::*;

        let font = self.style_font(ctx.style);
        let numerator = self.layout_list(numerator, ctx.numerator());
        let denominator = self.layout_list(denominator, ctx.denominator());
        let display = ctx.style.is_display();
        let pick = |display_style: MathConstant, other: MathConstant| {
            font.constant(if display { display_style } else { other })
        };
        let axis = font.constant(AxisHeight);

        let (mut shift_up, mut shift_down, thickness);
        if has_rule {
            shift_up = pick(FractionNumeratorDisplayStyleShiftUp, FractionNumeratorShiftUp);
            shift_down = pick(
                FractionDenominatorDisplayStyleShiftDown,
                FractionDenominatorShiftDown,
            );
            thickness = font.constant(FractionRuleThickness);

            let numerator_gap = (shift_up - numerator.descent) - (axis + thickness / 2.0);
            let numerator_gap_min = pick(FractionNumDisplayStyleGapMin, FractionNumeratorGapMin);
            if numerator_gap < numerator_gap_min {
                shift_up += numerator_gap_min - numerator_gap;
            }

            let denominator_gap = (axis - thickness / 2.0) - (denominator.ascent - shift_down);
            let denominator_gap_min =
                pick(FractionDenomDisplayStyleGapMin, FractionDenominatorGapMin);
            if denominator_gap < denominator_gap_min {
                shift_down += denominator_gap_min - denominator_gap;
            }
        } else {
            shift_up = pick(StackTopDisplayStyleShiftUp, StackTopShiftUp);
            shift_down = pick(StackBottomDisplayStyleShiftDown, StackBottomShiftDown);
            thickness = 0.0;

            let clearance = (shift_up - numerator.descent) - (denominator.ascent - shift_down);
            let gap_min = pick(StackDisplayStyleGapMin, StackGapMin);
            if clearance < gap_min {
                let half = (gap_min - clearance) / 2.0;
                shift_up += half;
                shift_down += half;
            }
        }

        DisplayBox::fraction(
            numerator,
            denominator,
            shift_up,
            shift_down,
            axis,
            thickness,
            range,
        )
    }

    // =========================================================================
    // Radicals
    // =========================================================================

    fn make_radical(
        &self,
        radicand: &MathList,
        degree: Option<&MathList>,
        ctx: LayoutContext,
        range: Range<usize>,
    ) -> DisplayBox {
        use MathConstant::*;

        let font = self.style_font(ctx.style);
        let radicand = self.layout_list(radicand, ctx.cramped());

        let mut clearance = if ctx.style.is_display() {
            font.constant(RadicalDisplayStyleVerticalGap)
        } else {
            font.constant(RadicalVerticalGap)
        };
        let thickness = font.constant(RadicalRuleThickness);
        let requested = radicand.ascent + radicand.descent + clearance + thickness;

        let glyph = self
            .assembler(font)
            .build(font.glyph_id(RADICAL_SIGN), requested, Axis::Vertical);

        // Center the radicand inside a sign taller than needed
        let excess = glyph.height() - requested;
        if excess > 0.0 {
            clearance += excess / 2.0;
        }

        // Raise the sign so its top meets the rule
        let radical_ascent = thickness + clearance + radicand.ascent;
        let shift_up = radical_ascent - glyph.ascent();
        let metrics = RadicalMetrics {
            ascent: radical_ascent + font.constant(RadicalExtraAscender),
            descent: (glyph.height() - radical_ascent).max(radicand.descent),
            top_kern: clearance,
            line_thickness: thickness,
        };
        let glyph = glyph
            .with_shift_down(-shift_up)
            .into_display(range.start..range.start);

        let degree = degree.map(|list| {
            let degree = self.layout_list(list, ctx.radical_degree());
            let raise =
                font.constant(RadicalDegreeBottomRaisePercent) * (metrics.ascent - metrics.descent);
            (
                degree,
                font.constant(RadicalKernBeforeDegree),
                font.constant(RadicalKernAfterDegree),
                raise,
            )
        });

        DisplayBox::radical(glyph, radicand, degree, metrics, range)
    }

    // =========================================================================
    // Accents
    // =========================================================================

    fn make_accent(
        &self,
        atom: &Atom,
        accent: char,
        accentee: &MathList,
        ctx: LayoutContext,
        line: &mut ListBuilder,
    ) {
        let font = self.style_font(ctx.style);
        let inner = self.layout_list(accentee, ctx.cramped());

        let glyph = self
            .assembler(font)
            .widest_within(font.glyph_id(accent), inner.width, Axis::Horizontal);
        let delta = inner
            .ascent
            .min(font.constant(MathConstant::AccentBaseHeight));
        let skew = accent_skew(accentee, inner.width, &glyph, font);
        let accent_origin = Point::new(skew, inner.ascent - delta);
        let accent_box = glyph.into_display(atom.range.start..atom.range.start);

        // Scripts on an accented single character belong to the character
        match single_char_accentee(accentee) {
            Some(symbol) if atom.has_scripts() => {
                let scripted = Atom {
                    range: hull(
                        [
                            Some(symbol.range.clone()),
                            atom.superscript.as_ref().map(MathList::range),
                            atom.subscript.as_ref().map(MathList::range),
                        ]
                        .into_iter()
                        .flatten(),
                    ),
                    superscript: atom.superscript.clone(),
                    subscript: atom.subscript.clone(),
                    ..symbol.clone()
                };
                let inner = self.layout_list(&MathList::new(vec![scripted]), ctx.cramped());
                line.push(DisplayBox::accent(
                    accent_box,
                    inner,
                    accent_origin,
                    atom.range.clone(),
                ));
            }
            _ => {
                let display =
                    DisplayBox::accent(accent_box, inner, accent_origin, atom.nucleus_range());
                self.place_scripted(display, atom, ctx, 0.0, false, line);
            }
        }
    }

    // =========================================================================
    // Large Operators
    // =========================================================================

    fn make_large_op(
        &self,
        atom: &Atom,
        text: &str,
        limits: bool,
        ctx: LayoutContext,
        line: &mut ListBuilder,
    ) {
        use MathConstant::*;

        let font = self.style_font(ctx.style);
        let limits = limits && ctx.style.is_display();
        let nucleus_range = atom.nucleus_range();

        let mut chars = text.chars();
        let (nucleus, delta) = match (chars.next(), chars.next()) {
            (Some(ch), None) => {
                let mut glyph = font.glyph_id(ch);
                if ctx.style.is_display() && glyph != GlyphId::NOTDEF {
                    glyph = font.larger_glyph(glyph, font.constant(DisplayOperatorMinHeight));
                }
                let delta = font.italic_correction(glyph);

                let mut glyph_box = GlyphBox::new(glyph, font);
                // Center the operator on the math axis
                let shift_down =
                    0.5 * (glyph_box.ascent - glyph_box.descent) - font.constant(AxisHeight);
                if atom.subscript.is_some() && !limits {
                    glyph_box.width = (glyph_box.width - delta).max(0.0);
                }
                (
                    DisplayBox::glyph(glyph_box.with_shift_down(shift_down), nucleus_range),
                    delta,
                )
            }
            _ => (glyph_run(text, nucleus_range, font), 0.0),
        };

        if !(limits && atom.has_scripts()) {
            self.place_scripted(nucleus, atom, ctx, delta, false, line);
            return;
        }

        let upper = atom.superscript.as_ref().map(|list| {
            let display = self.layout_list(list, ctx.superscript());
            let gap = font
                .constant(UpperLimitGapMin)
                .max(font.constant(UpperLimitBaselineRiseMin) - display.descent)
                .max(0.0);
            Limit { display, gap }
        });
        let lower = atom.subscript.as_ref().map(|list| {
            let display = self.layout_list(list, ctx.subscript());
            let gap = font
                .constant(LowerLimitGapMin)
                .max(font.constant(LowerLimitBaselineDropMin) - display.ascent)
                .max(0.0);
            Limit { display, gap }
        });

        line.push(DisplayBox::large_operator(
            nucleus,
            upper,
            lower,
            delta / 2.0,
            font.constant(LimitExtraAscenderDescender),
            atom.range.clone(),
        ));
    }

    // =========================================================================
    // Over- and Underlines
    // =========================================================================

    fn make_overline(&self, inner: &MathList, ctx: LayoutContext, range: Range<usize>) -> DisplayBox {
        use MathConstant::*;

        let font = self.style_font(ctx.style);
        let inner = self.layout_list(inner, ctx.cramped());
        let gap = font.constant(OverbarVerticalGap);
        let thickness = font.constant(OverbarRuleThickness);

        let line_shift_up = inner.ascent + gap + thickness / 2.0;
        let ascent = inner.ascent + gap + thickness + font.constant(OverbarExtraAscender);
        let descent = inner.descent;
        DisplayBox::line(inner, line_shift_up, thickness, ascent, descent, range)
    }

    fn make_underline(&self, inner: &MathList, ctx: LayoutContext, range: Range<usize>) -> DisplayBox {
        use MathConstant::*;

        let font = self.style_font(ctx.style);
        let inner = self.layout_list(inner, ctx);
        let gap = font.constant(UnderbarVerticalGap);
        let thickness = font.constant(UnderbarRuleThickness);

        let line_shift_up = -(inner.descent + gap + thickness / 2.0);
        let ascent = inner.ascent;
        let descent = inner.descent + gap + thickness + font.constant(UnderbarExtraDescender);
        DisplayBox::line(inner, line_shift_up, thickness, ascent, descent, range)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Spacing class of every atom after binary-operator demotion; explicit
/// spaces have none and are skipped by the spacing table
fn spacing_classes(list: &MathList) -> Vec<Option<SpacingClass>> {
    let is_space = |atom: &Atom| matches!(atom.kind, AtomKind::Space { .. });

    let mut classes: Vec<SpacingClass> = list
        .atoms
        .iter()
        .filter(|a| !is_space(a))
        .map(Atom::spacing_class)
        .collect();
    resolve_binary_classes(&mut classes);

    let mut resolved = classes.into_iter();
    list.atoms
        .iter()
        .map(|atom| if is_space(atom) { None } else { resolved.next() })
        .collect()
}

fn flush_run(run: &mut Option<PendingRun>, line: &mut ListBuilder, font: &MathFont) {
    if let Some(pending) = run.take() {
        line.push(pending.finish(font));
    }
}

fn glyph_run(text: &str, range: Range<usize>, font: &MathFont) -> DisplayBox {
    let mut run = PendingRun::default();
    run.push(text, range, font);
    run.finish(font)
}

/// The accentee when it is a single character without scripts
fn single_char_accentee(accentee: &MathList) -> Option<&Atom> {
    accentee.single_symbol().filter(|atom| match &atom.kind {
        AtomKind::Symbol { text, .. } => text.chars().count() == 1,
        _ => false,
    })
}

/// Horizontal offset aligning the accent's attachment point with the
/// accentee's
fn accent_skew(accentee: &MathList, width: f32, glyph: &ExtensibleGlyph, font: &MathFont) -> f32 {
    let accent_attachment = match glyph {
        ExtensibleGlyph::Variant(g) => font.top_accent_attachment(g.glyph),
        ExtensibleGlyph::Constructed(c) => c.width / 2.0,
    };
    let accentee_attachment = single_char_accentee(accentee)
        .and_then(|atom| match &atom.kind {
            AtomKind::Symbol { text, .. } => text.chars().next(),
            _ => None,
        })
        .map(|ch| font.top_accent_attachment(font.glyph_id(ch)))
        .unwrap_or(width / 2.0);
    accentee_attachment - accent_attachment
}
