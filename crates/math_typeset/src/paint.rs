//! Math Painting - Convert a display tree to paint commands
//!
//! Flattens a [`DisplayBox`] tree into glyphs and rules at absolute
//! positions that a drawing backend can consume directly. The baseline of the
//! root box is at y = 0 and the y axis points up.

use crate::display::{BoxKind, DisplayBox, Point};
use crate::math_table::Axis;
use crate::metrics::GlyphId;
use serde::{Deserialize, Serialize};

// =============================================================================
// Paint Commands
// =============================================================================

/// A drawing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaintCommand {
    /// Draw glyphs of one size, each at its baseline-left point
    Glyphs {
        glyphs: Vec<(GlyphId, Point)>,
        font_size: f32,
    },
    /// Draw a horizontal rule centered on the segment from `start` to `end`
    Rule {
        start: Point,
        end: Point,
        thickness: f32,
    },
}

/// Output of painting a display tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintOutput {
    pub commands: Vec<PaintCommand>,
    pub ascent: f32,
    pub descent: f32,
    pub width: f32,
}

impl PaintOutput {
    /// Number of glyphs across all commands
    pub fn glyph_count(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                PaintCommand::Glyphs { glyphs, .. } => glyphs.len(),
                PaintCommand::Rule { .. } => 0,
            })
            .sum()
    }

    pub fn rules(&self) -> impl Iterator<Item = &PaintCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, PaintCommand::Rule { .. }))
    }
}

// =============================================================================
// Painter
// =============================================================================

/// Flattens display trees into paint commands
#[derive(Debug, Clone, Copy, Default)]
pub struct Painter;

impl Painter {
    pub fn new() -> Self {
        Self
    }

    /// Paint `display` with its baseline-left point at the origin
    pub fn paint(&self, display: &DisplayBox) -> PaintOutput {
        let mut commands = Vec::new();
        // The root's own origin is relative to a parent that is not painted
        let parent = Point::new(-display.origin.x, -display.origin.y);
        display.visit(parent, &mut |b, origin| self.paint_box(b, origin, &mut commands));

        PaintOutput {
            commands,
            ascent: display.ascent,
            descent: display.descent,
            width: display.width,
        }
    }

    fn paint_box(&self, display: &DisplayBox, origin: Point, commands: &mut Vec<PaintCommand>) {
        match &display.kind {
            BoxKind::List { .. } | BoxKind::LargeOperator { .. } | BoxKind::Accent { .. } => {}
            BoxKind::GlyphRun {
                glyphs, font_size, ..
            } => {
                commands.push(PaintCommand::Glyphs {
                    glyphs: glyphs
                        .iter()
                        .map(|(glyph, x)| (*glyph, origin.offset(*x, 0.0)))
                        .collect(),
                    font_size: *font_size,
                });
            }
            BoxKind::Glyph(glyph) => {
                commands.push(PaintCommand::Glyphs {
                    glyphs: vec![(glyph.glyph, origin.offset(0.0, -glyph.shift_down))],
                    font_size: glyph.font_size,
                });
            }
            BoxKind::Constructed(constructed) => {
                let base = origin.offset(0.0, -constructed.shift_down);
                let glyphs = constructed
                    .glyphs
                    .iter()
                    .zip(&constructed.offsets)
                    .map(|(glyph, offset)| {
                        let position = match constructed.axis {
                            Axis::Vertical => base.offset(0.0, *offset),
                            Axis::Horizontal => base.offset(*offset, 0.0),
                        };
                        (*glyph, position)
                    })
                    .collect();
                commands.push(PaintCommand::Glyphs {
                    glyphs,
                    font_size: constructed.font_size,
                });
            }
            BoxKind::Fraction {
                line_position,
                line_thickness,
                ..
            } => {
                let y = origin.y + line_position;
                self.rule(origin.x, origin.x + display.width, y, *line_thickness, commands);
            }
            BoxKind::Radical {
                glyph,
                radicand,
                top_kern,
                line_thickness,
                radical_shift,
                ..
            } => {
                let y = origin.y + radicand.ascent + top_kern + line_thickness / 2.0;
                let start = origin.x + radical_shift + glyph.width;
                self.rule(start, origin.x + display.width, y, *line_thickness, commands);
            }
            BoxKind::Line {
                line_shift_up,
                line_thickness,
                ..
            } => {
                let y = origin.y + line_shift_up;
                self.rule(origin.x, origin.x + display.width, y, *line_thickness, commands);
            }
        }
    }

    fn rule(&self, x0: f32, x1: f32, y: f32, thickness: f32, commands: &mut Vec<PaintCommand>) {
        // Fractions without a rule have zero thickness
        if thickness <= 0.0 || x1 <= x0 {
            return;
        }
        commands.push(PaintCommand::Rule {
            start: Point::new(x0, y),
            end: Point::new(x1, y),
            thickness,
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
