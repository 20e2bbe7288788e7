//! Math Typeset - Box layout for mathematical formulas
//!
//! This crate turns a tree of math atoms into positioned boxes:
//! - A math atom tree produced by an external parser
//! - Font math tables (OpenType MATH constants, glyph variants and assemblies)
//!   with a heuristic fallback for plain text fonts
//! - A shared font cache fed by an external font service
//! - Extensible glyph sizing for radical signs, operators and wide accents
//! - Layout of atoms into a display box tree in display or text style
//! - Flattening the box tree into absolute paint commands

pub mod assembler;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod layout;
pub mod math_table;
pub mod metrics;
pub mod model;
pub mod paint;
pub mod spacing;
pub mod style;

#[cfg(test)]
mod testing;

pub use assembler::{ExtensibleGlyph, ExtensibleGlyphAssembler};
pub use cache::{FontCache, FontLoader};
pub use config::{FontCacheConfig, LayoutConfig};
pub use display::{
    BoxKind, ConstructedGlyph, DisplayBox, GlyphBox, Limit, Point, RadicalMetrics, VerticalShift,
};
pub use error::*;
pub use font::{FontFace, FontId, GlyphMetrics, MathFont};
pub use layout::AtomLayoutEngine;
pub use math_table::{Axis, FontMathTable, GlyphAssembly, GlyphPart, MathConstant};
pub use metrics::{GlyphBounds, GlyphId, GlyphMetricsProvider, GlyphRecord, StaticGlyphMetrics};
pub use model::*;
pub use paint::{PaintCommand, PaintOutput, Painter};
pub use spacing::{Spacing, SpacingClass};
pub use style::{LayoutContext, LineStyle};
