//! Layout styles and the immutable layout context
//!
//! TeX lays out every sub-formula in one of four styles, each optionally
//! cramped (superscripts raised less). Entering a fraction, a script, a
//! radical or an accent derives the child's context from the parent's with
//! the fixed rules below; the context is passed by value down the recursion.

use crate::font::MathFont;
use crate::math_table::MathConstant;
use serde::{Deserialize, Serialize};

/// Layout style, largest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineStyle {
    Display,
    Text,
    Script,
    ScriptScript,
}

impl LineStyle {
    /// Style of a fraction's numerator and denominator
    pub fn fraction_style(self) -> Self {
        match self {
            LineStyle::Display => LineStyle::Text,
            LineStyle::Text => LineStyle::Script,
            LineStyle::Script | LineStyle::ScriptScript => LineStyle::ScriptScript,
        }
    }

    /// Style of super- and subscripts
    pub fn script_style(self) -> Self {
        match self {
            LineStyle::Display | LineStyle::Text => LineStyle::Script,
            LineStyle::Script | LineStyle::ScriptScript => LineStyle::ScriptScript,
        }
    }

    pub fn is_display(self) -> bool {
        self == LineStyle::Display
    }

    /// Script styles suppress conditional inter-atom spacing
    pub fn is_script(self) -> bool {
        matches!(self, LineStyle::Script | LineStyle::ScriptScript)
    }

    /// Point size of this style for a base font
    pub fn font_size(self, base: &MathFont) -> f32 {
        match self {
            LineStyle::Display | LineStyle::Text => base.size(),
            LineStyle::Script => base.size() * base.constant(MathConstant::ScriptPercentScaleDown),
            LineStyle::ScriptScript => {
                base.size() * base.constant(MathConstant::ScriptScriptPercentScaleDown)
            }
        }
    }
}

/// Style and cramping of the sub-formula being laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutContext {
    pub style: LineStyle,
    pub cramped: bool,
}

impl LayoutContext {
    pub fn new(style: LineStyle) -> Self {
        Self {
            style,
            cramped: false,
        }
    }

    pub fn numerator(self) -> Self {
        Self {
            style: self.style.fraction_style(),
            cramped: self.cramped,
        }
    }

    pub fn denominator(self) -> Self {
        Self {
            style: self.style.fraction_style(),
            cramped: true,
        }
    }

    pub fn superscript(self) -> Self {
        Self {
            style: self.style.script_style(),
            cramped: self.cramped,
        }
    }

    pub fn subscript(self) -> Self {
        Self {
            style: self.style.script_style(),
            cramped: true,
        }
    }

    /// Radicands, accentees and overlined lists keep the style but are cramped
    pub fn cramped(self) -> Self {
        Self {
            style: self.style,
            cramped: true,
        }
    }

    pub fn radical_degree(self) -> Self {
        Self {
            style: LineStyle::ScriptScript,
            cramped: false,
        }
    }
}
