//! Math Atoms - The formula tree consumed by layout
//!
//! The external parser produces a [`MathList`] of [`Atom`]s. Each atom knows
//! its kind, the range of source characters it came from, and optional
//! trailing scripts. Trees are immutable during layout.

use crate::spacing::SpacingClass;
use serde::{Deserialize, Serialize};
use std::ops::Range;

// =============================================================================
// Math List
// =============================================================================

/// An ordered list of atoms
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MathList {
    pub atoms: Vec<Atom>,
}

impl MathList {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Source range spanned by the list: the hull of its atoms' ranges
    pub fn range(&self) -> Range<usize> {
        hull(self.atoms.iter().map(|a| a.range.clone()))
    }

    /// The single symbol this list consists of, if any
    pub fn single_symbol(&self) -> Option<&Atom> {
        match self.atoms.as_slice() {
            [atom @ Atom {
                kind: AtomKind::Symbol { .. },
                ..
            }] if !atom.has_scripts() => Some(atom),
            _ => None,
        }
    }
}

impl From<Vec<Atom>> for MathList {
    fn from(atoms: Vec<Atom>) -> Self {
        Self::new(atoms)
    }
}

/// Smallest range covering every non-empty range in `ranges`
pub(crate) fn hull(ranges: impl IntoIterator<Item = Range<usize>>) -> Range<usize> {
    ranges
        .into_iter()
        .filter(|r| !r.is_empty())
        .reduce(|a, b| a.start.min(b.start)..a.end.max(b.end))
        .unwrap_or(0..0)
}

// =============================================================================
// Atoms
// =============================================================================

/// Class of a plain symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolClass {
    Ordinary,
    Variable,
    Number,
    BinaryOperator,
    Relation,
    Open,
    Close,
    Punctuation,
}

/// What an atom is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AtomKind {
    /// One or more characters set as plain glyphs
    Symbol { text: String, class: SymbolClass },
    /// Numerator over denominator; without a rule it is a generalized fraction
    Fraction {
        numerator: MathList,
        denominator: MathList,
        has_rule: bool,
    },
    /// Square root, or nth root when a degree is present
    Radical {
        radicand: MathList,
        degree: Option<MathList>,
    },
    /// An accent character over a list
    Accent { accent: char, accentee: MathList },
    /// Sum, integral, lim, ...; `limits` stacks scripts above and below in
    /// display style
    LargeOperator { text: String, limits: bool },
    Overline(MathList),
    Underline(MathList),
    /// Explicit horizontal space in math units (1/18 em)
    Space { mu: f32 },
}

/// A node of the formula tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub kind: AtomKind,
    /// Source characters of the whole atom, scripts included
    pub range: Range<usize>,
    #[serde(default)]
    pub superscript: Option<MathList>,
    #[serde(default)]
    pub subscript: Option<MathList>,
}

impl Atom {
    pub fn new(kind: AtomKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            superscript: None,
            subscript: None,
        }
    }

    /// A single ordinary character
    pub fn ordinary(ch: char, position: usize) -> Self {
        Self::symbol(ch, SymbolClass::Ordinary, position)
    }

    /// A single character occupying one source position
    pub fn symbol(ch: char, class: SymbolClass, position: usize) -> Self {
        Self::new(
            AtomKind::Symbol {
                text: ch.to_string(),
                class,
            },
            position..position + 1,
        )
    }

    /// A multi-character symbol (e.g. a number)
    pub fn text(text: impl Into<String>, class: SymbolClass, range: Range<usize>) -> Self {
        Self::new(
            AtomKind::Symbol {
                text: text.into(),
                class,
            },
            range,
        )
    }

    pub fn fraction(numerator: MathList, denominator: MathList, range: Range<usize>) -> Self {
        Self::new(
            AtomKind::Fraction {
                numerator,
                denominator,
                has_rule: true,
            },
            range,
        )
    }

    /// A fraction without a rule (binomial-style stack)
    pub fn stack(numerator: MathList, denominator: MathList, range: Range<usize>) -> Self {
        Self::new(
            AtomKind::Fraction {
                numerator,
                denominator,
                has_rule: false,
            },
            range,
        )
    }

    pub fn sqrt(radicand: MathList, range: Range<usize>) -> Self {
        Self::new(
            AtomKind::Radical {
                radicand,
                degree: None,
            },
            range,
        )
    }

    pub fn root(degree: MathList, radicand: MathList, range: Range<usize>) -> Self {
        Self::new(
            AtomKind::Radical {
                radicand,
                degree: Some(degree),
            },
            range,
        )
    }

    pub fn accent(accent: char, accentee: MathList, range: Range<usize>) -> Self {
        Self::new(AtomKind::Accent { accent, accentee }, range)
    }

    pub fn large_op(text: impl Into<String>, limits: bool, range: Range<usize>) -> Self {
        Self::new(
            AtomKind::LargeOperator {
                text: text.into(),
                limits,
            },
            range,
        )
    }

    pub fn overline(inner: MathList, range: Range<usize>) -> Self {
        Self::new(AtomKind::Overline(inner), range)
    }

    pub fn underline(inner: MathList, range: Range<usize>) -> Self {
        Self::new(AtomKind::Underline(inner), range)
    }

    pub fn space(mu: f32, position: usize) -> Self {
        Self::new(AtomKind::Space { mu }, position..position)
    }

    /// Attach a superscript
    pub fn with_superscript(mut self, superscript: MathList) -> Self {
        self.superscript = Some(superscript);
        self
    }

    /// Attach a subscript
    pub fn with_subscript(mut self, subscript: MathList) -> Self {
        self.subscript = Some(subscript);
        self
    }

    pub fn has_scripts(&self) -> bool {
        self.superscript.is_some() || self.subscript.is_some()
    }

    /// Source range of the nucleus: the atom's range up to its first script
    pub fn nucleus_range(&self) -> Range<usize> {
        let first_script = [&self.superscript, &self.subscript]
            .into_iter()
            .flatten()
            .map(|list| list.range())
            .filter(|r| !r.is_empty())
            .map(|r| r.start)
            .min();
        match first_script {
            Some(start) => self.range.start..start.clamp(self.range.start, self.range.end),
            None => self.range.clone(),
        }
    }

    /// Class used for inter-atom spacing
    pub fn spacing_class(&self) -> SpacingClass {
        match &self.kind {
            AtomKind::Symbol { class, .. } => match class {
                SymbolClass::Ordinary | SymbolClass::Variable | SymbolClass::Number => {
                    SpacingClass::Ordinary
                }
                SymbolClass::BinaryOperator => SpacingClass::Binary,
                SymbolClass::Relation => SpacingClass::Relation,
                SymbolClass::Open => SpacingClass::Open,
                SymbolClass::Close => SpacingClass::Close,
                SymbolClass::Punctuation => SpacingClass::Punctuation,
            },
            AtomKind::Fraction { .. } => SpacingClass::Inner,
            AtomKind::LargeOperator { .. } => SpacingClass::Operator,
            AtomKind::Radical { .. }
            | AtomKind::Accent { .. }
            | AtomKind::Overline(_)
            | AtomKind::Underline(_)
            | AtomKind::Space { .. } => SpacingClass::Ordinary,
        }
    }
}
