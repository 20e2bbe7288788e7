//! Inter-atom spacing
//!
//! TeX's table of the space inserted between two neighbouring atoms, indexed
//! by their classes. Conditional entries only apply in display and text style.

use crate::style::LineStyle;
use serde::{Deserialize, Serialize};

/// Spacing class of an atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpacingClass {
    Ordinary,
    Operator,
    Binary,
    Relation,
    Open,
    Close,
    Punctuation,
    Inner,
}

/// Amount of space between two atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    None,
    Thin,
    Medium,
    Thick,
}

impl Spacing {
    /// Width in math units (1/18 em)
    pub fn mu(self) -> f32 {
        match self {
            Spacing::None => 0.0,
            Spacing::Thin => 3.0,
            Spacing::Medium => 4.0,
            Spacing::Thick => 5.0,
        }
    }
}

#[derive(Clone, Copy)]
enum Entry {
    Zero,
    Always(Spacing),
    /// Only outside script styles
    NotScript(Spacing),
}

const fn row(cells: [Entry; 8]) -> [Entry; 8] {
    cells
}

use Entry::{Always as A, NotScript as N, Zero as Z};
use Spacing::{Medium as M, Thick as K, Thin as T};

// Rows: left atom; columns: right atom.
// Ord, Op, Bin, Rel, Open, Close, Punct, Inner
const TABLE: [[Entry; 8]; 8] = [
    row([Z, A(T), N(M), N(K), Z, Z, Z, N(T)]),
    row([A(T), A(T), Z, N(K), Z, Z, Z, N(T)]),
    row([N(M), N(M), Z, Z, N(M), Z, Z, N(M)]),
    row([N(K), N(K), Z, Z, N(K), Z, Z, N(K)]),
    row([Z, Z, Z, Z, Z, Z, Z, Z]),
    row([Z, A(T), N(M), N(K), Z, Z, Z, N(T)]),
    row([N(T), N(T), Z, N(T), N(T), N(T), N(T), N(T)]),
    row([N(T), A(T), N(M), N(K), N(T), Z, N(T), N(T)]),
];

fn index(class: SpacingClass) -> usize {
    match class {
        SpacingClass::Ordinary => 0,
        SpacingClass::Operator => 1,
        SpacingClass::Binary => 2,
        SpacingClass::Relation => 3,
        SpacingClass::Open => 4,
        SpacingClass::Close => 5,
        SpacingClass::Punctuation => 6,
        SpacingClass::Inner => 7,
    }
}

/// Space between a `left` atom and the `right` atom following it
pub fn atom_space(left: SpacingClass, right: SpacingClass, style: LineStyle) -> Spacing {
    match TABLE[index(left)][index(right)] {
        Entry::Zero => Spacing::None,
        Entry::Always(spacing) => spacing,
        Entry::NotScript(spacing) if !style.is_script() => spacing,
        Entry::NotScript(_) => Spacing::None,
    }
}

/// Demote binary operators that have nothing to operate on.
///
/// A binary operator becomes ordinary at the start of a list, after another
/// binary operator, an operator, a relation, an opening delimiter or
/// punctuation, and when followed by a relation, a closing delimiter or
/// punctuation.
pub fn resolve_binary_classes(classes: &mut [SpacingClass]) {
    for i in 0..classes.len() {
        if classes[i] != SpacingClass::Binary {
            continue;
        }
        let demote_before = match i.checked_sub(1).map(|p| classes[p]) {
            None => true,
            Some(prev) => matches!(
                prev,
                SpacingClass::Binary
                    | SpacingClass::Operator
                    | SpacingClass::Relation
                    | SpacingClass::Open
                    | SpacingClass::Punctuation
            ),
        };
        let demote_after = match classes.get(i + 1) {
            // A trailing binary operator has no right operand
            None => true,
            Some(next) => matches!(
                next,
                SpacingClass::Relation | SpacingClass::Close | SpacingClass::Punctuation
            ),
        };
        if demote_before || demote_after {
            classes[i] = SpacingClass::Ordinary;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SpacingClass::*;

    #[test]
    fn test_spacing_amounts() {
        assert_eq!(atom_space(Ordinary, Binary, LineStyle::Text), Spacing::Medium);
        assert_eq!(atom_space(Ordinary, Relation, LineStyle::Display), Spacing::Thick);
        assert_eq!(atom_space(Ordinary, Operator, LineStyle::Text), Spacing::Thin);
        assert_eq!(atom_space(Ordinary, Ordinary, LineStyle::Text), Spacing::None);
        assert_eq!(atom_space(Open, Ordinary, LineStyle::Text), Spacing::None);
    }

    #[test]
    fn test_script_style_suppresses_conditional_space() {
        assert_eq!(atom_space(Ordinary, Binary, LineStyle::Script), Spacing::None);
        assert_eq!(atom_space(Relation, Ordinary, LineStyle::ScriptScript), Spacing::None);
        // Operator spacing applies in every style
        assert_eq!(atom_space(Operator, Ordinary, LineStyle::Script), Spacing::Thin);
    }

    #[test]
    fn test_binary_demotion() {
        // "-x": leading minus is unary
        let mut classes = vec![Binary, Ordinary];
        resolve_binary_classes(&mut classes);
        assert_eq!(classes, vec![Ordinary, Ordinary]);

        // "x+y" keeps its binary operator
        let mut classes = vec![Ordinary, Binary, Ordinary];
        resolve_binary_classes(&mut classes);
        assert_eq!(classes[1], Binary);

        // "x=-y"
        let mut classes = vec![Ordinary, Relation, Binary, Ordinary];
        resolve_binary_classes(&mut classes);
        assert_eq!(classes[2], Ordinary);

        // "(x+)"
        let mut classes = vec![Open, Ordinary, Binary, Close];
        resolve_binary_classes(&mut classes);
        assert_eq!(classes[2], Ordinary);
    }
}
