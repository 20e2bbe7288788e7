//! Layout and cache configuration

use serde::{Deserialize, Serialize};

/// Configuration for the atom layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Apply TeX inter-atom spacing between neighbouring atoms
    pub inter_atom_spacing: bool,
    /// Upper bound on how many times an extender part may be repeated when
    /// building a glyph assembly
    pub max_extender_repeats: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            inter_atom_spacing: true,
            max_extender_repeats: 256,
        }
    }
}

/// Configuration for the font cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontCacheConfig {
    /// Maximum number of (font, size) entries kept before the sized cache is
    /// flushed. Loaded faces are never evicted.
    pub max_sized_fonts: usize,
}

impl Default for FontCacheConfig {
    fn default() -> Self {
        Self {
            max_sized_fonts: 64,
        }
    }
}
