//! Packed per-line fold levels and their store.

use serde::Serialize;

/// Base fold level for top-level code; leaves headroom below for negative
/// drift on unbalanced input.
pub const FOLD_LEVEL_BASE: u32 = 0x400;

/// Set when the line is blank and compact folding is enabled.
pub const FOLD_LEVEL_WHITE_FLAG: u32 = 0x1000;

/// Set when the line opens a deeper region than it sits at (a fold header).
pub const FOLD_LEVEL_HEADER_FLAG: u32 = 0x2000;

/// Mask selecting the numeric level out of the low half of a packed value.
pub const FOLD_LEVEL_NUMBER_MASK: u32 = 0x0fff;

/// A packed fold level: this line's level and flags in the low 16 bits,
/// the next line's level in the high 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoldLevel(pub u32);

impl FoldLevel {
    /// Pack a (current, next) level pair with its flags.
    pub fn pack(current: u32, next: u32, header: bool, white: bool) -> FoldLevel {
        let mut raw = (current & 0xffff) | (next << 16);
        if white {
            raw |= FOLD_LEVEL_WHITE_FLAG;
        }
        if header {
            raw |= FOLD_LEVEL_HEADER_FLAG;
        }
        FoldLevel(raw)
    }

    /// Numeric nesting depth of this line.
    pub fn number(self) -> u32 {
        self.0 & FOLD_LEVEL_NUMBER_MASK
    }

    /// Numeric nesting depth carried into the next line.
    pub fn next(self) -> u32 {
        self.0 >> 16
    }

    pub fn is_header(self) -> bool {
        self.0 & FOLD_LEVEL_HEADER_FLAG != 0
    }

    pub fn is_white(self) -> bool {
        self.0 & FOLD_LEVEL_WHITE_FLAG != 0
    }
}

/// One packed level per line; lines never written read as the base level.
#[derive(Debug, Default)]
pub struct FoldBuffer {
    levels: Vec<u32>,
}

impl FoldBuffer {
    pub fn new() -> FoldBuffer {
        FoldBuffer::default()
    }

    /// Raw packed value for `line`, or `FOLD_LEVEL_BASE` if never set.
    pub fn level_at(&self, line: usize) -> u32 {
        self.levels.get(line).copied().unwrap_or(FOLD_LEVEL_BASE)
    }

    pub fn fold_level(&self, line: usize) -> FoldLevel {
        FoldLevel(self.level_at(line))
    }

    pub fn set_level(&mut self, line: usize, level: u32) {
        if self.levels.len() <= line {
            self.levels.resize(line + 1, FOLD_LEVEL_BASE);
        }
        self.levels[line] = level;
    }
}
