//! Shared leaf types for the Pawn lexer.
//!
//! This crate holds everything the lexer and its hosts agree on: the style
//! vocabulary written to the style stream, the packed per-line fold levels,
//! the in-memory source/style/fold buffers, keyword lists, and the option
//! set with its string-keyed property surface.

pub mod error;
pub mod fold;
pub mod options;
pub mod source;
pub mod style;
pub mod wordlist;

pub use error::ConfigError;
pub use fold::{
    FoldBuffer, FoldLevel, FOLD_LEVEL_BASE, FOLD_LEVEL_HEADER_FLAG, FOLD_LEVEL_NUMBER_MASK,
    FOLD_LEVEL_WHITE_FLAG,
};
pub use options::LexerOptions;
pub use source::{SourceBuffer, StyleBuffer};
pub use style::{Style, StyleClass, INACTIVE_FLAG, STYLE_CLASS_MASK};
pub use wordlist::WordList;
