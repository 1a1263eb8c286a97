//! Lexer options and the string-keyed property surface.

use crate::error::ConfigError;

/// All behavior switches for the lexer and its fold pass.
///
/// Defaults mirror the shipped configuration: preprocessor tracking on,
/// folding off until the host enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    /// When true the preprocessor style ends at the first space after the
    /// directive word; when false it runs to a following comment start.
    pub styling_within_preprocessor: bool,
    /// Allow `$` in identifier character classes.
    pub identifiers_allow_dollars: bool,
    /// Interpret `#if`/`#else`/`#endif` and gray out inactive branches.
    /// Disabled, all code is treated active and directives are not evaluated.
    pub track_preprocessor: bool,
    /// Record `#define`s into the macro history. Disabled, the entire
    /// history is discarded before every scan.
    pub update_preprocessor: bool,
    pub fold: bool,
    pub fold_comment: bool,
    /// Honor explicit `//{` / `//}` fold markers (needs `fold_comment`).
    pub fold_comment_explicit: bool,
    pub fold_preprocessor: bool,
    /// Mark blank lines with the white flag.
    pub fold_compact: bool,
    /// Place the fold boundary of a `"} else {"` line at the outer level.
    pub fold_at_else: bool,
}

impl Default for LexerOptions {
    fn default() -> LexerOptions {
        LexerOptions {
            styling_within_preprocessor: false,
            identifiers_allow_dollars: true,
            track_preprocessor: true,
            update_preprocessor: true,
            fold: false,
            fold_comment: false,
            fold_comment_explicit: true,
            fold_preprocessor: false,
            fold_compact: false,
            fold_at_else: false,
        }
    }
}

impl LexerOptions {
    /// Set an option from its property name and a string value.
    ///
    /// Values read with `atoi` semantics: the leading integer of the
    /// string, non-zero meaning true (so `"1"` is true and `"true"` is
    /// false).
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let flag = leading_int(value) != 0;
        match key {
            "styling.within.preprocessor" => self.styling_within_preprocessor = flag,
            "lexer.pawn.allow.dollars" => self.identifiers_allow_dollars = flag,
            "lexer.pawn.track.preprocessor" => self.track_preprocessor = flag,
            "lexer.pawn.update.preprocessor" => self.update_preprocessor = flag,
            "fold" => self.fold = flag,
            "fold.comment" => self.fold_comment = flag,
            "fold.pawn.comment.explicit" => self.fold_comment_explicit = flag,
            "fold.preprocessor" => self.fold_preprocessor = flag,
            "fold.compact" => self.fold_compact = flag,
            "fold.at.else" => self.fold_at_else = flag,
            _ => return Err(ConfigError::UnknownProperty(key.to_owned())),
        }
        Ok(())
    }
}

/// `atoi`-style integer prefix: optional sign, then digits, 0 otherwise.
fn leading_int(s: &str) -> i64 {
    let t = s.trim_start();
    let (negative, digits) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let mut value: i64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}
