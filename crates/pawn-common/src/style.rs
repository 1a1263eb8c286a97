use serde::Serialize;

/// Bit OR'd into a style byte for characters inside a false conditional branch.
pub const INACTIVE_FLAG: u8 = 0x40;

/// Mask selecting the lexical class bits of a style byte.
pub const STYLE_CLASS_MASK: u8 = 0x3f;

/// The lexical class assigned to a character for rendering.
///
/// Discriminants are the wire values written to the host style stream
/// (low six bits of the style byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum StyleClass {
    Default = 0,
    Comment = 1,
    CommentLine = 2,
    CommentDoc = 3,
    Number = 4,
    /// Generic keyword list 1.
    Word = 5,
    String = 6,
    Character = 7,
    Preprocessor = 9,
    Operator = 10,
    Identifier = 11,
    /// A string literal cut short by the end of its line.
    StringEol = 12,
    /// `@"..."` string where only a doubled quote escapes a quote.
    Verbatim = 13,
    CommentLineDoc = 15,
    /// Generic keyword list 2, doubling as the doc-comment keyword list.
    Word2 = 16,
    CommentDocKeyword = 17,
    CommentDocKeywordError = 18,
    Native = 19,
    Forward = 20,
    Statement = 21,
    Constant = 22,
}

impl StyleClass {
    /// Decode a class from its wire value. Unknown values map to `Default`.
    pub fn from_u8(value: u8) -> StyleClass {
        match value {
            1 => StyleClass::Comment,
            2 => StyleClass::CommentLine,
            3 => StyleClass::CommentDoc,
            4 => StyleClass::Number,
            5 => StyleClass::Word,
            6 => StyleClass::String,
            7 => StyleClass::Character,
            9 => StyleClass::Preprocessor,
            10 => StyleClass::Operator,
            11 => StyleClass::Identifier,
            12 => StyleClass::StringEol,
            13 => StyleClass::Verbatim,
            15 => StyleClass::CommentLineDoc,
            16 => StyleClass::Word2,
            17 => StyleClass::CommentDocKeyword,
            18 => StyleClass::CommentDocKeywordError,
            19 => StyleClass::Native,
            20 => StyleClass::Forward,
            21 => StyleClass::Statement,
            22 => StyleClass::Constant,
            _ => StyleClass::Default,
        }
    }
}

/// A style tag: a lexical class plus the orthogonal inactive flag.
///
/// The inactive flag means "lexically valid but inside a false conditional
/// branch; render grayed". It is independent of the class: tokens inside
/// inactive regions keep their semantic class, with the flag overlaid only
/// when the tag is packed into a wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    pub class: StyleClass,
    pub inactive: bool,
}

impl Style {
    /// A style tag with the inactive flag clear.
    pub fn active(class: StyleClass) -> Style {
        Style {
            class,
            inactive: false,
        }
    }

    pub fn new(class: StyleClass, inactive: bool) -> Style {
        Style { class, inactive }
    }

    /// Pack into the single byte stored in the host style stream.
    pub fn to_byte(self) -> u8 {
        let flag = if self.inactive { INACTIVE_FLAG } else { 0 };
        self.class as u8 | flag
    }

    /// Unpack a style stream byte.
    pub fn from_byte(byte: u8) -> Style {
        Style {
            class: StyleClass::from_u8(byte & STYLE_CLASS_MASK),
            inactive: byte & INACTIVE_FLAG != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack_round_trip() {
        let style = Style::new(StyleClass::CommentDoc, true);
        assert_eq!(style.to_byte(), 3 | INACTIVE_FLAG);
        assert_eq!(Style::from_byte(style.to_byte()), style);

        let plain = Style::active(StyleClass::Operator);
        assert_eq!(plain.to_byte(), 10);
        assert_eq!(Style::from_byte(10), plain);
    }

    #[test]
    fn inactive_flag_is_orthogonal_to_class() {
        let byte = Style::new(StyleClass::Native, true).to_byte();
        let decoded = Style::from_byte(byte);
        assert_eq!(decoded.class, StyleClass::Native);
        assert!(decoded.inactive);
    }

    #[test]
    fn unknown_wire_values_decode_to_default() {
        assert_eq!(StyleClass::from_u8(8), StyleClass::Default);
        assert_eq!(StyleClass::from_u8(14), StyleClass::Default);
        assert_eq!(StyleClass::from_u8(63), StyleClass::Default);
    }
}
