use std::fmt;

/// An error from the lexer's configuration surface.
///
/// The lexing core itself never fails; only host-driven configuration
/// (properties, word-list slots) can be rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A property name the lexer does not define.
    UnknownProperty(String),
    /// A word-list slot outside the seven defined slots.
    InvalidWordListSlot(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownProperty(name) => {
                write!(f, "unknown lexer property: {name}")
            }
            ConfigError::InvalidWordListSlot(slot) => {
                write!(f, "invalid word list slot: {slot} (valid slots are 0..=6)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offender() {
        assert_eq!(
            ConfigError::UnknownProperty("fold.bogus".into()).to_string(),
            "unknown lexer property: fold.bogus"
        );
        assert_eq!(
            ConfigError::InvalidWordListSlot(9).to_string(),
            "invalid word list slot: 9 (valid slots are 0..=6)"
        );
    }
}
