//! Self-contained regular-expression interpreter used for string
//! synthesis ("xeger": generating text that matches a pattern by walking
//! its syntax tree, not by search) and for structural length bounds.
//!
//! The AST is built fresh per pattern and discarded after use; the only
//! state that survives inside one synthesis pass is the backreference
//! cache for realized groups.

mod ast;
mod bounds;
mod synth;

pub use ast::{parse, ClassItem, Node};
pub use bounds::match_length_bounds;
pub use synth::{synthesize, REPEAT_CAP};

/// The alphabet candidate sets are drawn from and complemented against:
/// ASCII digits, letters, punctuation, and whitespace.
pub(crate) const PRINTABLE: &str = concat!(
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    " \t\n\r\x0b\x0c",
);

pub(crate) const DIGITS: &str = "0123456789";
pub(crate) const WORD: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";
pub(crate) const WHITESPACE: &str = " \t\n\r\x0b\x0c";

/// Named character categories (`\d`, `\w`, `\s` and their negations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Digit,
    NotDigit,
    Space,
    NotSpace,
    Word,
    NotWord,
}

impl Category {
    /// Candidate characters for the category, over the printable alphabet.
    pub(crate) fn candidates(self) -> Vec<char> {
        match self {
            Category::Digit => DIGITS.chars().collect(),
            Category::Space => WHITESPACE.chars().collect(),
            Category::Word => WORD.chars().collect(),
            Category::NotDigit => complement(DIGITS),
            Category::NotSpace => complement(WHITESPACE),
            Category::NotWord => complement(WORD),
        }
    }
}

pub(crate) fn complement(excluded: &str) -> Vec<char> {
    PRINTABLE
        .chars()
        .filter(|c| !excluded.contains(*c))
        .collect()
}
