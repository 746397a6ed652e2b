//! Error types for JSON parsing.

use thiserror::Error;

/// Result type for JSON parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => String::new(),
        }
    }
}

/// Error type for JSON parsing.
///
/// Parsing stops at the first violation; the variant is the cause. Callers
/// receive the error exactly as the failing production raised it, with no
/// wrapping along the way up.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Document is empty or contains only whitespace.
    #[error("No value found in document{0}")]
    NoValueFound(String),

    /// Literal or number grammar mismatch.
    #[error("Invalid value{0}")]
    InvalidValue(String),

    /// Extra non-whitespace content after the root value.
    #[error("Unexpected extra content{0}")]
    ExtraContent(String),

    /// Number converts to an infinite magnitude.
    #[error("Number out of range{0}")]
    NumberOutOfRange(String),

    /// String never closed before end of input.
    #[error("Unterminated string{0}")]
    UnterminatedString(String),

    /// Unrecognized character after a backslash.
    #[error("Bad escaped character{0}")]
    BadEscapedChar(String),

    /// Raw control character inside a string.
    #[error("Bad character in string{0}")]
    BadCharInString(String),

    /// Malformed or unpaired surrogate sequence.
    #[error("Illegal surrogate{0}")]
    IllegalSurrogate(String),

    /// `\u` not followed by 4 hex digits.
    #[error("Bad Unicode escape{0}")]
    BadUnicodeEscape(String),

    /// Array element not followed by a comma or closing bracket.
    #[error("Expected comma or closing bracket{0}")]
    ExpectedCommaOrBracket(String),
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::NoValueFound(_) => ParseError::NoValueFound(suffix),
            ParseError::InvalidValue(_) => ParseError::InvalidValue(suffix),
            ParseError::ExtraContent(_) => ParseError::ExtraContent(suffix),
            ParseError::NumberOutOfRange(_) => ParseError::NumberOutOfRange(suffix),
            ParseError::UnterminatedString(_) => ParseError::UnterminatedString(suffix),
            ParseError::BadEscapedChar(_) => ParseError::BadEscapedChar(suffix),
            ParseError::BadCharInString(_) => ParseError::BadCharInString(suffix),
            ParseError::IllegalSurrogate(_) => ParseError::IllegalSurrogate(suffix),
            ParseError::BadUnicodeEscape(_) => ParseError::BadUnicodeEscape(suffix),
            ParseError::ExpectedCommaOrBracket(_) => ParseError::ExpectedCommaOrBracket(suffix),
        }
    }
}
