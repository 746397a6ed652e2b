//! Strict JSON parser.
//!
//! Parses a JSON document into a tree of typed [`Value`]s, validating the
//! grammar strictly and reporting the first violation with a specific
//! cause. There is no tolerance for comments, trailing commas, or partial
//! input, and no recovery: one error terminates the whole parse.
//!
//! # Components
//!
//! 1. **Scratch buffer**: a growable byte stack that stages decoded string
//!    content, with checkpoint/rewind so a failed production discards
//!    everything it pushed.
//!
//! 2. **Value model**: an owned tagged union over null, booleans, numbers,
//!    strings, and arrays.
//!
//! 3. **Parser engine**: a recursive descent over the input bytes with one
//!    byte of lookahead, driving the scratch buffer and producing values.

mod error;
mod parser;
mod scratch;
mod value;

pub use error::{ParseError, Result};
pub use value::{Type, Value};

/// Parse a JSON document from a string.
///
/// # Example
///
/// ```
/// use strictjson::parse;
///
/// let value = parse("[1, 2, 3]").unwrap();
/// assert_eq!(value.as_array().unwrap().len(), 3);
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_filename(input, None)
}

/// Parse a JSON document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    let ctx = error::ParseContext::new(filename);
    parser::parse_root(input, &ctx)
}
