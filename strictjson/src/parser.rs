//! Recursive descent over the input bytes.
//!
//! The parser walks the document left to right with one byte of lookahead
//! after each whitespace skip. String contents are staged in the scratch
//! buffer; every production that pushes records a mark first and rewinds to
//! it on failure, so an error never leaves partial bytes behind.

use crate::error::{ParseContext, ParseError, Result};
use crate::scratch::Scratch;
use crate::value::Value;

/// Parse a complete document into a single value.
///
/// The root value must span the entire input aside from surrounding
/// whitespace. The scratch buffer is fully drained by the time this
/// returns, on success and on failure.
pub fn parse_root(input: &str, ctx: &ParseContext) -> Result<Value> {
    let mut parser = Parser::new(input, ctx);
    let result = parser.parse_document();
    debug_assert!(parser.scratch.is_empty(), "scratch not drained after parse");
    result
}

/// Parser state for one document. Not shared across parses.
struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    scratch: Scratch,
    ctx: &'a ParseContext,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, ctx: &'a ParseContext) -> Self {
        Parser {
            input: input.as_bytes(),
            pos: 0,
            scratch: Scratch::new(),
            ctx,
        }
    }

    fn parse_document(&mut self) -> Result<Value> {
        self.skip_whitespace();
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.locate(ParseError::ExtraContent(String::new())));
        }
        Ok(value)
    }

    /// Dispatch one value production on the next byte.
    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(b'n') => self.parse_literal(b"null", Value::Null),
            Some(b't') => self.parse_literal(b"true", Value::Bool(true)),
            Some(b'f') => self.parse_literal(b"false", Value::Bool(false)),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b'[') => self.parse_array(),
            None => Err(self.locate(ParseError::NoValueFound(String::new()))),
            Some(_) => self.parse_number(),
        }
    }

    /// Match an exact literal byte-for-byte.
    fn parse_literal(&mut self, literal: &'static [u8], value: Value) -> Result<Value> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(self.locate(ParseError::InvalidValue(String::new())))
        }
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    /// Validate a number span against the grammar, then convert it.
    ///
    /// Grammar: `-? ( 0 | [1-9][0-9]* ) ( . [0-9]+ )? ( [eE] [+-]? [0-9]+ )?`
    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.advance();
        }
        match self.peek() {
            Some(b'0') => {
                self.advance();
                // a leading zero may not be followed by another digit
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(self.locate(ParseError::InvalidValue(String::new())));
                }
            }
            Some(b'1'..=b'9') => {
                self.advance();
                self.skip_digits();
            }
            _ => return Err(self.locate(ParseError::InvalidValue(String::new()))),
        }
        if self.peek() == Some(b'.') {
            self.advance();
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.locate(ParseError::InvalidValue(String::new())));
            }
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.locate(ParseError::InvalidValue(String::new())));
            }
            self.skip_digits();
        }

        // The validated span is ASCII and a subset of what str::parse::<f64>
        // accepts, so both conversions below cannot fail.
        let span = std::str::from_utf8(&self.input[start..self.pos]).unwrap();
        let number: f64 = span.parse().unwrap();
        if number.is_infinite() {
            return Err(self.locate_at(start, ParseError::NumberOutOfRange(String::new())));
        }
        Ok(Value::Number(number))
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// Parse a quoted string, staging decoded bytes in the scratch buffer.
    ///
    /// On success the bytes pushed since the mark are popped into an owned
    /// string; on failure the mark is rewound so the buffer ends up exactly
    /// where it started either way.
    fn parse_string(&mut self) -> Result<String> {
        let mark = self.scratch.mark();
        match self.scan_string() {
            Ok(()) => {
                let n = self.scratch.len() - mark;
                let bytes = self.scratch.pop(n).to_vec();
                // the scratch holds bytes copied from the UTF-8 input or
                // encoded code points, so this cannot fail
                Ok(String::from_utf8(bytes).unwrap())
            }
            Err(e) => {
                self.scratch.rewind(mark);
                Err(e)
            }
        }
    }

    fn scan_string(&mut self) -> Result<()> {
        self.expect_byte(b'"');
        loop {
            match self.peek() {
                None => return Err(self.locate(ParseError::UnterminatedString(String::new()))),
                Some(b'"') => {
                    self.advance();
                    return Ok(());
                }
                Some(b'\\') => {
                    self.advance();
                    self.scan_escape()?;
                }
                Some(byte) if byte < 0x20 => {
                    return Err(self.locate(ParseError::BadCharInString(String::new())));
                }
                Some(byte) => {
                    self.scratch.push_byte(byte);
                    self.advance();
                }
            }
        }
    }

    /// Decode the escape following a backslash.
    fn scan_escape(&mut self) -> Result<()> {
        match self.peek() {
            Some(b'"') => self.scratch.push_byte(b'"'),
            Some(b'\\') => self.scratch.push_byte(b'\\'),
            Some(b'/') => self.scratch.push_byte(b'/'),
            Some(b'b') => self.scratch.push_byte(0x08),
            Some(b'f') => self.scratch.push_byte(0x0C),
            Some(b'n') => self.scratch.push_byte(b'\n'),
            Some(b'r') => self.scratch.push_byte(b'\r'),
            Some(b't') => self.scratch.push_byte(b'\t'),
            Some(b'u') => {
                self.advance();
                return self.scan_unicode_escape();
            }
            _ => return Err(self.locate(ParseError::BadEscapedChar(String::new()))),
        }
        self.advance();
        Ok(())
    }

    /// Decode a `\uXXXX` escape, recombining surrogate pairs, and push the
    /// code point in UTF-8.
    fn scan_unicode_escape(&mut self) -> Result<()> {
        let high = self.scan_hex4()?;
        let code = if (0xD800..=0xDBFF).contains(&high) {
            // a high surrogate must be followed by an escaped low surrogate
            if self.peek() != Some(b'\\') {
                return Err(self.locate(ParseError::IllegalSurrogate(String::new())));
            }
            self.advance();
            if self.peek() != Some(b'u') {
                return Err(self.locate(ParseError::IllegalSurrogate(String::new())));
            }
            self.advance();
            let low = self.scan_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.locate(ParseError::IllegalSurrogate(String::new())));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else if (0xDC00..=0xDFFF).contains(&high) {
            // a lone low surrogate has nothing to pair with
            return Err(self.locate(ParseError::IllegalSurrogate(String::new())));
        } else {
            high
        };

        // surrogates were rejected above and a combined pair tops out at
        // U+10FFFF, so the code point is always a valid char
        let ch = char::from_u32(code).unwrap();
        let mut utf8 = [0u8; 4];
        self.scratch.push_bytes(ch.encode_utf8(&mut utf8).as_bytes());
        Ok(())
    }

    /// Decode exactly 4 hex digits into a code unit.
    fn scan_hex4(&mut self) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(byte @ b'0'..=b'9') => (byte - b'0') as u32,
                Some(byte @ b'a'..=b'f') => (byte - b'a' + 10) as u32,
                Some(byte @ b'A'..=b'F') => (byte - b'A' + 10) as u32,
                _ => return Err(self.locate(ParseError::BadUnicodeEscape(String::new()))),
            };
            self.advance();
            code = (code << 4) | digit;
        }
        Ok(code)
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    /// Parse a bracketed array of comma-separated values.
    ///
    /// Elements accumulate in an owned vector that is handed to the parent
    /// only on success; dropping it on a failing path releases every
    /// element already parsed.
    fn parse_array(&mut self) -> Result<Value> {
        self.expect_byte(b'[');
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.advance();
            return Ok(Value::Array(Vec::new()));
        }

        let mut elements = Vec::new();
        loop {
            elements.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.advance();
                    self.skip_whitespace();
                    // a bracket straight after the comma is a trailing comma
                    if self.peek() == Some(b']') {
                        return Err(self.locate(ParseError::ExpectedCommaOrBracket(String::new())));
                    }
                }
                Some(b']') => {
                    self.advance();
                    return Ok(Value::Array(elements));
                }
                _ => return Err(self.locate(ParseError::ExpectedCommaOrBracket(String::new()))),
            }
        }
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Step over a byte the dispatcher already matched.
    fn expect_byte(&mut self, byte: u8) {
        debug_assert_eq!(self.peek(), Some(byte));
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Line and column of a byte offset, for error reporting. Columns count
    /// characters: UTF-8 continuation bytes do not start one.
    fn location(&self, offset: usize) -> (usize, usize) {
        let upto = &self.input[..offset];
        let line = upto.iter().filter(|&&b| b == b'\n').count();
        let line_start = upto
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let col = upto[line_start..]
            .iter()
            .filter(|&&b| (b & 0xC0) != 0x80)
            .count();
        (line, col)
    }

    fn locate_at(&self, offset: usize, err: ParseError) -> ParseError {
        let (line, col) = self.location(offset);
        err.with_location(self.ctx, line, col)
    }

    fn locate(&self, err: ParseError) -> ParseError {
        self.locate_at(self.pos, err)
    }
}
