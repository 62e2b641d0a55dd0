//! Single-pass recursive-descent TOML parser.

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;

use crate::Span;
use crate::datetime::{self, DateTimeValue};
use crate::error::{Error, ErrorKind};
use crate::table::{Table, TableOrigin};
use crate::value::{Array, Value};
use std::path::Path;

const MAX_RECURSION_DEPTH: i16 = 256;

const fn build_hex_table() -> [i8; 256] {
    let mut table = [-1i8; 256];
    let mut ch = 0usize;
    while ch < 256 {
        table[ch] = match ch as u8 {
            b'0'..=b'9' => (ch as u8 - b'0') as i8,
            b'A'..=b'F' => (ch as u8 - b'A' + 10) as i8,
            b'a'..=b'f' => (ch as u8 - b'a' + 10) as i8,
            _ => -1,
        };
        ch += 1;
    }
    table
}

static HEX: [i8; 256] = build_hex_table();

/// A key segment with the span it was read from, for error reporting.
struct Key {
    name: String,
    span: Span,
}

struct Parser<'s> {
    text: &'s str,
    /// Raw bytes of the input. Always valid UTF-8 (derived from `&str`).
    bytes: &'s [u8],
    cursor: usize,
}

impl<'s> Parser<'s> {
    fn new(text: &'s str) -> Self {
        let bytes = text.as_bytes();
        // Skip UTF-8 BOM (U+FEFF = EF BB BF) if present at the start.
        let cursor = if bytes.starts_with(b"\xef\xbb\xbf") {
            3
        } else {
            0
        };
        Parser {
            text,
            bytes,
            cursor,
        }
    }

    fn error(&self, start: usize, end: Option<usize>, kind: ErrorKind) -> Error {
        Error {
            kind,
            span: Span::new(start as u32, end.unwrap_or(start + 1) as u32),
            line_info: None,
        }
    }

    fn duplicate_key(&self, key: &Key) -> Error {
        Error {
            kind: ErrorKind::DuplicateKey {
                key: key.name.clone(),
            },
            span: key.span,
            line_info: None,
        }
    }

    #[inline]
    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    #[inline]
    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.cursor + offset).copied()
    }

    #[inline]
    fn eat_byte(&mut self, b: u8) -> bool {
        if self.peek_byte() == Some(b) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect_byte(&mut self, b: u8) -> Result<(), Error> {
        if self.eat_byte(b) {
            Ok(())
        } else {
            let start = self.cursor;
            let (found, end) = self.scan_token_desc_and_end();
            Err(self.error(
                start,
                Some(end),
                ErrorKind::Wanted {
                    expected: byte_describe(b),
                    found,
                },
            ))
        }
    }

    fn eat_whitespace(&mut self) {
        while let Some(b' ' | b'\t') = self.peek_byte() {
            self.cursor += 1;
        }
    }

    /// Skips horizontal whitespace and returns the next byte, if any.
    fn eat_whitespace_to(&mut self) -> Option<u8> {
        while let Some(b) = self.peek_byte() {
            if b == b' ' || b == b'\t' {
                self.cursor += 1;
            } else {
                return Some(b);
            }
        }
        None
    }

    /// Consumes a line terminator: `\n`, `\r\n`, or a lone `\r`.
    fn eat_newline(&mut self) -> bool {
        match self.peek_byte() {
            Some(b'\n') => {
                self.cursor += 1;
                true
            }
            Some(b'\r') => {
                self.cursor += 1;
                self.eat_byte(b'\n');
                true
            }
            _ => false,
        }
    }

    fn eat_newline_or_eof(&mut self) -> Result<(), Error> {
        if self.peek_byte().is_none() || self.eat_newline() {
            Ok(())
        } else {
            let start = self.cursor;
            let (found, end) = self.scan_token_desc_and_end();
            Err(self.error(
                start,
                Some(end),
                ErrorKind::Wanted {
                    expected: "newline",
                    found,
                },
            ))
        }
    }

    fn eat_comment(&mut self) -> Result<bool, Error> {
        if !self.eat_byte(b'#') {
            return Ok(false);
        }
        while let Some(0x09 | 0x20..=0x7E | 0x80..) = self.peek_byte() {
            self.cursor += 1;
        }
        self.eat_newline_or_eof().map(|()| true)
    }

    /// Skips whitespace, newlines, and comments between array tokens.
    fn eat_intermediate(&mut self) -> Result<(), Error> {
        loop {
            match self.peek_byte() {
                Some(b' ' | b'\t' | b'\n') => self.cursor += 1,
                Some(b'\r') => {
                    self.cursor += 1;
                    self.eat_byte(b'\n');
                }
                Some(b'#') => {
                    self.eat_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Scan forward from the current position to determine the description
    /// and end position of the token at the cursor, for error messages.
    fn scan_token_desc_and_end(&self) -> (&'static str, usize) {
        let Some(b) = self.peek_byte() else {
            return ("eof", self.bytes.len());
        };
        match b {
            b'\n' => ("a newline", self.cursor + 1),
            b'\r' => ("a newline", self.cursor + 1),
            b' ' | b'\t' => {
                let mut end = self.cursor + 1;
                while end < self.bytes.len()
                    && (self.bytes[end] == b' ' || self.bytes[end] == b'\t')
                {
                    end += 1;
                }
                ("whitespace", end)
            }
            b'#' => ("a comment", self.cursor + 1),
            b'=' => ("an equals", self.cursor + 1),
            b'.' => ("a period", self.cursor + 1),
            b',' => ("a comma", self.cursor + 1),
            b':' => ("a colon", self.cursor + 1),
            b'+' => ("a plus", self.cursor + 1),
            b'{' => ("a left brace", self.cursor + 1),
            b'}' => ("a right brace", self.cursor + 1),
            b'[' => ("a left bracket", self.cursor + 1),
            b']' => ("a right bracket", self.cursor + 1),
            b'\'' | b'"' => ("a string", self.cursor + 1),
            _ if is_keylike_byte(b) => {
                let mut end = self.cursor + 1;
                while end < self.bytes.len() && is_keylike_byte(self.bytes[end]) {
                    end += 1;
                }
                ("an identifier", end)
            }
            _ => ("a character", self.cursor + 1),
        }
    }

    fn read_keylike(&mut self) -> &'s str {
        let start = self.cursor;
        while let Some(b) = self.peek_byte() {
            if !is_keylike_byte(b) {
                break;
            }
            self.cursor += 1;
        }
        // Keylike bytes are ASCII, so both bounds are char boundaries.
        &self.text[start..self.cursor]
    }

    fn next_char_for_error(&self) -> char {
        self.text
            .get(self.cursor..)
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn read_table_key(&mut self) -> Result<Key, Error> {
        let Some(b) = self.peek_byte() else {
            return Err(self.error(
                self.bytes.len(),
                None,
                ErrorKind::Wanted {
                    expected: "a table key",
                    found: "eof",
                },
            ));
        };
        match b {
            b'"' | b'\'' => {
                let start = self.cursor;
                self.cursor += 1;
                let (name, multiline) = self.read_string(start, b)?;
                let span = Span::new(start as u32, self.cursor as u32);
                if multiline {
                    return Err(self.error(
                        start,
                        Some(self.cursor),
                        ErrorKind::MultilineStringKey,
                    ));
                }
                if name.is_empty() {
                    return Err(self.error(start, Some(self.cursor), ErrorKind::EmptyKey));
                }
                Ok(Key { name, span })
            }
            b if is_keylike_byte(b) => {
                let start = self.cursor;
                let name = self.read_keylike().to_owned();
                Ok(Key {
                    name,
                    span: Span::new(start as u32, self.cursor as u32),
                })
            }
            _ => {
                let start = self.cursor;
                let (found, end) = self.scan_token_desc_and_end();
                Err(self.error(
                    start,
                    Some(end),
                    ErrorKind::Wanted {
                        expected: "a table key",
                        found,
                    },
                ))
            }
        }
    }

    /// Reads a string body. `start` is the byte offset of the opening quote;
    /// the cursor must be positioned right after it. Returns the unescaped
    /// content and whether the string was a multiline (triple-quoted) one.
    fn read_string(&mut self, start: usize, delim: u8) -> Result<(String, bool), Error> {
        let mut multiline = false;
        if self.eat_byte(delim) {
            if self.eat_byte(delim) {
                multiline = true;
            } else {
                return Ok((String::new(), false));
            }
        }
        if multiline {
            // A newline immediately after the opening delimiter is discarded.
            self.eat_newline();
        }

        let mut content = String::new();
        let mut flush_from = self.cursor;
        loop {
            let i = self.cursor;
            let Some(b) = self.peek_byte() else {
                return Err(self.error(start, None, ErrorKind::UnterminatedString));
            };
            self.cursor = i + 1;
            match b {
                b'\n' if !multiline => {
                    return Err(self.error(i, None, ErrorKind::InvalidCharInString('\n')));
                }
                b'\r' if !multiline => {
                    return Err(self.error(i, None, ErrorKind::InvalidCharInString('\r')));
                }
                b'\r' => {
                    // Both \r\n and a lone \r normalize to \n.
                    content.push_str(&self.text[flush_from..i]);
                    self.eat_byte(b'\n');
                    content.push('\n');
                    flush_from = self.cursor;
                }
                b'\n' => {}
                d if d == delim => {
                    if !multiline {
                        content.push_str(&self.text[flush_from..i]);
                        return Ok((content, false));
                    }
                    if self.peek_byte() == Some(delim) && self.peek_byte_at(1) == Some(delim) {
                        // Closing triple delimiter; up to two extra quotes
                        // before it belong to the content.
                        self.cursor += 2;
                        let mut end = i;
                        if self.eat_byte(delim) {
                            end += 1;
                        }
                        if self.eat_byte(delim) {
                            end += 1;
                        }
                        content.push_str(&self.text[flush_from..end]);
                        return Ok((content, true));
                    }
                    // A lone or doubled quote inside a multiline string is
                    // plain content.
                }
                b'\\' if delim == b'"' => {
                    content.push_str(&self.text[flush_from..i]);
                    self.read_basic_escape(&mut content, start, multiline)?;
                    flush_from = self.cursor;
                }
                0x09 | 0x20..=0x7E | 0x80.. => {}
                _ => {
                    return Err(self.error(i, None, ErrorKind::InvalidCharInString(b as char)));
                }
            }
        }
    }

    fn read_basic_escape(
        &mut self,
        content: &mut String,
        string_start: usize,
        multi: bool,
    ) -> Result<(), Error> {
        let i = self.cursor;
        let Some(b) = self.peek_byte() else {
            return Err(self.error(string_start, None, ErrorKind::UnterminatedString));
        };
        self.cursor = i + 1;
        match b {
            b'"' => content.push('"'),
            b'\\' => content.push('\\'),
            b'b' => content.push('\u{8}'),
            b'f' => content.push('\u{c}'),
            b'n' => content.push('\n'),
            b'r' => content.push('\r'),
            b't' => content.push('\t'),
            b'u' => {
                let ch = self.read_hex(4, string_start, i)?;
                content.push(ch);
            }
            b'U' => {
                let ch = self.read_hex(8, string_start, i)?;
                content.push(ch);
            }
            b' ' | b'\t' | b'\n' | b'\r' if multi => {
                // Line-ending backslash: the newline and any following run
                // of whitespace (possibly across blank lines) is swallowed.
                let c = if b == b'\r' {
                    self.eat_byte(b'\n');
                    '\n'
                } else {
                    b as char
                };
                if c != '\n' {
                    // Whitespace after the backslash is only allowed if a
                    // newline follows before any other character.
                    loop {
                        match self.peek_byte() {
                            Some(b' ' | b'\t') => self.cursor += 1,
                            Some(b'\n') => {
                                self.cursor += 1;
                                break;
                            }
                            Some(b'\r') => {
                                self.cursor += 1;
                                self.eat_byte(b'\n');
                                break;
                            }
                            _ => {
                                return Err(self.error(i, None, ErrorKind::InvalidEscape(c)));
                            }
                        }
                    }
                }
                loop {
                    match self.peek_byte() {
                        Some(b' ' | b'\t' | b'\n') => self.cursor += 1,
                        Some(b'\r') => {
                            self.cursor += 1;
                            self.eat_byte(b'\n');
                        }
                        _ => break,
                    }
                }
            }
            _ => {
                self.cursor -= 1;
                return Err(self.error(
                    self.cursor,
                    None,
                    ErrorKind::InvalidEscape(self.next_char_for_error()),
                ));
            }
        }
        Ok(())
    }

    fn read_hex(
        &mut self,
        n: usize,
        string_start: usize,
        escape_start: usize,
    ) -> Result<char, Error> {
        let mut val: u32 = 0;
        for _ in 0..n {
            let Some(&byte) = self.bytes.get(self.cursor) else {
                return Err(self.error(string_start, None, ErrorKind::UnterminatedString));
            };
            let digit = HEX[byte as usize];
            if digit >= 0 {
                val = (val << 4) | digit as u32;
                self.cursor += 1;
            } else {
                return Err(self.error(
                    self.cursor,
                    None,
                    ErrorKind::InvalidHexEscape(self.next_char_for_error()),
                ));
            }
        }
        // Surrogates and values above U+10FFFF are not scalar values.
        match char::from_u32(val) {
            Some(ch) => Ok(ch),
            None => Err(self.error(
                escape_start,
                Some(escape_start + n),
                ErrorKind::InvalidEscapeValue(val),
            )),
        }
    }

    fn value(&mut self, depth_remaining: i16) -> Result<Value, Error> {
        let at = self.cursor;
        let Some(byte) = self.peek_byte() else {
            return Err(self.error(self.bytes.len(), None, ErrorKind::UnexpectedEof));
        };
        let sign: u8 = match byte {
            b'"' | b'\'' => {
                self.cursor += 1;
                let (s, _) = self.read_string(at, byte)?;
                return Ok(Value::String(s));
            }
            b'{' => {
                self.cursor += 1;
                let mut table = Table::new_inline();
                self.inline_table_contents(&mut table, depth_remaining - 1)?;
                return Ok(Value::Table(table));
            }
            b'[' => {
                self.cursor += 1;
                let mut array = Array::new();
                self.array_contents(&mut array, depth_remaining - 1)?;
                return Ok(Value::Array(array));
            }
            b't' => {
                return if self.bytes[self.cursor..].starts_with(b"true") {
                    self.cursor += 4;
                    Ok(Value::Boolean(true))
                } else {
                    Err(self.error(
                        at,
                        None,
                        ErrorKind::Wanted {
                            expected: "the literal `true`",
                            found: "something else",
                        },
                    ))
                };
            }
            b'f' => {
                return if self.bytes[self.cursor..].starts_with(b"false") {
                    self.cursor += 5;
                    Ok(Value::Boolean(false))
                } else {
                    Err(self.error(
                        at,
                        None,
                        ErrorKind::Wanted {
                            expected: "the literal `false`",
                            found: "something else",
                        },
                    ))
                };
            }
            b'-' => {
                self.cursor += 1;
                0
            }
            b'+' => {
                self.cursor += 1;
                1
            }
            _ => 2,
        };

        let token = self.read_keylike();
        match token {
            "inf" => {
                return Ok(Value::Float(if sign != 0 {
                    f64::INFINITY
                } else {
                    f64::NEG_INFINITY
                }));
            }
            "nan" => {
                return Ok(Value::Float(if sign != 0 { f64::NAN } else { -f64::NAN }));
            }
            _ => {}
        }

        if matches!(token.as_bytes(), [b'0'..=b'9', ..]) {
            self.number(at, token, sign)
        } else {
            Err(self.error(at, Some(self.cursor.max(at + 1)), ErrorKind::InvalidNumber))
        }
    }

    fn number(&mut self, start: usize, token: &'s str, sign: u8) -> Result<Value, Error> {
        // Base-prefixed integers (0x, 0o, 0b). TOML forbids signs on these,
        // so only match unsigned tokens.
        if sign == 2
            && let [b'0', format, rest @ ..] = token.as_bytes()
        {
            let span = Span::new(start as u32, self.cursor as u32);
            match format {
                b'x' => return self.integer_radix(rest, 16, span),
                b'o' => return self.integer_radix(rest, 8, span),
                b'b' => return self.integer_radix(rest, 2, span),
                _ => {}
            }
        }

        if self.eat_byte(b'.') {
            let at = self.cursor;
            return match self.peek_byte() {
                Some(b) if is_keylike_byte(b) => {
                    let after = self.read_keylike();
                    self.float(start, token, Some(after), sign).map(Value::Float)
                }
                _ => Err(self.error(at, None, ErrorKind::InvalidNumber)),
            };
        }

        if sign == 2
            && let Some((consumed, value)) = datetime::munch(&self.bytes[start..])
        {
            self.cursor = start + consumed;
            return Ok(match value {
                DateTimeValue::Offset(dt) => Value::OffsetDateTime(dt),
                DateTimeValue::Local(dt) => Value::LocalDateTime(dt),
                DateTimeValue::Date(d) => Value::LocalDate(d),
                DateTimeValue::Time(t) => Value::LocalTime(t),
            });
        }

        let span = Span::new(start as u32, self.cursor as u32);
        match self.integer_decimal(token.as_bytes(), span, sign) {
            Ok(v) => Ok(v),
            Err(e) => {
                if token.bytes().any(|b| b == b'e' || b == b'E') {
                    self.float(start, token, None, sign).map(Value::Float)
                } else {
                    Err(e)
                }
            }
        }
    }

    fn integer_decimal(&self, bytes: &[u8], span: Span, sign: u8) -> Result<Value, Error> {
        let mut acc: u64 = 0;
        let mut prev_underscore = false;
        let mut has_digit = false;
        let mut leading_zero = false;
        let negative = sign == 0;
        'error: {
            for &b in bytes {
                if b == b'_' {
                    if !has_digit || prev_underscore {
                        break 'error;
                    }
                    prev_underscore = true;
                    continue;
                }
                if !b.is_ascii_digit() {
                    break 'error;
                }
                if leading_zero {
                    break 'error;
                }
                if !has_digit && b == b'0' {
                    leading_zero = true;
                }
                has_digit = true;
                prev_underscore = false;
                let digit = (b - b'0') as u64;
                acc = match acc.checked_mul(10).and_then(|a| a.checked_add(digit)) {
                    Some(v) => v,
                    None => break 'error,
                };
            }

            if !has_digit || prev_underscore {
                break 'error;
            }

            let max = if negative {
                (i64::MAX as u64) + 1
            } else {
                i64::MAX as u64
            };
            if acc > max {
                break 'error;
            }

            let val = if negative {
                (acc as i64).wrapping_neg()
            } else {
                acc as i64
            };
            return Ok(Value::Integer(val));
        }
        Err((ErrorKind::InvalidNumber, span).into())
    }

    /// Parses a hex, octal, or binary integer body (the part after the base
    /// prefix). Underscores are allowed only between digits.
    fn integer_radix(&self, bytes: &[u8], radix: u32, span: Span) -> Result<Value, Error> {
        let mut acc: u64 = 0;
        let mut prev_underscore = false;
        let mut has_digit = false;
        'error: {
            if bytes.is_empty() {
                break 'error;
            }
            for &b in bytes {
                if b == b'_' {
                    if !has_digit || prev_underscore {
                        break 'error;
                    }
                    prev_underscore = true;
                    continue;
                }
                let digit = match (b as char).to_digit(radix) {
                    Some(d) => d as u64,
                    None => break 'error,
                };
                has_digit = true;
                prev_underscore = false;
                acc = match acc.checked_mul(radix as u64).and_then(|a| a.checked_add(digit)) {
                    Some(v) => v,
                    None => break 'error,
                };
            }

            if !has_digit || prev_underscore {
                break 'error;
            }
            if acc > i64::MAX as u64 {
                break 'error;
            }
            return Ok(Value::Integer(acc as i64));
        }
        Err((ErrorKind::InvalidNumber, span).into())
    }

    fn float(
        &mut self,
        start: usize,
        token: &'s str,
        after_decimal: Option<&'s str>,
        sign: u8,
    ) -> Result<f64, Error> {
        // TOML forbids leading zeros in the integer part (e.g. 00.5, -01.0).
        if let [b'0', b'0'..=b'9' | b'_', ..] = token.as_bytes() {
            return Err(self.invalid_number(start));
        }

        let mut buf = String::with_capacity(token.len() + 8);
        if sign == 0 {
            buf.push('-');
        }
        if !push_strip_underscores(&mut buf, token) {
            return Err(self.invalid_number(start));
        }

        let mut last = token;
        if let Some(after) = after_decimal {
            if !matches!(after.as_bytes().first(), Some(b'0'..=b'9')) {
                return Err(self.invalid_number(start));
            }
            buf.push('.');
            if !push_strip_underscores(&mut buf, after) {
                return Err(self.invalid_number(start));
            }
            last = after;
        }

        // When the keylike token ends with e/E, a following '+' and the
        // exponent digits arrive as separate tokens ('-' is keylike, so
        // "1e-5" stays in one token and needs no special handling).
        if matches!(last.as_bytes().last(), Some(b'e' | b'E')) {
            self.eat_byte(b'+');
            match self.peek_byte() {
                Some(b) if is_keylike_byte(b) && b != b'-' => {
                    let next = self.read_keylike();
                    if !push_strip_underscores(&mut buf, next) {
                        return Err(self.invalid_number(start));
                    }
                }
                _ => return Err(self.invalid_number(start)),
            }
        }

        // Exponent digits must not carry leading zeros.
        if let Some(pos) = buf.bytes().position(|b| b == b'e' || b == b'E') {
            let mut exp = &buf[pos + 1..];
            if let Some(stripped) = exp.strip_prefix(['+', '-']) {
                exp = stripped;
            }
            if exp.is_empty() || (exp.len() > 1 && exp.starts_with('0')) {
                return Err(self.invalid_number(start));
            }
        }

        let n: f64 = match buf.parse() {
            Ok(n) => n,
            Err(_) => return Err(self.invalid_number(start)),
        };
        if n.is_finite() {
            Ok(n)
        } else {
            Err(self.invalid_number(start))
        }
    }

    fn invalid_number(&self, start: usize) -> Error {
        self.error(
            start,
            Some(self.cursor.max(start + 1)),
            ErrorKind::InvalidNumber,
        )
    }

    fn array_contents(&mut self, out: &mut Array, depth_remaining: i16) -> Result<(), Error> {
        if depth_remaining < 0 {
            return Err(self.error(self.cursor, None, ErrorKind::RecursionLimit));
        }
        loop {
            self.eat_intermediate()?;
            if self.eat_byte(b']') {
                return Ok(());
            }
            let value = self.value(depth_remaining)?;
            out.push(value);
            self.eat_intermediate()?;
            if !self.eat_byte(b',') {
                break;
            }
        }
        self.eat_intermediate()?;
        self.expect_byte(b']')
    }

    /// Parses `key = value` pairs up to the closing `}`. Inline tables stay
    /// on one line and take no trailing comma.
    fn inline_table_contents(&mut self, out: &mut Table, depth_remaining: i16) -> Result<(), Error> {
        if depth_remaining < 0 {
            return Err(self.error(self.cursor, None, ErrorKind::RecursionLimit));
        }
        self.eat_whitespace();
        if self.eat_byte(b'}') {
            return Ok(());
        }
        loop {
            let mut table_ref: &mut Table = &mut *out;
            let mut key = self.read_table_key()?;
            self.eat_whitespace();
            while self.eat_byte(b'.') {
                self.eat_whitespace();
                table_ref = self.navigate_dotted_key(table_ref, key)?;
                key = self.read_table_key()?;
                self.eat_whitespace();
            }
            self.expect_byte(b'=')?;
            self.eat_whitespace();
            let value = self.value(depth_remaining)?;
            self.insert_value(table_ref, key, value)?;
            self.eat_whitespace();
            if self.eat_byte(b'}') {
                return Ok(());
            }
            self.expect_byte(b',')?;
            self.eat_whitespace();
        }
    }

    /// Navigate into an existing or new table for a dotted-key intermediate
    /// segment. Inline and header-claimed tables cannot be extended this
    /// way; new tables are marked as dotted-created.
    fn navigate_dotted_key<'t>(
        &mut self,
        table: &'t mut Table,
        key: Key,
    ) -> Result<&'t mut Table, Error> {
        if let Some(idx) = table.find_index(&key.name) {
            match &mut table.entries_mut()[idx].1 {
                Value::Table(sub)
                    if !sub.is_inline() && sub.origin != TableOrigin::Header =>
                {
                    Ok(sub)
                }
                _ => Err(self.error(
                    key.span.start as usize,
                    Some(key.span.end as usize),
                    ErrorKind::DottedKeyInvalidType,
                )),
            }
        } else {
            let mut sub = Table::new();
            sub.origin = TableOrigin::Dotted;
            Ok(insert_table(table, key.name, sub))
        }
    }

    /// Navigate an intermediate segment of a table header (e.g. `a` in
    /// `[a.b.c]`). Creates implicit tables if not found; arrays of tables
    /// resolve to their last element.
    fn navigate_header_intermediate<'t>(
        &mut self,
        table: &'t mut Table,
        key: Key,
    ) -> Result<&'t mut Table, Error> {
        if let Some(idx) = table.find_index(&key.name) {
            match &mut table.entries_mut()[idx].1 {
                Value::Table(sub) if !sub.is_inline() => Ok(sub),
                Value::Array(arr) => match arr.last_mut() {
                    Some(Value::Table(last)) if !last.is_inline() => Ok(last),
                    _ => Err(self.duplicate_key(&key)),
                },
                _ => Err(self.duplicate_key(&key)),
            }
        } else {
            Ok(insert_table(table, key.name, Table::new()))
        }
    }

    /// Handle the final segment of a standard table header `[a.b.c]`.
    ///
    /// A header may claim an implicitly created table exactly once;
    /// re-opening a header-claimed table, a dotted-created table, an inline
    /// table, or a non-table value is an error.
    fn navigate_header_table_final(
        &mut self,
        table: &mut Table,
        key: Key,
        header_start: usize,
    ) -> Result<(), Error> {
        if let Some(idx) = table.find_index(&key.name) {
            match &mut table.entries_mut()[idx].1 {
                Value::Table(sub) if !sub.is_inline() => match sub.origin {
                    TableOrigin::Header => Err(self.error(
                        header_start,
                        Some(self.cursor),
                        ErrorKind::DuplicateTable {
                            name: key.name.clone(),
                        },
                    )),
                    TableOrigin::Dotted => Err(self.duplicate_key(&key)),
                    TableOrigin::Implicit => {
                        sub.origin = TableOrigin::Header;
                        Ok(())
                    }
                },
                _ => Err(self.duplicate_key(&key)),
            }
        } else {
            let mut sub = Table::new();
            sub.origin = TableOrigin::Header;
            table.emplace(key.name, Value::Table(sub));
            Ok(())
        }
    }

    /// Handle the final segment of an array-of-tables header `[[a.b.c]]`.
    ///
    /// Appends to an existing appendable array or creates a fresh one.
    fn navigate_header_array_final(
        &mut self,
        table: &mut Table,
        key: Key,
        header_start: usize,
    ) -> Result<(), Error> {
        if let Some(idx) = table.find_index(&key.name) {
            match &mut table.entries_mut()[idx].1 {
                Value::Array(arr) if array_appendable(arr) => {
                    let mut entry = Table::new();
                    entry.origin = TableOrigin::Header;
                    arr.push(Value::Table(entry));
                    Ok(())
                }
                Value::Table(_) => Err(self.error(
                    header_start,
                    Some(self.cursor),
                    ErrorKind::RedefineAsArray,
                )),
                _ => Err(self.duplicate_key(&key)),
            }
        } else {
            let mut entry = Table::new();
            entry.origin = TableOrigin::Header;
            let mut arr = Array::new();
            arr.push(Value::Table(entry));
            table.emplace(key.name, Value::Array(arr));
            Ok(())
        }
    }

    /// Insert a value into a table, checking for duplicates.
    fn insert_value(&mut self, table: &mut Table, key: Key, value: Value) -> Result<(), Error> {
        if table.contains_key(&key.name) {
            return Err(self.duplicate_key(&key));
        }
        table.emplace(key.name, value);
        Ok(())
    }

    /// Parses a `[header]` or `[[header]]` line and returns the key path of
    /// the new target table.
    fn process_table_header(&mut self, root: &mut Table) -> Result<Vec<String>, Error> {
        let header_start = self.cursor;
        self.expect_byte(b'[')?;
        let is_array = self.eat_byte(b'[');

        let mut path: Vec<String> = Vec::new();
        let mut current: &mut Table = root;

        self.eat_whitespace();
        let mut key = self.read_table_key()?;
        while self.eat_whitespace_to() == Some(b'.') {
            self.cursor += 1;
            self.eat_whitespace();
            path.push(key.name.clone());
            current = self.navigate_header_intermediate(current, key)?;
            key = self.read_table_key()?;
        }
        self.expect_byte(b']')?;
        if is_array {
            self.expect_byte(b']')?;
        }

        self.eat_whitespace();
        if !self.eat_comment()? {
            self.eat_newline_or_eof()?;
        }

        path.push(key.name.clone());
        if is_array {
            self.navigate_header_array_final(current, key, header_start)?;
        } else {
            self.navigate_header_table_final(current, key, header_start)?;
        }
        Ok(path)
    }

    /// Parses one `key = value` line into the current target table.
    fn process_key_value(&mut self, root: &mut Table, path: &[String]) -> Result<(), Error> {
        let mut table_ref = resolve_target(root, path);

        let mut key = self.read_table_key()?;
        self.eat_whitespace();
        while self.eat_byte(b'.') {
            self.eat_whitespace();
            table_ref = self.navigate_dotted_key(table_ref, key)?;
            key = self.read_table_key()?;
            self.eat_whitespace();
        }

        self.expect_byte(b'=')?;
        self.eat_whitespace();
        let value = self.value(MAX_RECURSION_DEPTH)?;

        self.eat_whitespace();
        if !self.eat_comment()? {
            self.eat_newline_or_eof()?;
        }

        self.insert_value(table_ref, key, value)
    }

    fn parse_document(&mut self, root: &mut Table) -> Result<(), Error> {
        let mut header_path: Vec<String> = Vec::new();
        loop {
            self.eat_whitespace();
            if self.eat_comment()? {
                continue;
            }
            if self.eat_newline() {
                continue;
            }
            match self.peek_byte() {
                None => break,
                Some(b'[') => {
                    header_path = self.process_table_header(root)?;
                }
                Some(_) => {
                    self.process_key_value(root, &header_path)?;
                }
            }
        }
        Ok(())
    }
}

/// Walks `path` down from the root, resolving array-of-tables segments to
/// their last element. Header processing has already validated the path.
fn resolve_target<'t>(root: &'t mut Table, path: &[String]) -> &'t mut Table {
    let mut current = root;
    for segment in path {
        let value = current
            .get_mut(segment)
            .expect("header path stays valid for the rest of the parse");
        current = match value {
            Value::Table(t) => t,
            Value::Array(a) => match a.last_mut() {
                Some(Value::Table(t)) => t,
                _ => unreachable!("array-of-tables entries are tables"),
            },
            _ => unreachable!("header path segments resolve to tables"),
        };
    }
    current
}

fn insert_table(table: &mut Table, key: String, sub: Table) -> &mut Table {
    let (slot, _) = table.emplace(key, Value::Table(sub));
    match slot {
        Value::Table(t) => t,
        _ => unreachable!("the entry was just inserted as a table"),
    }
}

fn array_appendable(arr: &Array) -> bool {
    arr.is_table_array()
        && arr
            .iter()
            .all(|v| matches!(v, Value::Table(t) if !t.is_inline()))
}

fn push_strip_underscores(buf: &mut String, token: &str) -> bool {
    let bytes = token.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'_' {
            let prev_digit = i > 0 && bytes[i - 1].is_ascii_digit();
            let next_digit = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
            if !prev_digit || !next_digit {
                return false;
            }
        } else {
            buf.push(b as char);
        }
    }
    true
}

#[inline]
fn is_keylike_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn byte_describe(b: u8) -> &'static str {
    match b {
        b'\n' => "a newline",
        b' ' | b'\t' => "whitespace",
        b'=' => "an equals",
        b'.' => "a period",
        b',' => "a comma",
        b':' => "a colon",
        b'+' => "a plus",
        b'{' => "a left brace",
        b'}' => "a right brace",
        b'[' => "a left bracket",
        b']' => "a right bracket",
        b'\'' | b'"' => "a string",
        _ if is_keylike_byte(b) => "an identifier",
        _ => "a character",
    }
}

/// Computes the 1-based `(line, column)` of a byte offset. `\n`, `\r\n`,
/// and a lone `\r` each terminate a line; the column is a byte offset
/// within the line.
fn position_of(text: &str, offset: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());
    let mut line = 1;
    let mut line_start = 0;
    let mut i = 0;
    while i < offset {
        match bytes[i] {
            b'\n' => {
                i += 1;
                line += 1;
                line_start = i;
            }
            b'\r' => {
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                line += 1;
                line_start = i;
            }
            _ => i += 1,
        }
    }
    (line, offset.saturating_sub(line_start) + 1)
}

/// Parses a TOML document into its root [`Table`].
///
/// On failure the partially built tree is discarded and the returned
/// [`Error`] carries the byte span and 1-based `(line, column)` of the
/// offending input.
pub fn parse(text: &str) -> Result<Table, Error> {
    // Spans are u32 byte offsets.
    if text.len() > u32::MAX as usize {
        return Err(Error {
            kind: ErrorKind::FileTooLarge,
            span: Span::new(0, 0),
            line_info: None,
        });
    }

    let mut root = Table::new();
    let mut parser = Parser::new(text);
    match parser.parse_document(&mut root) {
        Ok(()) => Ok(root),
        Err(mut err) => {
            err.line_info = Some(position_of(text, err.span.start as usize));
            Err(err)
        }
    }
}

/// Parses the TOML document at `path`.
///
/// Failures to open or read the file surface through the parse result as
/// [`ErrorKind::Io`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<Table, Error> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse(&text),
        Err(err) => Err(Error {
            kind: ErrorKind::Io(err.to_string()),
            span: Span::new(0, 0),
            line_info: None,
        }),
    }
}
