//! Parse and extraction errors, with byte spans and line/column positions.

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;

use crate::Span;
use std::fmt::{self, Debug, Display};

/// Error that can occur when parsing TOML or extracting typed values.
#[derive(Debug, Clone)]
pub struct Error {
    /// The error kind
    pub kind: ErrorKind,
    /// The byte span where the error occurs.
    pub span: Span,
    /// 1-based line and column information, only available for errors coming
    /// from the parser entry points.
    pub line_info: Option<(usize, usize)>,
}

impl Error {
    /// The 1-based `(line, column)` of the error, if known.
    #[inline]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.line_info
    }
}

impl std::error::Error for Error {}

impl From<(ErrorKind, Span)> for Error {
    fn from((kind, span): (ErrorKind, Span)) -> Self {
        Self {
            kind,
            span,
            line_info: None,
        }
    }
}

/// Everything that can go wrong while parsing a document or reading a value
/// out of the tree.
#[derive(Clone)]
pub enum ErrorKind {
    /// EOF was reached when looking for a value.
    UnexpectedEof,

    /// The input is larger than the maximum supported size of 4GiB.
    FileTooLarge,

    /// An invalid character not allowed in a string was found.
    InvalidCharInString(char),

    /// An invalid character was found as an escape.
    InvalidEscape(char),

    /// An invalid character was found in a hex escape.
    InvalidHexEscape(char),

    /// An invalid escape value was specified in a hex escape in a string.
    ///
    /// Valid values are in the plane of unicode codepoints, excluding
    /// surrogates.
    InvalidEscapeValue(u32),

    /// An unexpected character was encountered, typically when looking for a
    /// value.
    Unexpected(char),

    /// An unterminated string was found where EOF was reached before the
    /// closing delimiter.
    UnterminatedString,

    /// A number failed to parse.
    InvalidNumber,

    /// The stored number cannot be losslessly converted to the requested
    /// number type.
    OutOfRange(&'static str),

    /// Wanted one sort of token, but found another.
    Wanted {
        /// Expected token type.
        expected: &'static str,
        /// Actually found token type.
        found: &'static str,
    },

    /// A key segment resolved to the empty string.
    EmptyKey,

    /// Duplicate key in table.
    DuplicateKey {
        /// The duplicate key
        key: String,
    },

    /// A table header was repeated for an already-defined table.
    DuplicateTable {
        /// The name of the duplicate table
        name: String,
    },

    /// A previously defined table was redefined as an array of tables.
    RedefineAsArray,

    /// Multiline strings are not allowed for keys.
    MultilineStringKey,

    /// Dotted key attempted to extend something that is not an extendable
    /// table.
    DottedKeyInvalidType,

    /// Arrays and inline tables were nested past the supported depth.
    RecursionLimit,

    /// The file adapter failed to open or read the input.
    Io(String),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnexpectedEof => "unexpected-eof",
            Self::FileTooLarge => "file-too-large",
            Self::InvalidCharInString(..) => "invalid-char-in-string",
            Self::InvalidEscape(..) => "invalid-escape",
            Self::InvalidEscapeValue(..) => "invalid-escape-value",
            Self::InvalidHexEscape(..) => "invalid-hex-escape",
            Self::Unexpected(..) => "unexpected",
            Self::UnterminatedString => "unterminated-string",
            Self::InvalidNumber => "invalid-number",
            Self::OutOfRange(_) => "out-of-range",
            Self::Wanted { .. } => "wanted",
            Self::EmptyKey => "empty-key",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::DuplicateTable { .. } => "duplicate-table",
            Self::RedefineAsArray => "redefine-as-array",
            Self::MultilineStringKey => "multiline-string-key",
            Self::DottedKeyInvalidType => "dotted-key-invalid-type",
            Self::RecursionLimit => "recursion-limit",
            Self::Io(..) => "io",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

struct Escape(char);

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        if self.0.is_whitespace() || self.0.is_control() {
            for esc in self.0.escape_default() {
                f.write_char(esc)?;
            }
            Ok(())
        } else {
            f.write_char(self.0)
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnexpectedEof => f.write_str("unexpected eof encountered"),
            ErrorKind::FileTooLarge => f.write_str("input is too large (maximum 4GiB)"),
            ErrorKind::InvalidCharInString(c) => {
                write!(f, "invalid character in string: `{}`", Escape(*c))
            }
            ErrorKind::InvalidEscape(c) => {
                write!(f, "invalid escape character in string: `{}`", Escape(*c))
            }
            ErrorKind::InvalidHexEscape(c) => {
                write!(f, "invalid hex escape character in string: `{}`", Escape(*c))
            }
            ErrorKind::InvalidEscapeValue(v) => write!(f, "invalid escape value: `{v}`"),
            ErrorKind::Unexpected(c) => {
                write!(f, "unexpected character found: `{}`", Escape(*c))
            }
            ErrorKind::UnterminatedString => f.write_str("unterminated string"),
            ErrorKind::InvalidNumber => f.write_str("invalid number"),
            ErrorKind::OutOfRange(kind) => write!(f, "out of range of '{kind}'"),
            ErrorKind::Wanted { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ErrorKind::EmptyKey => f.write_str("key segment may not be empty"),
            ErrorKind::DuplicateKey { key } => write!(f, "duplicate key: `{key}`"),
            ErrorKind::DuplicateTable { name } => {
                write!(f, "redefinition of table `{name}`")
            }
            ErrorKind::RedefineAsArray => f.write_str("table redefined as array"),
            ErrorKind::MultilineStringKey => {
                f.write_str("multiline strings are not allowed for key")
            }
            ErrorKind::DottedKeyInvalidType => {
                f.write_str("dotted key attempted to extend non-table type")
            }
            ErrorKind::RecursionLimit => f.write_str("maximum nesting depth exceeded"),
            ErrorKind::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

#[cfg(feature = "reporting")]
#[cfg_attr(docsrs, doc(cfg(feature = "reporting")))]
impl Error {
    /// Converts this [`Error`] into a [`codespan_reporting::diagnostic::Diagnostic`]
    pub fn to_diagnostic<FileId: Copy + PartialEq>(
        &self,
        fid: FileId,
    ) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic::{Diagnostic, Label};

        let diag = Diagnostic::error().with_code(self.kind.to_string());
        let span: std::ops::Range<usize> = self.span.into();

        match &self.kind {
            ErrorKind::Unexpected(c) => diag.with_labels(vec![
                Label::primary(fid, span)
                    .with_message(format!("unexpected character '{}'", Escape(*c))),
            ]),
            ErrorKind::InvalidCharInString(c) => diag.with_labels(vec![
                Label::primary(fid, span)
                    .with_message(format!("invalid character '{}' in string", Escape(*c))),
            ]),
            ErrorKind::InvalidEscape(c) => {
                diag.with_labels(vec![Label::primary(fid, span).with_message(format!(
                    "invalid escape character '{}' in string",
                    Escape(*c)
                ))])
            }
            ErrorKind::InvalidEscapeValue(_) => diag.with_labels(vec![
                Label::primary(fid, span).with_message("invalid escape value"),
            ]),
            ErrorKind::InvalidHexEscape(c) => diag.with_labels(vec![
                Label::primary(fid, span)
                    .with_message(format!("invalid hex escape '{}'", Escape(*c))),
            ]),
            ErrorKind::InvalidNumber => diag.with_labels(vec![
                Label::primary(fid, span).with_message("unable to parse number"),
            ]),
            ErrorKind::OutOfRange(kind) => diag
                .with_message(format!("number is out of range of '{kind}'"))
                .with_labels(vec![Label::primary(fid, span)]),
            ErrorKind::Wanted { expected, .. } => diag.with_labels(vec![
                Label::primary(fid, span).with_message(format!("expected {expected}")),
            ]),
            ErrorKind::MultilineStringKey => diag.with_labels(vec![
                Label::primary(fid, span).with_message("multiline keys are not allowed"),
            ]),
            ErrorKind::UnterminatedString => diag.with_labels(vec![
                Label::primary(fid, span).with_message("eof reached before string terminator"),
            ]),
            ErrorKind::EmptyKey => diag.with_labels(vec![
                Label::primary(fid, span).with_message("empty key segment"),
            ]),
            ErrorKind::DuplicateKey { key } => diag.with_labels(vec![
                Label::primary(fid, span).with_message(format!("duplicate key `{key}`")),
            ]),
            ErrorKind::DuplicateTable { name } => diag.with_labels(vec![
                Label::primary(fid, span).with_message(format!("duplicate table `{name}`")),
            ]),
            _ => diag
                .with_message(self.to_string())
                .with_labels(vec![Label::primary(fid, span)]),
        }
    }
}
