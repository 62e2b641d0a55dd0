//! Canonical TOML serialization.
//!
//! Output is deterministic: within each table, non-table entries are emitted
//! first in ascending key order (table-array entries after plain values),
//! followed by sub-tables in ascending key order. The result re-parses to a
//! structurally equal tree.

#[cfg(test)]
#[path = "./write_tests.rs"]
mod tests;

use crate::value::Value;
use crate::view::View;
use crate::{Array, Table};
use std::fmt;
use std::io;

/// Serializes any node to a stream in canonical form.
///
/// The rendering itself is infallible; only stream IO can fail.
pub fn write<W: io::Write>(mut out: W, value: &Value) -> io::Result<()> {
    out.write_all(to_string(value).as_bytes())
}

/// Serializes any node to a `String` in canonical form.
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    let mut writer = Writer::new(&mut out);
    // Writing into a String cannot fail.
    let _ = writer.write_value(value);
    out
}

/// Streaming serializer with a configurable indent width.
///
/// Indentation is cosmetic: one level per path depth beyond the first, four
/// spaces per level by default.
pub struct Writer<'out, 'v, W: fmt::Write> {
    out: &'out mut W,
    width: usize,
    path: Vec<&'v str>,
    has_naked_endline: bool,
}

impl<'out, 'v, W: fmt::Write> Writer<'out, 'v, W> {
    /// Creates a writer emitting to `out` with four-space indentation.
    pub fn new(out: &'out mut W) -> Self {
        Self::with_indent(out, 4)
    }

    /// Creates a writer with `width` spaces per indent level.
    pub fn with_indent(out: &'out mut W, width: usize) -> Self {
        Self {
            out,
            width,
            path: Vec::new(),
            has_naked_endline: false,
        }
    }

    /// Serializes a node. A table emits a full document body; a bare scalar
    /// or array emits just its value text.
    pub fn write_value(&mut self, value: &'v Value) -> fmt::Result {
        self.visit(value, false)
    }

    /// Serializes a table as a document body.
    pub fn write_table(&mut self, table: &'v Table) -> fmt::Result {
        self.visit_table(table, false)
    }

    fn visit(&mut self, value: &'v Value, in_array: bool) -> fmt::Result {
        match value {
            Value::None => Ok(()),
            Value::Table(t) => self.visit_table(t, in_array),
            Value::Array(a) => self.visit_array(a),
            scalar => self.write_scalar(scalar),
        }
    }

    fn visit_table(&mut self, table: &'v Table, in_array: bool) -> fmt::Result {
        self.write_table_header(in_array)?;

        let mut values: Vec<&'v str> = Vec::new();
        let mut tables: Vec<&'v str> = Vec::new();
        for (key, value) in table.iter() {
            if value.is_table() {
                tables.push(key);
            } else {
                values.push(key);
            }
        }
        // Plain values first in key order, then arrays-of-tables in key
        // order; sub-tables follow separately.
        values.sort_unstable_by_key(|&k| (table.get(k).is_some_and(Value::is_table_array), k));
        tables.sort_unstable();

        for (i, &key) in values.iter().enumerate() {
            let value = table.get(key).expect("key taken from this table");
            self.path.push(key);
            if i > 0 {
                self.endline()?;
                if value.is_table_array() {
                    self.out.write_str("\n")?;
                }
            }
            self.write_table_item_header(value)?;
            self.visit(value, false)?;
            self.path.pop();
        }

        for (i, &key) in tables.iter().enumerate() {
            let value = table.get(key).expect("key taken from this table");
            self.path.push(key);
            if !values.is_empty() || i > 0 {
                self.endline()?;
            }
            self.visit(value, false)?;
            self.path.pop();
        }

        self.endline()?;
        self.out.write_str("\n")
    }

    fn visit_array(&mut self, array: &'v Array) -> fmt::Result {
        if array.is_table_array() {
            for entry in array {
                if let Value::Table(t) = entry {
                    self.visit_table(t, true)?;
                }
            }
            Ok(())
        } else {
            self.write_inline_array(array)
        }
    }

    fn write_inline_array(&mut self, array: &'v Array) -> fmt::Result {
        self.put("[")?;
        for (i, item) in array.iter().enumerate() {
            if i > 0 {
                self.put(", ")?;
            }
            self.write_inline_value(item)?;
        }
        self.put("]")
    }

    /// Value emission inside an array context, where tables must use the
    /// inline `{…}` syntax.
    fn write_inline_value(&mut self, value: &'v Value) -> fmt::Result {
        match value {
            Value::Array(a) => self.write_inline_array(a),
            Value::Table(t) => self.write_inline_table(t),
            other => self.write_scalar(other),
        }
    }

    fn write_inline_table(&mut self, table: &'v Table) -> fmt::Result {
        let mut keys: Vec<&'v str> = table.keys().collect();
        keys.sort_unstable();
        self.put("{")?;
        for (i, &key) in keys.iter().enumerate() {
            if i > 0 {
                self.put(", ")?;
            }
            self.write_key(key)?;
            self.put(" = ")?;
            self.write_inline_value(table.get(key).expect("key taken from this table"))?;
        }
        self.put("}")
    }

    fn write_scalar(&mut self, value: &Value) -> fmt::Result {
        self.has_naked_endline = false;
        match value {
            Value::String(s) => {
                self.out.write_str("\"")?;
                write_escaped(self.out, s)?;
                self.out.write_str("\"")
            }
            Value::Integer(i) => write!(self.out, "{i}"),
            Value::Float(f) => write_float(self.out, *f),
            Value::Boolean(b) => self.out.write_str(if *b { "true" } else { "false" }),
            Value::OffsetDateTime(dt) => write!(self.out, "{dt}"),
            Value::LocalDateTime(dt) => write!(self.out, "{dt}"),
            Value::LocalDate(d) => write!(self.out, "{d}"),
            Value::LocalTime(t) => write!(self.out, "{t}"),
            Value::None | Value::Array(..) | Value::Table(..) => Ok(()),
        }
    }

    /// Emits the `[path]` or `[[path]]` header for the current path.
    /// The root table (empty path) has no header.
    fn write_table_header(&mut self, in_array: bool) -> fmt::Result {
        if self.path.is_empty() {
            return Ok(());
        }
        self.indent()?;
        self.put(if in_array { "[[" } else { "[" })?;
        for i in 0..self.path.len() {
            if i > 0 {
                self.put(".")?;
            }
            let segment = self.path[i];
            self.write_key(segment)?;
        }
        self.put(if in_array { "]]" } else { "]" })?;
        self.endline()
    }

    /// Emits `key = ` for a non-table entry; tables and table-arrays render
    /// their own headers instead.
    fn write_table_item_header(&mut self, value: &Value) -> fmt::Result {
        if !value.is_table() && !value.is_table_array() {
            self.indent()?;
            let key = *self.path.last().expect("item header requires a path");
            self.write_key(key)?;
            self.put(" = ")?;
        }
        Ok(())
    }

    fn write_key(&mut self, key: &str) -> fmt::Result {
        self.has_naked_endline = false;
        if is_bare_key(key) {
            self.out.write_str(key)
        } else {
            self.out.write_str("\"")?;
            write_escaped(self.out, key)?;
            self.out.write_str("\"")
        }
    }

    fn indent(&mut self) -> fmt::Result {
        for _ in 1..self.path.len() {
            for _ in 0..self.width {
                self.put(" ")?;
            }
        }
        Ok(())
    }

    fn put(&mut self, s: &str) -> fmt::Result {
        self.has_naked_endline = false;
        self.out.write_str(s)
    }

    fn endline(&mut self) -> fmt::Result {
        if !self.has_naked_endline {
            self.out.write_str("\n")?;
            self.has_naked_endline = true;
        }
        Ok(())
    }
}

/// A key is bare iff it is non-empty and consists of `[A-Za-z0-9_-]` only.
fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn write_escaped<W: fmt::Write>(out: &mut W, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '\u{8}' => out.write_str("\\b")?,
            '\t' => out.write_str("\\t")?,
            '\n' => out.write_str("\\n")?,
            '\u{c}' => out.write_str("\\f")?,
            '\r' => out.write_str("\\r")?,
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04X}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}

/// Floats always render with a `.` or an exponent so they re-parse as
/// floats. The shortest round-trip form never carries superfluous exponent
/// zeros.
fn write_float<W: fmt::Write>(out: &mut W, f: f64) -> fmt::Result {
    if f.is_nan() {
        out.write_str(if f.is_sign_negative() { "-nan" } else { "nan" })
    } else if f.is_infinite() {
        out.write_str(if f < 0.0 { "-inf" } else { "inf" })
    } else {
        write!(out, "{f:?}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Writer::new(f).write_value(self)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Writer::new(f).write_table(self)
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = Writer::new(f);
        writer.visit_array(self)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Some(node) => Writer::new(f).write_value(node),
            None => Ok(()),
        }
    }
}
