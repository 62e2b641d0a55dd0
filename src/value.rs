//! Contains the [`Value`] tagged union over the twelve TOML node kinds.

#[cfg(test)]
#[path = "./value_tests.rs"]
mod tests;

use crate::datetime::{LocalDate, LocalDateTime, LocalTime, OffsetDateTime};
use crate::{Error, ErrorKind, Span};
use std::fmt;

/// A toml array
pub use crate::array::Array;
/// A toml table: flat list of key-value pairs in insertion order
pub use crate::table::Table;

/// A single node of the document tree.
///
/// Every node has exactly one kind, fixed at construction. Containers own
/// their children, so `clone()` is a deep copy sharing no storage.
///
/// The `None` variant is the dedicated absent discriminant backing the null
/// [`View`](crate::View); the parser never produces it.
#[derive(Clone, PartialEq, Default)]
pub enum Value {
    /// The absent value. Only reported by null views.
    #[default]
    None,
    /// A string
    String(String),
    /// An integer
    Integer(i64),
    /// A float
    Float(f64),
    /// A boolean
    Boolean(bool),
    /// A date-time with a UTC offset
    OffsetDateTime(OffsetDateTime),
    /// A date-time without an offset
    LocalDateTime(LocalDateTime),
    /// A date without a time
    LocalDate(LocalDate),
    /// A time without a date
    LocalTime(LocalTime),
    /// An array
    Array(Array),
    /// A table
    Table(Table),
}

/// The kind of a [`Value`], including the derived `TableArray`.
///
/// `TableArray` is not a distinct storage variant: it is the kind reported
/// for an array value whose elements are all tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The absent kind, reported by null views.
    None,
    /// A string
    String,
    /// An integer
    Integer,
    /// A float
    Float,
    /// A boolean
    Boolean,
    /// A date-time with a UTC offset
    OffsetDateTime,
    /// A date-time without an offset
    LocalDateTime,
    /// A date without a time
    LocalDate,
    /// A time without a date
    LocalTime,
    /// An array with at least one non-table element, or no elements
    Array,
    /// A table
    Table,
    /// An array whose every element is a table
    TableArray,
}

impl Kind {
    /// The kind name as used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::None => "none",
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::OffsetDateTime => "offset date-time",
            Kind::LocalDateTime => "local date-time",
            Kind::LocalDate => "local date",
            Kind::LocalTime => "local time",
            Kind::Array => "array",
            Kind::Table => "table",
            Kind::TableArray => "array of tables",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Returns the kind of this value.
    ///
    /// An array whose elements are all tables reports [`Kind::TableArray`].
    pub fn kind(&self) -> Kind {
        match self {
            Value::None => Kind::None,
            Value::String(..) => Kind::String,
            Value::Integer(..) => Kind::Integer,
            Value::Float(..) => Kind::Float,
            Value::Boolean(..) => Kind::Boolean,
            Value::OffsetDateTime(..) => Kind::OffsetDateTime,
            Value::LocalDateTime(..) => Kind::LocalDateTime,
            Value::LocalDate(..) => Kind::LocalDate,
            Value::LocalTime(..) => Kind::LocalTime,
            Value::Array(a) => {
                if a.is_table_array() {
                    Kind::TableArray
                } else {
                    Kind::Array
                }
            }
            Value::Table(..) => Kind::Table,
        }
    }

    /// Gets the type of the value as a string, for error messages.
    pub fn type_str(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns `true` for scalar kinds (strings, numbers, booleans, and the
    /// four date-time kinds).
    #[inline]
    pub fn is_value(&self) -> bool {
        !matches!(
            self,
            Value::None | Value::Array(..) | Value::Table(..)
        )
    }

    /// Returns `true` if this is a table.
    #[inline]
    pub fn is_table(&self) -> bool {
        matches!(self, Value::Table(..))
    }

    /// Returns `true` if this is an array (including arrays of tables).
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(..))
    }

    /// Returns `true` if this is a non-empty array whose elements are all
    /// tables.
    #[inline]
    pub fn is_table_array(&self) -> bool {
        matches!(self, Value::Array(a) if a.is_table_array())
    }

    /// Returns a borrowed string if this is a string value.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns an `i64` if this is an integer value.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns an `f64` if this is a float value.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a `bool` if this is a boolean value.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the offset date-time if this value is one.
    #[inline]
    pub fn as_offset_date_time(&self) -> Option<OffsetDateTime> {
        match self {
            Value::OffsetDateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the local date-time if this value is one.
    #[inline]
    pub fn as_local_date_time(&self) -> Option<LocalDateTime> {
        match self {
            Value::LocalDateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the local date if this value is one.
    #[inline]
    pub fn as_local_date(&self) -> Option<LocalDate> {
        match self {
            Value::LocalDate(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the local time if this value is one.
    #[inline]
    pub fn as_local_time(&self) -> Option<LocalTime> {
        match self {
            Value::LocalTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns a borrowed array if this is an array value.
    #[inline]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns a mutable array reference.
    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns a borrowed table if this is a table value.
    #[inline]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Returns a mutable table reference.
    #[inline]
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Extracts a typed value if the stored kind promotes to `T`
    /// (see [`FromValue`]).
    #[inline]
    pub fn value<'a, T: FromValue<'a>>(&'a self) -> Option<T> {
        T::from_value(self).ok()
    }

    /// Extracts a typed value, surfacing range errors on numeric narrowing.
    #[inline]
    pub fn try_value<'a, T: FromValue<'a>>(&'a self) -> Result<T, Error> {
        T::from_value(self)
    }

    pub(crate) fn expected(&self, what: &'static str) -> Error {
        Error {
            kind: ErrorKind::Wanted {
                expected: what,
                found: self.type_str(),
            },
            span: Span::default(),
            line_info: None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::String(s) => s.fmt(f),
            Value::Integer(i) => i.fmt(f),
            Value::Float(v) => v.fmt(f),
            Value::Boolean(b) => b.fmt(f),
            Value::OffsetDateTime(dt) => write!(f, "{dt}"),
            Value::LocalDateTime(dt) => write!(f, "{dt}"),
            Value::LocalDate(d) => write!(f, "{d}"),
            Value::LocalTime(t) => write!(f, "{t}"),
            Value::Array(a) => a.fmt(f),
            Value::Table(t) => t.fmt(f),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

macro_rules! from_integer {
    ($($num:ty),+) => {$(
        impl From<$num> for Value {
            fn from(i: $num) -> Self {
                Value::Integer(i as i64)
            }
        }
    )+};
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32);

impl TryFrom<u64> for Value {
    type Error = Error;

    fn try_from(i: u64) -> Result<Self, Error> {
        if i <= i64::MAX as u64 {
            Ok(Value::Integer(i as i64))
        } else {
            Err(Error {
                kind: ErrorKind::OutOfRange("i64"),
                span: Span::default(),
                line_info: None,
            })
        }
    }
}

impl From<OffsetDateTime> for Value {
    fn from(dt: OffsetDateTime) -> Self {
        Value::OffsetDateTime(dt)
    }
}

impl From<LocalDateTime> for Value {
    fn from(dt: LocalDateTime) -> Self {
        Value::LocalDateTime(dt)
    }
}

impl From<LocalDate> for Value {
    fn from(d: LocalDate) -> Self {
        Value::LocalDate(d)
    }
}

impl From<LocalTime> for Value {
    fn from(t: LocalTime) -> Self {
        Value::LocalTime(t)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

/// Conversion from a stored [`Value`] to a caller-requested type.
///
/// Implementations define the promotion policy: integers widen to floats,
/// offset date-times strip down to local date-times and dates, narrowing
/// integer conversions are range-checked, and every other cross-kind request
/// fails with a kind-mismatch error.
pub trait FromValue<'a>: Sized {
    /// Attempts the conversion.
    fn from_value(value: &'a Value) -> Result<Self, Error>;
}

impl<'a> FromValue<'a> for &'a str {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other.expected("a string")),
        }
    }
}

impl<'a> FromValue<'a> for String {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        <&str>::from_value(value).map(String::from)
    }
}

impl<'a> FromValue<'a> for bool {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        match value.as_bool() {
            Some(b) => Ok(b),
            None => Err(value.expected("a boolean")),
        }
    }
}

fn integer_in_range(value: &Value, min: i64, max: i64, name: &'static str) -> Result<i64, Error> {
    match value.as_integer() {
        Some(i) if i >= min && i <= max => Ok(i),
        Some(_) => Err(Error {
            kind: ErrorKind::OutOfRange(name),
            span: Span::default(),
            line_info: None,
        }),
        None => Err(value.expected("an integer")),
    }
}

macro_rules! integer {
    ($($num:ty),+) => {$(
        impl<'a> FromValue<'a> for $num {
            fn from_value(value: &'a Value) -> Result<Self, Error> {
                match integer_in_range(value, <$num>::MIN as i64, <$num>::MAX as i64, stringify!($num)) {
                    Ok(i) => Ok(i as $num),
                    Err(e) => Err(e),
                }
            }
        }
    )+};
}

integer!(i8, i16, i32, isize, u8, u16, u32);

impl<'a> FromValue<'a> for i64 {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        integer_in_range(value, i64::MIN, i64::MAX, "i64")
    }
}

impl<'a> FromValue<'a> for u64 {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        integer_in_range(value, 0, i64::MAX, "u64").map(|i| i as u64)
    }
}

impl<'a> FromValue<'a> for usize {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        const MAX: i64 = if usize::BITS < 64 {
            usize::MAX as i64
        } else {
            i64::MAX
        };
        integer_in_range(value, 0, MAX, "usize").map(|i| i as usize)
    }
}

impl<'a> FromValue<'a> for f64 {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        // Integer-to-float widening is the one permitted numeric promotion.
        match value {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            other => Err(other.expected("a float")),
        }
    }
}

impl<'a> FromValue<'a> for f32 {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl<'a> FromValue<'a> for OffsetDateTime {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::OffsetDateTime(dt) => Ok(*dt),
            other => Err(other.expected("an offset date-time")),
        }
    }
}

impl<'a> FromValue<'a> for LocalDateTime {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::LocalDateTime(dt) => Ok(*dt),
            Value::OffsetDateTime(dt) => Ok(dt.local_date_time()),
            other => Err(other.expected("a date-time")),
        }
    }
}

impl<'a> FromValue<'a> for LocalDate {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::LocalDate(d) => Ok(*d),
            Value::LocalDateTime(dt) => Ok(dt.date),
            Value::OffsetDateTime(dt) => Ok(dt.date),
            other => Err(other.expected("a date")),
        }
    }
}

impl<'a> FromValue<'a> for LocalTime {
    fn from_value(value: &'a Value) -> Result<Self, Error> {
        match value {
            Value::LocalTime(t) => Ok(*t),
            other => Err(other.expected("a time")),
        }
    }
}
