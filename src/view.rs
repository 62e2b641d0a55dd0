#![allow(unsafe_code)]

//! Null-safe, chainable traversal over the document tree.

#[cfg(test)]
#[path = "./view_tests.rs"]
mod tests;

use crate::datetime::{LocalDate, LocalDateTime, LocalTime, OffsetDateTime};
use crate::value::{FromValue, Kind, Value};
use crate::{Array, Table};
use std::fmt;

/// The view every missing lookup resolves to.
static NONE: View = View { node: Value::None };

/// A non-owning, nullable handle over a [`Value`].
///
/// Views are obtained by indexing a [`Table`], [`Array`], or another view,
/// and support chained traversal by string key, dotted path, or integer
/// index:
///
/// ```
/// let root = toml_tree::parse("[[fruit]]\nname = \"apple\"")?;
/// assert_eq!(root["fruit"][0]["name"].as_str(), Some("apple"));
/// assert_eq!(root["fruit.0.name"].as_str(), None); // indexes are not path segments
/// # Ok::<(), toml_tree::Error>(())
/// ```
///
/// Every operation is defined on the null view: predicates return `false`,
/// extractors return `None`, and indexing returns another null view.
#[repr(transparent)]
pub struct View {
    node: Value,
}

impl View {
    /// The null view.
    #[inline]
    pub fn none() -> &'static View {
        &NONE
    }

    #[inline]
    pub(crate) fn from_ref(value: &Value) -> &View {
        // SAFETY: View is #[repr(transparent)] over Value.
        unsafe { &*(value as *const Value as *const View) }
    }

    /// The underlying node, or `None` for the null view.
    #[inline]
    pub fn node(&self) -> Option<&Value> {
        match self.node {
            Value::None => None,
            ref node => Some(node),
        }
    }

    /// The kind of the viewed node; [`Kind::None`] for the null view.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.node.kind()
    }

    /// Returns `true` if this view is null or views an absent value.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self.node, Value::None)
    }

    /// Returns `true` if the viewed node is of the given kind.
    #[inline]
    pub fn is(&self, kind: Kind) -> bool {
        self.kind() == kind
    }

    /// Returns `true` for scalar kinds.
    #[inline]
    pub fn is_value(&self) -> bool {
        self.node.is_value()
    }

    /// Returns `true` if the viewed node is a table.
    #[inline]
    pub fn is_table(&self) -> bool {
        self.node.is_table()
    }

    /// Returns `true` if the viewed node is an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        self.node.is_array()
    }

    /// Returns `true` if the viewed node is a non-empty array of tables.
    #[inline]
    pub fn is_table_array(&self) -> bool {
        self.node.is_table_array()
    }

    /// Dotted-path lookup. If the viewed node is a table, the key is split
    /// at the first `.` and lookup recurses on the remainder; otherwise the
    /// null view is returned. A trailing `.` is ignored.
    ///
    /// Keys that themselves contain a `.` can be looked up with
    /// [`at_literal`](Self::at_literal).
    pub fn get(&self, key: &str) -> &View {
        let (head, rest) = match key.split_once('.') {
            Some((head, rest)) => (head, rest),
            None => (key, ""),
        };
        let next = self.at_literal(head);
        if rest.is_empty() { next } else { next.get(rest) }
    }

    /// Looks up the exact key, dots included, without path splitting.
    pub fn at_literal(&self, key: &str) -> &View {
        match self.node.as_table().and_then(|t| t.get(key)) {
            Some(value) => View::from_ref(value),
            None => View::none(),
        }
    }

    /// Array element lookup; the null view when the node is not an array or
    /// the index is out of range.
    pub fn at(&self, index: usize) -> &View {
        match self.node.as_array().and_then(|a| a.get(index)) {
            Some(value) => View::from_ref(value),
            None => View::none(),
        }
    }

    /// Returns whether the dotted path resolves, using the same split rule
    /// as [`get`](Self::get).
    pub fn contains(&self, key: &str) -> bool {
        !self.get(key).is_none()
    }

    /// Extracts a typed value if the stored kind promotes to `T`.
    #[inline]
    pub fn value<'a, T: FromValue<'a>>(&'a self) -> Option<T> {
        self.node.value()
    }

    /// Extracts a typed value, falling back to `default`.
    #[inline]
    pub fn value_or<'a, T: FromValue<'a>>(&'a self, default: T) -> T {
        self.value().unwrap_or(default)
    }

    /// If a value of type `T` is retrievable, applies `f` to it.
    #[inline]
    pub fn map<'a, T, F, U>(&'a self, f: F) -> Option<U>
    where
        T: FromValue<'a>,
        F: FnOnce(T) -> U,
    {
        self.value().map(f)
    }

    /// If the node is an array, extracts every element that converts to
    /// `T`; otherwise an empty vector.
    pub fn collect<'a, T: FromValue<'a>>(&'a self) -> Vec<T> {
        match self.node.as_array() {
            Some(array) => array.collect(),
            None => Vec::new(),
        }
    }

    /// Like [`collect`](Self::collect), mapping each extracted value
    /// through `f`.
    pub fn map_collect<'a, T, F, U>(&'a self, f: F) -> Vec<U>
    where
        T: FromValue<'a>,
        F: FnMut(T) -> U,
    {
        match self.node.as_array() {
            Some(array) => array.map_collect(f),
            None => Vec::new(),
        }
    }

    /// Returns a borrowed string if the node is a string value.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.node.as_str()
    }

    /// Returns an `i64` if the node is an integer value.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        self.node.as_integer()
    }

    /// Returns an `f64` if the node is a float value.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        self.node.as_float()
    }

    /// Returns a `bool` if the node is a boolean value.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        self.node.as_bool()
    }

    /// Returns the offset date-time if the node is one.
    #[inline]
    pub fn as_offset_date_time(&self) -> Option<OffsetDateTime> {
        self.node.as_offset_date_time()
    }

    /// Returns the local date-time if the node is one.
    #[inline]
    pub fn as_local_date_time(&self) -> Option<LocalDateTime> {
        self.node.as_local_date_time()
    }

    /// Returns the local date if the node is one.
    #[inline]
    pub fn as_local_date(&self) -> Option<LocalDate> {
        self.node.as_local_date()
    }

    /// Returns the local time if the node is one.
    #[inline]
    pub fn as_local_time(&self) -> Option<LocalTime> {
        self.node.as_local_time()
    }

    /// Returns a borrowed array if the node is an array.
    #[inline]
    pub fn as_array(&self) -> Option<&Array> {
        self.node.as_array()
    }

    /// Returns a borrowed table if the node is a table.
    #[inline]
    pub fn as_table(&self) -> Option<&Table> {
        self.node.as_table()
    }
}

impl Value {
    /// Returns a [`View`] over this value.
    #[inline]
    pub fn view(&self) -> &View {
        View::from_ref(self)
    }
}

impl std::ops::Index<&str> for View {
    type Output = View;

    #[inline]
    fn index(&self, key: &str) -> &Self::Output {
        self.get(key)
    }
}

impl std::ops::Index<usize> for View {
    type Output = View;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.at(index)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}
