#![cfg_attr(docsrs, doc(cfg(feature = "serde")))]

//! Serde serialization support for the document tree.
//!
//! Enabled by the `serde` feature flag. This provides [`serde::Serialize`]
//! implementations only — typed extraction out of a tree goes through the
//! [`FromValue`](crate::FromValue) trait instead. Date-time values
//! serialize in their TOML text form.

use crate::datetime::{LocalDate, LocalDateTime, LocalTime, OffsetDateTime};
use crate::value::Value;
use crate::view::View;
use crate::{Array, Table};

impl serde::Serialize for Value {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::None => ser.serialize_unit(),
            Value::String(s) => ser.serialize_str(s),
            Value::Integer(i) => ser.serialize_i64(*i),
            Value::Float(f) => ser.serialize_f64(*f),
            Value::Boolean(b) => ser.serialize_bool(*b),
            Value::OffsetDateTime(dt) => dt.serialize(ser),
            Value::LocalDateTime(dt) => dt.serialize(ser),
            Value::LocalDate(d) => d.serialize(ser),
            Value::LocalTime(t) => t.serialize(ser),
            Value::Array(a) => a.serialize(ser),
            Value::Table(t) => t.serialize(ser),
        }
    }
}

impl serde::Serialize for Array {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = ser.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl serde::Serialize for Table {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = ser.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl serde::Serialize for View {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.node() {
            Some(node) => node.serialize(ser),
            None => ser.serialize_unit(),
        }
    }
}

macro_rules! serialize_display {
    ($($ty:ty),+) => {$(
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                ser.collect_str(self)
            }
        }
    )+};
}

serialize_display!(LocalDate, LocalTime, LocalDateTime, OffsetDateTime);
