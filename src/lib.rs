//! A TOML 1.0 parser and serializer built around an owned document tree.
//!
//! The tree is a single tagged [`Value`] over the TOML kinds; tables and
//! arrays own their children, so cloning a node is a deep copy and a parsed
//! document has no lifetime ties to its source text.
//!
//! # Quick start
//!
//! Use [`parse`] (or [`parse_file`]) to get the root [`Table`]:
//! ```
//! # fn main() -> Result<(), toml_tree::Error> {
//! let root = toml_tree::parse("key = 'value'")?;
//! # Ok(())
//! # }
//! ```
//! Traverse the tree via index operators, which return a null-safe
//! [`View`] — missing keys and out-of-range indexes yield a none view
//! instead of panicking, and a key containing `.` is a dotted path:
//! ```
//! # let root = toml_tree::parse("[server]\nname = \"a\"\nports = [80, 443]").unwrap();
//! let name: Option<&str> = root["server.name"].as_str();
//! let first: Option<i64> = root["server"]["ports"][0].as_integer();
//! assert_eq!(root["server"]["missing"][7].as_str(), None);
//! ```
//!
//! # Typed extraction
//!
//! [`View::value`] converts the stored kind to the requested type where the
//! promotion rules allow: integers widen to floats, integer narrowing is
//! range-checked, offset date-times strip down to local date-times and
//! dates, and everything else is `None`.
//! ```
//! # fn main() -> Result<(), toml_tree::Error> {
//! let root = toml_tree::parse("n = 300\nxs = [1, 2.5, 'three']")?;
//! assert_eq!(root["n"].value::<u16>(), Some(300));
//! assert_eq!(root["n"].value::<u8>(), None); // 300 does not fit
//! assert_eq!(root["n"].value::<f64>(), Some(300.0));
//! assert_eq!(root["xs"].collect::<f64>(), [1.0, 2.5]);
//! # Ok(())
//! # }
//! ```
//!
//! # Serialization
//!
//! [`write`], [`to_string`], and the `Display` impls emit canonical TOML:
//! keys sorted per table, sub-tables as `[dotted.headers]`, arrays of
//! tables as repeated `[[header]]` blocks. The output re-parses to a
//! structurally equal tree.
//! ```
//! # fn main() -> Result<(), toml_tree::Error> {
//! let root = toml_tree::parse("a.b.c = 1")?;
//! assert_eq!(toml_tree::parse(&root.to_string())?, root);
//! # Ok(())
//! # }
//! ```

mod array;
mod datetime;
mod error;
mod parser;
mod span;
mod table;
mod value;
mod view;
mod write;

pub use array::Array;
pub use datetime::{LocalDate, LocalDateTime, LocalTime, OffsetDateTime, TimeOffset};
pub use error::{Error, ErrorKind};
pub use parser::{parse, parse_file};
pub use span::Span;
pub use table::Table;
pub use value::{FromValue, Kind, Value};
pub use view::View;
pub use write::{Writer, to_string, write};

#[cfg(feature = "serde")]
pub mod impl_serde;
