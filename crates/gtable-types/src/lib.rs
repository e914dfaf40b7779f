//! Element types shared by every gtable column.
//!
//! A column holds values of exactly one element type drawn from a small
//! closed set. `Value` is the tagged variant; `ValueType` the tag.

pub mod error;
pub mod value;

pub use error::{Result, TableError};
pub use value::{Value, ValueKey, ValueType};
