//! gtable — an immutable, columnar table-and-grouping engine.
//!
//! Tabular measurement data (e.g. benchmark results) is represented as
//! named columns of uniform element type. Rows are partitioned into a
//! hierarchy of groups, and a small algebra of pure transforms —
//! group-by, join, pivot/unpivot, aggregate, filter, sort, concatenate —
//! reshapes groupings without static knowledge of column element types.
//!
//! Tables and groupings are frozen once built; every transform returns a
//! new value, sharing unmodified column storage with its input. Builders
//! are the only mutable actors and are strictly single-use.

pub mod column;
pub mod groupid;
pub mod grouping;
pub mod table;
pub mod transforms;

pub use column::{Column, ColumnBuilder};
pub use groupid::GroupId;
pub use grouping::{col_type, Grouping, GroupingBuilder};
pub use table::{Table, TableBuilder};

pub use gtable_types::error::{Result, TableError};
pub use gtable_types::value::{Value, ValueKey, ValueType};
