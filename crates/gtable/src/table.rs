//! Immutable tables and the mutable staging builder.
//!
//! A `Table` is an ordered relation: named columns of uniform row count,
//! plus constant columns stored once and materialized lazily. Tables are
//! frozen on `done()`; "mutation" means building a new table that shares
//! the storage of every untouched column.

use std::collections::HashMap;
use std::sync::OnceLock;

use gtable_types::error::{Result, TableError};
use gtable_types::value::{Value, ValueType};

use crate::column::Column;

/// A constant column: the value plus a lazily materialized expansion.
#[derive(Debug, Clone)]
struct ConstCol {
    value: Value,
    cache: OnceLock<Column>,
}

impl ConstCol {
    fn new(value: Value) -> Self {
        ConstCol {
            value,
            cache: OnceLock::new(),
        }
    }
}

/// An immutable ordered relation.
///
/// The empty table — no column names at all — is the universal absence
/// value: it represents both "no rows" and "no groups", and is
/// indistinguishable from a freshly built `TableBuilder::new().done()`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    names: Vec<String>,
    cols: HashMap<String, Column>,
    consts: HashMap<String, ConstCol>,
    len: usize,
}

impl Table {
    /// The canonical empty table.
    pub fn new() -> Table {
        Table::default()
    }

    /// Number of rows. A table whose only columns are constants reports
    /// the count its builder established (see [`TableBuilder::set_len`]),
    /// defaulting to one row so the constants stay observable; a table
    /// with no columns reports zero.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the table has no columns at all.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.names
    }

    /// Look up a column, materializing (and caching) a constant on first
    /// access. Returns `None` for unknown names.
    pub fn column(&self, name: &str) -> Option<&Column> {
        if let Some(col) = self.cols.get(name) {
            return Some(col);
        }
        let cc = self.consts.get(name)?;
        Some(cc.cache.get_or_init(|| Column::repeat(&cc.value, self.len)))
    }

    /// Like [`Table::column`], but unknown names are an error.
    pub fn must_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// The raw value of a constant column. Returns `None` when the
    /// column is regular or absent.
    pub fn const_value(&self, name: &str) -> Option<&Value> {
        self.consts.get(name).map(|c| &c.value)
    }

    /// The element type of a column, synthesized from the constant value
    /// where needed.
    pub fn col_type(&self, name: &str) -> Option<ValueType> {
        if let Some(col) = self.cols.get(name) {
            return Some(col.value_type());
        }
        self.consts.get(name).map(|c| c.value.value_type())
    }

    /// Ordered (name, element type) pairs.
    pub fn schema(&self) -> Vec<(String, ValueType)> {
        self.names
            .iter()
            .filter_map(|n| self.col_type(n).map(|t| (n.clone(), t)))
            .collect()
    }
}

/// Mutable staging object that accumulates columns and freezes into a
/// [`Table`]. Single-use: `done()` resets the builder to its initial
/// empty state, detached from the frozen value.
#[derive(Debug, Default)]
pub struct TableBuilder {
    names: Vec<String>,
    cols: HashMap<String, Column>,
    consts: HashMap<String, Value>,
    len: Option<usize>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder::default()
    }

    /// Start from an existing table, sharing the storage of every column
    /// until it is replaced.
    pub fn from_table(table: &Table) -> TableBuilder {
        TableBuilder {
            names: table.names.clone(),
            cols: table.cols.clone(),
            consts: table
                .consts
                .iter()
                .map(|(n, c)| (n.clone(), c.value.clone()))
                .collect(),
            len: if table.names.is_empty() {
                None
            } else {
                Some(table.len)
            },
        }
    }

    /// Fix the row count explicitly. Needed when a derived table keeps
    /// only constant columns, which carry no length of their own.
    /// Disagreeing with a count already established by a regular column
    /// is an error.
    pub fn set_len(&mut self, n: usize) -> Result<&mut Self> {
        match self.len {
            Some(want) if want != n => Err(TableError::LengthMismatch(format!(
                "cannot set row count to {}, table has {}",
                n, want
            ))),
            _ => {
                self.len = Some(n);
                Ok(self)
            }
        }
    }

    /// Install or replace a regular column. The first regular column
    /// fixes the builder's row count; later columns must match it.
    pub fn add(&mut self, name: &str, col: Column) -> Result<&mut Self> {
        match self.len {
            Some(want) if col.len() != want => {
                return Err(TableError::LengthMismatch(format!(
                    "column {} has {} rows, table has {}",
                    name,
                    col.len(),
                    want
                )))
            }
            Some(_) => {}
            None => self.len = Some(col.len()),
        }
        if self.consts.remove(name).is_none() && !self.cols.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.cols.insert(name.to_string(), col);
        Ok(self)
    }

    /// Install or replace a constant column. The established row count,
    /// if any, is kept.
    pub fn add_const(&mut self, name: &str, value: Value) -> &mut Self {
        self.cols.remove(name);
        if !self.consts.contains_key(name) && !self.names.contains(&name.to_string()) {
            self.names.push(name.to_string());
        }
        self.consts.insert(name.to_string(), value);
        self
    }

    /// Remove a column of either kind. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) -> &mut Self {
        let had_regular = self.cols.remove(name).is_some();
        let had_const = self.consts.remove(name).is_some();
        if had_regular || had_const {
            self.names.retain(|n| n != name);
        }
        if self.cols.is_empty() && self.consts.is_empty() {
            self.len = None;
        }
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.cols.contains_key(name) || self.consts.contains_key(name)
    }

    /// Freeze the accumulated columns. The builder is reset to its
    /// initial empty state and may be reused for a fresh table.
    pub fn done(&mut self) -> Table {
        let b = std::mem::take(self);
        let len = match b.len {
            Some(n) => n,
            None if b.consts.is_empty() => 0,
            None => 1,
        };
        Table {
            names: b.names,
            cols: b.cols,
            consts: b
                .consts
                .into_iter()
                .map(|(n, v)| (n, ConstCol::new(v)))
                .collect(),
            len,
        }
    }
}
