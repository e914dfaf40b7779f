//! Frozen column storage and the mutable column accumulator.
//!
//! A `Column` is a homogeneous sequence of values behind a shared `Arc`
//! buffer; cloning a column shares storage. New storage is only ever
//! produced through a `ColumnBuilder` (or the gather/repeat helpers),
//! so a frozen column can never be mutated in place.

use std::sync::Arc;

use gtable_types::error::{Result, TableError};
use gtable_types::value::{Value, ValueType};

/// A frozen, homogeneously typed column. Cloning shares the backing buffer.
#[derive(Debug, Clone)]
pub enum Column {
    Int(Arc<[i64]>),
    Float(Arc<[f64]>),
    Str(Arc<[Arc<str>]>),
    Bool(Arc<[bool]>),
}

impl Column {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Str(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element type of this column.
    pub fn value_type(&self) -> ValueType {
        match self {
            Column::Int(_) => ValueType::Int,
            Column::Float(_) => ValueType::Float,
            Column::Str(_) => ValueType::Str,
            Column::Bool(_) => ValueType::Bool,
        }
    }

    /// Get the value at `index`.
    pub fn get(&self, index: usize) -> Value {
        match self {
            Column::Int(v) => Value::Int(v[index]),
            Column::Float(v) => Value::Float(v[index]),
            Column::Str(v) => Value::Str(v[index].clone()),
            Column::Bool(v) => Value::Bool(v[index]),
        }
    }

    /// Copy out the rows at `indices`, in order.
    pub fn gather(&self, indices: &[usize]) -> Column {
        match self {
            Column::Int(v) => {
                Column::Int(indices.iter().map(|&i| v[i]).collect::<Vec<_>>().into())
            }
            Column::Float(v) => {
                Column::Float(indices.iter().map(|&i| v[i]).collect::<Vec<_>>().into())
            }
            Column::Str(v) => Column::Str(
                indices
                    .iter()
                    .map(|&i| v[i].clone())
                    .collect::<Vec<_>>()
                    .into(),
            ),
            Column::Bool(v) => {
                Column::Bool(indices.iter().map(|&i| v[i]).collect::<Vec<_>>().into())
            }
        }
    }

    /// Materialize a constant into a column of `len` rows.
    pub fn repeat(value: &Value, len: usize) -> Column {
        match value {
            Value::Int(v) => Column::Int(vec![*v; len].into()),
            Value::Float(v) => Column::Float(vec![*v; len].into()),
            Value::Str(v) => Column::Str(vec![v.clone(); len].into()),
            Value::Bool(v) => Column::Bool(vec![*v; len].into()),
        }
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v.into())
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v.into())
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Str(v.into_iter().map(Arc::from).collect::<Vec<_>>().into())
    }
}

impl From<Vec<bool>> for Column {
    fn from(v: Vec<bool>) -> Self {
        Column::Bool(v.into())
    }
}

/// Mutable, typed accumulator for one column.
#[derive(Debug)]
pub enum ColumnBuilder {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<Arc<str>>),
    Bool(Vec<bool>),
}

impl ColumnBuilder {
    /// Create an empty builder of the given element type.
    pub fn new(ty: ValueType) -> Self {
        match ty {
            ValueType::Int => ColumnBuilder::Int(Vec::new()),
            ValueType::Float => ColumnBuilder::Float(Vec::new()),
            ValueType::Str => ColumnBuilder::Str(Vec::new()),
            ValueType::Bool => ColumnBuilder::Bool(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnBuilder::Int(v) => v.len(),
            ColumnBuilder::Float(v) => v.len(),
            ColumnBuilder::Str(v) => v.len(),
            ColumnBuilder::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ColumnBuilder::Int(_) => ValueType::Int,
            ColumnBuilder::Float(_) => ValueType::Float,
            ColumnBuilder::Str(_) => ValueType::Str,
            ColumnBuilder::Bool(_) => ValueType::Bool,
        }
    }

    /// Append a value. Fails when the value's tag disagrees with the
    /// builder's element type.
    pub fn push(&mut self, value: &Value) -> Result<()> {
        match (&mut *self, value) {
            (ColumnBuilder::Int(v), Value::Int(x)) => v.push(*x),
            (ColumnBuilder::Float(v), Value::Float(x)) => v.push(*x),
            (ColumnBuilder::Str(v), Value::Str(x)) => v.push(x.clone()),
            (ColumnBuilder::Bool(v), Value::Bool(x)) => v.push(*x),
            (b, v) => {
                return Err(TableError::TypeMismatch(format!(
                    "cannot push a {} value into a {} column",
                    v.value_type(),
                    b.value_type()
                )))
            }
        }
        Ok(())
    }

    /// Append every row of a frozen column of the same element type.
    pub fn extend_from(&mut self, col: &Column) -> Result<()> {
        match (&mut *self, col) {
            (ColumnBuilder::Int(a), Column::Int(b)) => a.extend_from_slice(b),
            (ColumnBuilder::Float(a), Column::Float(b)) => a.extend_from_slice(b),
            (ColumnBuilder::Str(a), Column::Str(b)) => a.extend_from_slice(b),
            (ColumnBuilder::Bool(a), Column::Bool(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(TableError::TypeMismatch(format!(
                    "cannot extend a {} column with a {} column",
                    a.value_type(),
                    b.value_type()
                )))
            }
        }
        Ok(())
    }

    /// Freeze the accumulated values.
    pub fn finish(self) -> Column {
        match self {
            ColumnBuilder::Int(v) => Column::Int(v.into()),
            ColumnBuilder::Float(v) => Column::Float(v.into()),
            ColumnBuilder::Str(v) => Column::Str(v.into()),
            ColumnBuilder::Bool(v) => Column::Bool(v.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_len() {
        let col: Column = vec![1i64, 2, 3].into();
        assert_eq!(col.len(), 3);
        assert_eq!(col.value_type(), ValueType::Int);
        assert_eq!(col.get(1), Value::Int(2));
    }

    #[test]
    fn test_clone_shares_storage() {
        let col: Column = vec![1.5, 2.5].into();
        let copy = col.clone();
        match (&col, &copy) {
            (Column::Float(a), Column::Float(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("Expected Float columns"),
        }
    }

    #[test]
    fn test_gather() {
        let col: Column = vec!["a", "b", "c", "d"].into();
        let picked = col.gather(&[3, 1]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.get(0), Value::from("d"));
        assert_eq!(picked.get(1), Value::from("b"));
    }

    #[test]
    fn test_repeat() {
        let col = Column::repeat(&Value::Bool(true), 3);
        assert_eq!(col.len(), 3);
        assert_eq!(col.get(2), Value::Bool(true));
        assert!(Column::repeat(&Value::Int(0), 0).is_empty());
    }

    #[test]
    fn test_builder_push_and_finish() {
        let mut b = ColumnBuilder::new(ValueType::Int);
        b.push(&Value::Int(10)).unwrap();
        b.push(&Value::Int(20)).unwrap();
        assert!(b.push(&Value::from("nope")).is_err());
        let col = b.finish();
        assert_eq!(col.len(), 2);
        assert_eq!(col.get(1), Value::Int(20));
    }

    #[test]
    fn test_builder_extend_from() {
        let mut b = ColumnBuilder::new(ValueType::Float);
        b.extend_from(&vec![1.0, 2.0].into()).unwrap();
        b.extend_from(&vec![3.0].into()).unwrap();
        assert!(b.extend_from(&vec![1i64].into()).is_err());
        assert_eq!(b.finish().len(), 3);
    }
}
