use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{Result, TableError};

/// Type tag for column element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Float,
    Str,
    Bool,
}

impl ValueType {
    /// The zero value for this type, used to fill cells with no
    /// contributing row (e.g. pivot holes).
    pub fn zero(self) -> Value {
        match self {
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Str => Value::Str(Arc::from("")),
            ValueType::Bool => Value::Bool(false),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Str => write!(f, "str"),
            ValueType::Bool => write!(f, "bool"),
        }
    }
}

/// The core element value, one variant per supported column type.
///
/// Deliberately not `Eq`/`Hash`/`Ord`: hashing goes through [`ValueKey`]
/// (floats by bit pattern) and ordering through [`Value::try_cmp`], so
/// float semantics stay explicit at every use site.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Bool(bool),
}

impl Value {
    /// Returns the type tag for this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::Str,
            Value::Bool(_) => ValueType::Bool,
        }
    }

    /// Natural ordering within one element type.
    ///
    /// Returns `None` when the comparison has no defined order: values of
    /// different types, or a float comparison involving NaN.
    pub fn try_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Numeric view of this value, for aggregation.
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            other => Err(TableError::TypeMismatch(format!(
                "expected a numeric value, got {}",
                other.value_type()
            ))),
        }
    }

    /// Rebind a reduced numeric result to the given column type.
    pub fn from_f64(ty: ValueType, x: f64) -> Result<Value> {
        match ty {
            ValueType::Int => Ok(Value::Int(x.round() as i64)),
            ValueType::Float => Ok(Value::Float(x)),
            other => Err(TableError::TypeMismatch(format!(
                "cannot rebind a numeric result to a {} column",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Wrapper giving `Value` the hash/equality semantics needed for use as
/// a hash map key. Floats compare and hash by bit pattern.
#[derive(Debug, Clone)]
pub struct ValueKey(pub Value);

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ValueKey {}

impl std::hash::Hash for ValueKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Bool(b) => b.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_value_type_tags() {
        assert_eq!(Value::Int(42).value_type(), ValueType::Int);
        assert_eq!(Value::Float(1.5).value_type(), ValueType::Float);
        assert_eq!(Value::from("hi").value_type(), ValueType::Str);
        assert_eq!(Value::Bool(true).value_type(), ValueType::Bool);
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(ValueType::Int.zero(), Value::Int(0));
        assert_eq!(ValueType::Float.zero(), Value::Float(0.0));
        assert_eq!(ValueType::Str.zero(), Value::from(""));
        assert_eq!(ValueType::Bool.zero(), Value::Bool(false));
    }

    #[test]
    fn test_try_cmp_same_type() {
        assert_eq!(
            Value::Int(1).try_cmp(&Value::Int(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("b").try_cmp(&Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Float(1.0).try_cmp(&Value::Float(1.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_try_cmp_nan_and_cross_type() {
        assert_eq!(Value::Float(f64::NAN).try_cmp(&Value::Float(1.0)), None);
        assert_eq!(Value::Int(1).try_cmp(&Value::Float(1.0)), None);
    }

    #[test]
    fn test_numeric_round_trip() {
        assert_eq!(Value::Int(3).to_f64().unwrap(), 3.0);
        assert_eq!(
            Value::from_f64(ValueType::Int, 2.6).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            Value::from_f64(ValueType::Float, 2.6).unwrap(),
            Value::Float(2.6)
        );
        assert!(Value::from("x").to_f64().is_err());
        assert!(Value::from_f64(ValueType::Str, 1.0).is_err());
    }

    #[test]
    fn test_value_key_hashing() {
        let mut map: HashMap<ValueKey, i32> = HashMap::new();
        map.insert(ValueKey(Value::Float(1.0)), 1);
        map.insert(ValueKey(Value::Int(1)), 2);
        assert_eq!(map.get(&ValueKey(Value::Float(1.0))), Some(&1));
        assert_eq!(map.get(&ValueKey(Value::Int(1))), Some(&2));
        assert_eq!(map.len(), 2);

        // NaN keys are self-consistent by bit pattern
        map.insert(ValueKey(Value::Float(f64::NAN)), 3);
        assert_eq!(map.get(&ValueKey(Value::Float(f64::NAN))), Some(&3));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::Int(7)), "7");
        assert_eq!(format!("{}", Value::from("go1.22")), "go1.22");
        assert_eq!(format!("{}", Value::Bool(false)), "false");
    }
}
