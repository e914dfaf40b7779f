//! Row selection.

use gtable_types::error::{Result, TableError};
use gtable_types::value::{Value, ValueKey, ValueType};

use crate::grouping::{col_type, Grouping, GroupingBuilder};
use crate::transforms::groupby::subtable;

/// A typed row predicate. The declared argument types are checked
/// against the named columns before any row is scanned.
pub struct Predicate {
    arg_types: Vec<ValueType>,
    f: Box<dyn Fn(&[Value]) -> bool>,
}

impl Predicate {
    pub fn new(arg_types: Vec<ValueType>, f: impl Fn(&[Value]) -> bool + 'static) -> Predicate {
        Predicate {
            arg_types,
            f: Box::new(f),
        }
    }

    pub fn arg_types(&self) -> &[ValueType] {
        &self.arg_types
    }

    pub fn eval(&self, args: &[Value]) -> bool {
        (self.f)(args)
    }
}

/// Keep the rows of each table where `pred` returns true over the named
/// columns. Row order is preserved; a table where every row passes is
/// returned unchanged, sharing all storage.
pub fn filter(g: &Grouping, pred: &Predicate, cols: &[&str]) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    if cols.len() != pred.arg_types().len() {
        return Err(TableError::TypeMismatch(format!(
            "predicate takes {} arguments, got {} columns",
            pred.arg_types().len(),
            cols.len()
        )));
    }
    for (c, want) in cols.iter().zip(pred.arg_types()) {
        let ty = col_type(g, c)?;
        if ty != *want {
            return Err(TableError::TypeMismatch(format!(
                "predicate argument for {} wants {}, column is {}",
                c, want, ty
            )));
        }
    }

    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        let data = cols
            .iter()
            .map(|c| table.must_column(c))
            .collect::<Result<Vec<_>>>()?;
        let mut keep: Vec<usize> = Vec::new();
        let mut args: Vec<Value> = Vec::with_capacity(cols.len());
        for i in 0..table.len() {
            args.clear();
            for c in &data {
                args.push(c.get(i));
            }
            if pred.eval(&args) {
                keep.push(i);
            }
        }
        if keep.len() == table.len() {
            b.add(gid.clone(), table)?;
        } else {
            b.add(gid.clone(), &subtable(table, &keep, &[])?)?;
        }
    }
    Ok(b.done())
}

/// Keep the rows where `col` equals `value`. Tables where the column is
/// a matching constant pass through unchanged; a non-matching constant
/// drops every row.
pub fn filter_eq(g: &Grouping, col: &str, value: &Value) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    let ty = col_type(g, col)?;
    if ty != value.value_type() {
        return Err(TableError::TypeMismatch(format!(
            "cannot compare {} column {} against a {} value",
            ty,
            col,
            value.value_type()
        )));
    }

    let want = ValueKey(value.clone());
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        if let Some(v) = table.const_value(col) {
            if ValueKey(v.clone()) == want {
                b.add(gid.clone(), table)?;
            } else {
                b.add(gid.clone(), &subtable(table, &[], &[])?)?;
            }
            continue;
        }
        let data = table.must_column(col)?;
        let keep: Vec<usize> = (0..data.len())
            .filter(|&i| ValueKey(data.get(i)) == want)
            .collect();
        if keep.len() == table.len() {
            b.add(gid.clone(), table)?;
        } else {
            b.add(gid.clone(), &subtable(table, &keep, &[])?)?;
        }
    }
    Ok(b.done())
}
