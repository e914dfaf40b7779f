//! Per-group and per-row rewrite primitives.

use gtable_types::error::{Result, TableError};
use gtable_types::value::{Value, ValueType};

use crate::column::ColumnBuilder;
use crate::groupid::GroupId;
use crate::grouping::{Grouping, GroupingBuilder};
use crate::table::{Table, TableBuilder};

/// Apply `f` independently to every group, preserving group identities.
/// This is the universal per-group rewrite underneath most transforms.
pub fn map_tables(
    g: &Grouping,
    mut f: impl FnMut(&GroupId, &Table) -> Result<Table>,
) -> Result<Grouping> {
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        b.add(gid.clone(), &f(gid, table)?)?;
    }
    Ok(b.done())
}

/// Apply a row-wise computation reading `in_cols` and writing the
/// declared `(name, type)` output columns. When every input column of a
/// group is constant, `f` runs once and its outputs bind as constants;
/// otherwise it runs per row and the outputs become regular columns.
/// The declared types make zero-row groups well formed and turn a
/// wrongly typed output into a `TypeMismatch`.
pub fn map_cols(
    g: &Grouping,
    in_cols: &[&str],
    out_cols: &[(&str, ValueType)],
    mut f: impl FnMut(&[Value]) -> Result<Vec<Value>>,
) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        let mut tb = TableBuilder::from_table(table);

        let consts: Option<Vec<Value>> = in_cols
            .iter()
            .map(|c| table.const_value(c).cloned())
            .collect();
        if let Some(args) = consts {
            let outputs = f(&args)?;
            check_arity(out_cols, &outputs)?;
            for ((name, ty), v) in out_cols.iter().zip(outputs) {
                if v.value_type() != *ty {
                    return Err(TableError::TypeMismatch(format!(
                        "output column {} declared {}, got {}",
                        name,
                        ty,
                        v.value_type()
                    )));
                }
                tb.add_const(name, v);
            }
            b.add(gid.clone(), &tb.done())?;
            continue;
        }

        let data = in_cols
            .iter()
            .map(|c| table.must_column(c))
            .collect::<Result<Vec<_>>>()?;
        let mut builders: Vec<ColumnBuilder> = out_cols
            .iter()
            .map(|(_, ty)| ColumnBuilder::new(*ty))
            .collect();
        let mut args: Vec<Value> = Vec::with_capacity(in_cols.len());
        for i in 0..table.len() {
            args.clear();
            for c in &data {
                args.push(c.get(i));
            }
            let outputs = f(&args)?;
            check_arity(out_cols, &outputs)?;
            for (cb, v) in builders.iter_mut().zip(&outputs) {
                cb.push(v)?;
            }
        }
        for ((name, _), cb) in out_cols.iter().zip(builders) {
            tb.add(name, cb.finish())?;
        }
        b.add(gid.clone(), &tb.done())?;
    }
    Ok(b.done())
}

fn check_arity(out_cols: &[(&str, ValueType)], outputs: &[Value]) -> Result<()> {
    if outputs.len() != out_cols.len() {
        return Err(TableError::LengthMismatch(format!(
            "map produced {} values for {} output columns",
            outputs.len(),
            out_cols.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::transforms::groupby::group_by;

    fn sample() -> Grouping {
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64, 2].into()).unwrap();
        b.add("v", vec![10.0, 20.0].into()).unwrap();
        Grouping::from_table(&b.done())
    }

    #[test]
    fn test_map_tables_preserves_identities() {
        let g = group_by(&sample(), &["k"]).unwrap();
        let out = map_tables(&g, |_, t| {
            let mut b = TableBuilder::from_table(t);
            b.add_const("tag", Value::Bool(true));
            Ok(b.done())
        })
        .unwrap();
        assert_eq!(out.tables(), g.tables());
        for (_, t) in out.iter() {
            assert_eq!(t.const_value("tag"), Some(&Value::Bool(true)));
        }
    }

    #[test]
    fn test_map_cols_row_wise() {
        let out = map_cols(&sample(), &["v"], &[("doubled", ValueType::Float)], |args| {
            Ok(vec![Value::Float(args[0].to_f64()? * 2.0)])
        })
        .unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        match t.must_column("doubled").unwrap() {
            Column::Float(v) => assert_eq!(&v[..], &[20.0, 40.0]),
            other => panic!("Expected Float, got {:?}", other),
        }
        // inputs are carried through untouched
        assert!(t.columns().contains(&"k".to_string()));
    }

    #[test]
    fn test_map_cols_const_inputs_bind_const_outputs() {
        let mut b = TableBuilder::new();
        b.add_const("unit", Value::from("ns"));
        b.add("v", vec![1i64, 2].into()).unwrap();
        let g = Grouping::from_table(&b.done());
        let out = map_cols(&g, &["unit"], &[("upper", ValueType::Str)], |args| match &args[0] {
            Value::Str(s) => Ok(vec![Value::from(s.to_uppercase().as_str())]),
            other => Err(TableError::TypeMismatch(format!(
                "expected str, got {}",
                other.value_type()
            ))),
        })
        .unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.const_value("upper"), Some(&Value::from("NS")));
    }

    #[test]
    fn test_map_cols_undeclared_output_type() {
        let res = map_cols(&sample(), &["k"], &[("mixed", ValueType::Int)], |args| {
            match args[0] {
                Value::Int(1) => Ok(vec![Value::Int(1)]),
                _ => Ok(vec![Value::from("two")]),
            }
        });
        assert!(matches!(res, Err(TableError::TypeMismatch(_))));
    }

    #[test]
    fn test_map_cols_replaces_existing_column() {
        let out = map_cols(&sample(), &["v"], &[("v", ValueType::Float)], |args| {
            Ok(vec![Value::Float(args[0].to_f64()? + 1.0)])
        })
        .unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.columns(), &["k".to_string(), "v".to_string()]);
        assert_eq!(t.must_column("v").unwrap().get(0), Value::Float(11.0));
        assert_eq!(t.col_type("v"), Some(ValueType::Float));
    }

    #[test]
    fn test_map_cols_keeps_outputs_on_zero_row_groups() {
        use crate::transforms::filter::filter_eq;

        // one group keeps a row, the other is filtered empty; both must
        // still carry the declared output column
        let g = group_by(&sample(), &["k"]).unwrap();
        let filtered = filter_eq(&g, "v", &Value::Float(10.0)).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.table(&filtered.tables()[1]).unwrap().len(), 0);

        let out = map_cols(&filtered, &["v"], &[("doubled", ValueType::Float)], |args| {
            Ok(vec![Value::Float(args[0].to_f64()? * 2.0)])
        })
        .unwrap();
        assert_eq!(out.len(), 2);
        for (_, t) in out.iter() {
            assert!(t.columns().contains(&"doubled".to_string()));
            assert_eq!(t.col_type("doubled"), Some(ValueType::Float));
        }
        let empty = out.table(&out.tables()[1]).unwrap();
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.must_column("doubled").unwrap().len(), 0);
    }
}
