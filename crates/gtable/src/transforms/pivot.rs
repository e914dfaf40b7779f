//! Reshaping between long and wide layouts.

use gtable_types::error::{Result, TableError};
use gtable_types::value::{Value, ValueType};

use crate::column::ColumnBuilder;
use crate::grouping::{col_type, Grouping, GroupingBuilder};
use crate::table::{Table, TableBuilder};
use crate::transforms::groupby::partition_multi;

/// Spread `value_col` into one output column per distinct value of
/// `label_col` (first-seen order across the whole grouping). Within each
/// table, rows are grouped by every other column; each subgroup becomes
/// one output row. Missing (row, label) cells take the value type's
/// zero. Labels must be strings, since they become column names.
pub fn pivot(g: &Grouping, label_col: &str, value_col: &str) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    if col_type(g, label_col)? != ValueType::Str {
        return Err(TableError::TypeMismatch(format!(
            "pivot labels in {} must be strings",
            label_col
        )));
    }
    let value_ty = col_type(g, value_col)?;

    // output columns, in first appearance order across all groups
    let mut labels: Vec<String> = Vec::new();
    for (_, table) in g.iter() {
        let col = table.must_column(label_col)?;
        for i in 0..col.len() {
            if let Value::Str(s) = col.get(i) {
                if !labels.iter().any(|l| l.as_str() == &*s) {
                    labels.push(s.to_string());
                }
            }
        }
    }

    let others: Vec<String> = g
        .columns()
        .into_iter()
        .filter(|n| n != label_col && n != value_col)
        .collect();

    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        let wide = pivot_table(table, label_col, value_col, &labels, &others, value_ty)?;
        b.add(gid.clone(), &wide)?;
    }
    Ok(b.done())
}

fn pivot_table(
    table: &Table,
    label_col: &str,
    value_col: &str,
    labels: &[String],
    others: &[String],
    value_ty: ValueType,
) -> Result<Table> {
    let other_refs: Vec<&str> = others.iter().map(|s| s.as_str()).collect();
    let groups = partition_multi(table, &other_refs)?;

    let label_data = table.must_column(label_col)?;
    let value_data = table.must_column(value_col)?;

    let mut key_builders: Vec<(String, ColumnBuilder)> = Vec::new();
    let mut key_consts: Vec<(String, Value)> = Vec::new();
    for name in others {
        match table.const_value(name) {
            Some(v) => key_consts.push((name.clone(), v.clone())),
            None => {
                let ty = table
                    .col_type(name)
                    .ok_or_else(|| TableError::UnknownColumn(name.clone()))?;
                key_builders.push((name.clone(), ColumnBuilder::new(ty)));
            }
        }
    }
    let mut cells: Vec<Vec<Option<Value>>> = vec![Vec::new(); labels.len()];

    for rows in &groups {
        for (name, cb) in key_builders.iter_mut() {
            cb.push(&table.must_column(name)?.get(rows[0]))?;
        }
        let mut row: Vec<Option<Value>> = vec![None; labels.len()];
        for &i in rows {
            if let Value::Str(s) = label_data.get(i) {
                if let Some(slot) = labels.iter().position(|l| l.as_str() == &*s) {
                    row[slot] = Some(value_data.get(i));
                }
            }
        }
        for (slot, cell) in row.into_iter().enumerate() {
            cells[slot].push(cell);
        }
    }

    let mut b = TableBuilder::new();
    b.set_len(groups.len())?;
    for (name, v) in key_consts {
        b.add_const(&name, v);
    }
    for (name, cb) in key_builders {
        b.add(&name, cb.finish())?;
    }
    for (slot, label) in labels.iter().enumerate() {
        let mut cb = ColumnBuilder::new(value_ty);
        for cell in &cells[slot] {
            match cell {
                Some(v) => cb.push(v)?,
                None => cb.push(&value_ty.zero())?,
            }
        }
        b.add(label, cb.finish())?;
    }
    Ok(b.done())
}

/// The inverse direction: for each input row, emit one output row per
/// name in `cols`, replicating every non-listed column, with `label_col`
/// holding the column name and `value_col` its value. All of `cols` must
/// share one element type.
pub fn unpivot(
    g: &Grouping,
    label_col: &str,
    value_col: &str,
    cols: &[&str],
) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    if cols.is_empty() {
        return Err(TableError::TypeMismatch(
            "unpivot requires at least one column".to_string(),
        ));
    }
    let value_ty = col_type(g, cols[0])?;
    for c in &cols[1..] {
        let ty = col_type(g, c)?;
        if ty != value_ty {
            return Err(TableError::TypeMismatch(format!(
                "unpivot columns disagree: {} is {}, {} is {}",
                cols[0], value_ty, c, ty
            )));
        }
    }
    let kept: Vec<String> = g
        .columns()
        .into_iter()
        .filter(|n| !cols.contains(&n.as_str()))
        .collect();
    for name in &kept {
        if name == label_col || name == value_col {
            return Err(TableError::SchemaMismatch(format!(
                "output column {} collides with a replicated input column",
                name
            )));
        }
    }

    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        let long = unpivot_table(table, label_col, value_col, cols, &kept, value_ty)?;
        b.add(gid.clone(), &long)?;
    }
    Ok(b.done())
}

fn unpivot_table(
    table: &Table,
    label_col: &str,
    value_col: &str,
    cols: &[&str],
    kept: &[String],
    value_ty: ValueType,
) -> Result<Table> {
    let n = table.len();
    let width = cols.len();

    // row-major expansion: input row i becomes output rows i*width..
    let replicate: Vec<usize> = (0..n).flat_map(|i| std::iter::repeat(i).take(width)).collect();

    let mut b = TableBuilder::new();
    for name in kept {
        match table.const_value(name) {
            Some(v) if !replicate.is_empty() => {
                b.add_const(name, v.clone());
            }
            Some(v) => {
                b.add(name, ColumnBuilder::new(v.value_type()).finish())?;
            }
            None => {
                b.add(name, table.must_column(name)?.gather(&replicate))?;
            }
        }
    }

    let mut label_b = ColumnBuilder::new(ValueType::Str);
    let mut value_b = ColumnBuilder::new(value_ty);
    let sources = cols
        .iter()
        .map(|c| table.must_column(c))
        .collect::<Result<Vec<_>>>()?;
    for i in 0..n {
        for (c, src) in cols.iter().zip(&sources) {
            label_b.push(&Value::from(*c))?;
            value_b.push(&src.get(i))?;
        }
    }
    b.add(label_col, label_b.finish())?;
    b.add(value_col, value_b.finish())?;
    Ok(b.done())
}
