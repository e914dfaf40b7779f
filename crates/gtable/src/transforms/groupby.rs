//! Group-by and its inverses, plus the row-selection helpers shared by
//! most other transforms.

use std::collections::HashMap;

use gtable_types::error::{Result, TableError};
use gtable_types::value::{Value, ValueKey};

use crate::column::ColumnBuilder;
use crate::groupid::GroupId;
use crate::grouping::{Grouping, GroupingBuilder};
use crate::table::{Table, TableBuilder};

/// Partition the rows of `table` by the values of one column, in
/// first-seen order. Returns (value, row indices) per distinct value.
pub(crate) fn partition(table: &Table, col: &str) -> Result<Vec<(Value, Vec<usize>)>> {
    if let Some(v) = table.const_value(col) {
        return Ok(vec![(v.clone(), (0..table.len()).collect())]);
    }
    let data = table.must_column(col)?;
    let mut slots: HashMap<ValueKey, usize> = HashMap::new();
    let mut out: Vec<(Value, Vec<usize>)> = Vec::new();
    for i in 0..data.len() {
        let v = data.get(i);
        let slot = *slots.entry(ValueKey(v.clone())).or_insert_with(|| {
            out.push((v, Vec::new()));
            out.len() - 1
        });
        out[slot].1.push(i);
    }
    Ok(out)
}

/// Partition by a tuple of columns. With no columns, every row lands in
/// one partition keyed by the empty tuple.
pub(crate) fn partition_multi(table: &Table, cols: &[&str]) -> Result<Vec<Vec<usize>>> {
    if cols.is_empty() {
        if table.len() == 0 {
            return Ok(Vec::new());
        }
        return Ok(vec![(0..table.len()).collect()]);
    }
    let data = cols
        .iter()
        .map(|c| table.must_column(c))
        .collect::<Result<Vec<_>>>()?;
    let mut slots: HashMap<Vec<ValueKey>, usize> = HashMap::new();
    let mut out: Vec<Vec<usize>> = Vec::new();
    for i in 0..table.len() {
        let key: Vec<ValueKey> = data.iter().map(|c| ValueKey(c.get(i))).collect();
        let slot = *slots.entry(key).or_insert_with(|| {
            out.push(Vec::new());
            out.len() - 1
        });
        out[slot].push(i);
    }
    Ok(out)
}

/// Build the table holding only the rows at `indices`, optionally
/// forcing some columns to constants. Constant columns of the input stay
/// constant. When `indices` is empty, constants are materialized into
/// empty regular columns so the result genuinely has zero rows.
pub(crate) fn subtable(
    table: &Table,
    indices: &[usize],
    make_const: &[(&str, &Value)],
) -> Result<Table> {
    let mut b = TableBuilder::new();
    b.set_len(indices.len())?;
    'cols: for name in table.columns() {
        for (cname, cval) in make_const {
            if name == cname {
                b.add_const(name, (*cval).clone());
                continue 'cols;
            }
        }
        match table.const_value(name) {
            Some(v) if !indices.is_empty() => {
                b.add_const(name, v.clone());
            }
            Some(v) => {
                b.add(name, ColumnBuilder::new(v.value_type()).finish())?;
            }
            None => {
                b.add(name, table.must_column(name)?.gather(indices))?;
            }
        }
    }
    Ok(b.done())
}

/// Concatenate tables row-wise in order. `names` gives the output column
/// order; every table must have exactly those columns. A column stays
/// constant only when it is constant with one shared value across every
/// input.
pub(crate) fn concat_tables(names: &[String], tables: &[&Table]) -> Result<Table> {
    let mut b = TableBuilder::new();
    b.set_len(tables.iter().map(|t| t.len()).sum())?;
    for name in names {
        let mut shared: Option<&Value> = None;
        let mut all_const = true;
        for t in tables {
            match (t.const_value(name), shared) {
                (Some(v), None) => shared = Some(v),
                (Some(v), Some(prev)) if ValueKey(v.clone()) == ValueKey(prev.clone()) => {}
                _ => {
                    all_const = false;
                    break;
                }
            }
        }
        if all_const {
            if let Some(v) = shared {
                b.add_const(name, v.clone());
                continue;
            }
        }
        let first = tables
            .first()
            .ok_or_else(|| TableError::UnknownColumn(name.clone()))?;
        let ty = first
            .col_type(name)
            .ok_or_else(|| TableError::UnknownColumn(name.clone()))?;
        let mut cb = ColumnBuilder::new(ty);
        for t in tables {
            cb.extend_from(t.must_column(name)?)?;
        }
        b.add(name, cb.finish())?;
    }
    Ok(b.done())
}

/// Subdivide every group so that, within each resulting subgroup, every
/// row holds one value in each of `cols`. Columns are processed left to
/// right; each grouped column becomes a constant of its subgroup. Row
/// order within subgroups is preserved.
pub fn group_by(g: &Grouping, cols: &[&str]) -> Result<Grouping> {
    if g.is_empty() || cols.is_empty() {
        return Ok(g.clone());
    }
    let col = cols[0];
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        if let Some(v) = table.const_value(col) {
            // already uniform, just relabel
            b.add(gid.extend(&v.to_string()), table)?;
            continue;
        }
        for (value, indices) in partition(table, col)? {
            let sub = subtable(table, &indices, &[(col, &value)])?;
            b.add(gid.extend(&value.to_string()), &sub)?;
        }
    }
    group_by(&b.done(), &cols[1..])
}

/// Merge run-adjacent groups that share a parent identity, concatenating
/// their rows in appearance order. The inverse of one level of
/// [`group_by`].
pub fn ungroup(g: &Grouping) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    let names: Vec<String> = g.columns();
    // collect runs per parent; a parent reappearing later merges into
    // its earlier run
    let mut order: Vec<GroupId> = Vec::new();
    let mut runs: HashMap<GroupId, Vec<&Table>> = HashMap::new();
    for (gid, table) in g.iter() {
        let parent = gid.parent();
        match runs.get_mut(&parent) {
            Some(tables) => tables.push(table),
            None => {
                order.push(parent.clone());
                runs.insert(parent, vec![table]);
            }
        }
    }
    let mut b = GroupingBuilder::new();
    for parent in order {
        let tables = &runs[&parent];
        let merged = concat_tables(&names, tables)?;
        b.add(parent, &merged)?;
    }
    Ok(b.done())
}

/// Repeatedly ungroup until a single table remains. An empty grouping
/// flattens to the canonical empty table.
pub fn flatten(g: &Grouping) -> Result<Table> {
    let mut g = g.clone();
    while g.len() > 1 {
        g = ungroup(&g)?;
    }
    let first = g.iter().next().map(|(_, table)| table.clone());
    Ok(first.unwrap_or_default())
}
