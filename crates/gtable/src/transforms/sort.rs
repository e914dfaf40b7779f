//! Stable multi-column sorting.

use std::cmp::Ordering;

use gtable_types::error::{Result, TableError};

use crate::column::Column;
use crate::grouping::{Grouping, GroupingBuilder};
use crate::table::Table;
use crate::transforms::groupby::subtable;

/// Sort each group's rows by the tuple of named columns, left to right,
/// with a stable sort. Constant columns never affect the order. Float
/// keys containing NaN are rejected, since NaN has no place in a total
/// order.
pub fn sort_by(g: &Grouping, cols: &[&str]) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        b.add(gid.clone(), &sort_table(table, cols)?)?;
    }
    Ok(b.done())
}

fn sort_table(table: &Table, cols: &[&str]) -> Result<Table> {
    let mut keys: Vec<&Column> = Vec::new();
    for &c in cols {
        if table.const_value(c).is_some() {
            continue;
        }
        let col = table.must_column(c)?;
        if let Column::Float(v) = col {
            if v.iter().any(|x| x.is_nan()) {
                return Err(TableError::NotOrderable(
                    c.to_string(),
                    "column contains NaN".to_string(),
                ));
            }
        }
        keys.push(col);
    }
    if keys.is_empty() || already_sorted(table, &keys) {
        return Ok(table.clone());
    }

    let mut indices: Vec<usize> = (0..table.len()).collect();
    indices.sort_by(|&a, &b| compare_rows(&keys, a, b));
    subtable(table, &indices, &[])
}

fn already_sorted(table: &Table, keys: &[&Column]) -> bool {
    (1..table.len()).all(|i| compare_rows(keys, i - 1, i) != Ordering::Greater)
}

fn compare_rows(keys: &[&Column], a: usize, b: usize) -> Ordering {
    for col in keys {
        // NaN was rejected up front, so same-type comparisons are total
        match col.get(a).try_cmp(&col.get(b)).unwrap_or(Ordering::Equal) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
