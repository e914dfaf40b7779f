//! Per-group inner equi-join.

use std::collections::HashMap;

use gtable_types::error::{Result, TableError};
use gtable_types::value::ValueKey;

use crate::column::ColumnBuilder;
use crate::grouping::{Grouping, GroupingBuilder};
use crate::table::{Table, TableBuilder};

/// Equi-join performed independently within each group identity present
/// in both inputs; groups absent from `g2` are dropped. Within a group,
/// `col2` of the right table is indexed and every row of the left table
/// probes it, emitting one output row per match. Duplicates on both
/// sides fan out. Output columns: all of `t1`'s, then `t2`'s except
/// `col2` when the key names coincide; any other name collision is a
/// schema error.
pub fn join(g1: &Grouping, col1: &str, g2: &Grouping, col2: &str) -> Result<Grouping> {
    if g1.is_empty() || g2.is_empty() {
        return Ok(Grouping::new());
    }
    let t1 = crate::grouping::col_type(g1, col1)?;
    let t2 = crate::grouping::col_type(g2, col2)?;
    if t1 != t2 {
        return Err(TableError::SchemaMismatch(format!(
            "join keys disagree: {} is {}, {} is {}",
            col1, t1, col2, t2
        )));
    }
    for name in g2.columns() {
        let dropped = name == col2 && col1 == col2;
        if !dropped && g1.columns().contains(&name) {
            return Err(TableError::SchemaMismatch(format!(
                "column {} appears on both sides of the join",
                name
            )));
        }
    }

    let mut b = GroupingBuilder::new();
    for (gid, left) in g1.iter() {
        let right = match g2.table(gid) {
            Some(t) => t,
            None => continue,
        };
        let joined = join_tables(left, col1, right, col2)?;
        b.add(gid.clone(), &joined)?;
    }
    Ok(b.done())
}

fn join_tables(left: &Table, col1: &str, right: &Table, col2: &str) -> Result<Table> {
    let lkey = left.must_column(col1)?;
    let rkey = right.must_column(col2)?;

    let mut index: HashMap<ValueKey, Vec<usize>> = HashMap::new();
    for j in 0..rkey.len() {
        index.entry(ValueKey(rkey.get(j))).or_default().push(j);
    }

    let mut lrows: Vec<usize> = Vec::new();
    let mut rrows: Vec<usize> = Vec::new();
    for i in 0..lkey.len() {
        if let Some(matches) = index.get(&ValueKey(lkey.get(i))) {
            for &j in matches {
                lrows.push(i);
                rrows.push(j);
            }
        }
    }

    let mut b = TableBuilder::new();
    b.set_len(lrows.len())?;
    for name in left.columns() {
        match left.const_value(name) {
            Some(v) if !lrows.is_empty() => {
                b.add_const(name, v.clone());
            }
            Some(v) => {
                b.add(name, ColumnBuilder::new(v.value_type()).finish())?;
            }
            None => {
                b.add(name, left.must_column(name)?.gather(&lrows))?;
            }
        }
    }
    for name in right.columns() {
        if name == col2 && col1 == col2 {
            continue;
        }
        match right.const_value(name) {
            Some(v) if !rrows.is_empty() => {
                b.add_const(name, v.clone());
            }
            Some(v) => {
                b.add(name, ColumnBuilder::new(v.value_type()).finish())?;
            }
            None => {
                b.add(name, right.must_column(name)?.gather(&rrows))?;
            }
        }
    }
    Ok(b.done())
}
