//! Union of groupings by group identity.

use gtable_types::error::{Result, TableError};

use crate::groupid::GroupId;
use crate::grouping::{Grouping, GroupingBuilder};
use crate::table::Table;
use crate::transforms::groupby::concat_tables;

/// Union groups across `inputs` by [`GroupId`]: for each identity
/// appearing anywhere, concatenate the rows of the matching tables in
/// input order. All non-empty inputs must expose the same set of column
/// names (order-independent) with matching element types. The first
/// non-empty input's column order wins.
pub fn concat(inputs: &[&Grouping]) -> Result<Grouping> {
    let mut nonempty: Vec<&Grouping> = Vec::new();
    for &g in inputs {
        if !g.is_empty() {
            nonempty.push(g);
        }
    }
    let reference = match nonempty.first() {
        Some(g) => *g,
        None => return Ok(Grouping::new()),
    };
    let names: Vec<String> = reference.columns();
    for g in &nonempty[1..] {
        check_same_columns(reference, g)?;
    }

    // identities in first-appearance order across inputs
    let mut order: Vec<GroupId> = Vec::new();
    for g in &nonempty {
        for (gid, _) in g.iter() {
            if !order.contains(gid) {
                order.push(gid.clone());
            }
        }
    }

    let mut b = GroupingBuilder::new();
    for gid in order {
        let tables: Vec<&Table> = nonempty.iter().filter_map(|g| g.table(&gid)).collect();
        if tables.len() == 1 && same_order(&names, tables[0]) {
            b.add(gid, tables[0])?;
            continue;
        }
        let merged = concat_tables(&names, &tables)?;
        b.add(gid, &merged)?;
    }
    Ok(b.done())
}

fn same_order(names: &[String], table: &Table) -> bool {
    table.columns() == names
}

fn check_same_columns(reference: &Grouping, other: &Grouping) -> Result<()> {
    let a = reference.schema();
    let b = other.schema();
    let same = a.len() == b.len()
        && a.iter()
            .all(|(name, ty)| b.iter().any(|(n, t)| n == name && t == ty));
    if !same {
        return Err(TableError::SchemaMismatch(format!(
            "cannot concatenate groupings with columns [{}] and [{}]",
            reference.columns().join(", "),
            other.columns().join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::table::TableBuilder;
    use crate::transforms::groupby::group_by;
    use gtable_types::value::Value;

    fn keyed(keys: Vec<i64>, vals: Vec<f64>) -> Grouping {
        let mut b = TableBuilder::new();
        b.add("k", keys.into()).unwrap();
        b.add("v", vals.into()).unwrap();
        Grouping::from_table(&b.done())
    }

    #[test]
    fn test_concat_single_tables_at_root() {
        let g1 = keyed(vec![1], vec![1.0]);
        let g2 = keyed(vec![2, 3], vec![2.0, 3.0]);
        let out = concat(&[&g1, &g2]).unwrap();
        assert_eq!(out.len(), 1);
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.len(), 3);
        match t.must_column("k").unwrap() {
            Column::Int(v) => assert_eq!(&v[..], &[1, 2, 3]),
            other => panic!("Expected Int, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_column_order_independent() {
        let mut b = TableBuilder::new();
        b.add("v", vec![9.0].into()).unwrap();
        b.add("k", vec![9i64].into()).unwrap();
        let swapped = Grouping::from_table(&b.done());
        let out = concat(&[&keyed(vec![1], vec![1.0]), &swapped]).unwrap();
        assert_eq!(out.columns(), vec!["k".to_string(), "v".to_string()]);
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.must_column("k").unwrap().get(1), Value::Int(9));
    }

    #[test]
    fn test_concat_schema_mismatch() {
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64].into()).unwrap();
        b.add("w", vec![1.0].into()).unwrap();
        let other = Grouping::from_table(&b.done());
        assert!(matches!(
            concat(&[&keyed(vec![1], vec![1.0]), &other]),
            Err(TableError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_concat_unions_disjoint_groups() {
        let g1 = group_by(&keyed(vec![1, 2], vec![1.0, 2.0]), &["k"]).unwrap();
        let g2 = group_by(&keyed(vec![3], vec![3.0]), &["k"]).unwrap();
        let out = concat(&[&g1, &g2]).unwrap();
        assert_eq!(out.len(), 3);
        // groups missing from one input pass through unchanged
        let gids = out.tables();
        assert_eq!(out.table(&gids[2]).unwrap().const_value("k"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_concat_empty_inputs() {
        let empty = Grouping::new();
        assert!(concat(&[&empty, &empty]).unwrap().is_empty());
        let g = keyed(vec![1], vec![1.0]);
        assert_eq!(concat(&[&empty, &g]).unwrap().len(), 1);
    }
}
