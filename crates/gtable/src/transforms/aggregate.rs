//! Grouped reduction: one output row per distinct key tuple.

use std::cmp::Ordering;

use gtable_types::error::{Result, TableError};
use gtable_types::value::{Value, ValueKey};

use crate::column::ColumnBuilder;
use crate::grouping::{Grouping, GroupingBuilder};
use crate::table::{Table, TableBuilder};
use crate::transforms::groupby::{partition_multi, subtable};

/// A per-subgroup reducer. `columns` names the output columns it
/// produces; `reduce` maps one subgroup's table to one value per output
/// column.
pub trait Aggregator {
    fn columns(&self) -> Vec<String>;
    fn reduce(&self, sub: &Table) -> Result<Vec<Value>>;
}

struct Count {
    name: String,
}

impl Aggregator for Count {
    fn columns(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn reduce(&self, sub: &Table) -> Result<Vec<Value>> {
        Ok(vec![Value::Int(sub.len() as i64)])
    }
}

/// Count the rows of each subgroup into a column called `name`.
pub fn agg_count(name: &str) -> Box<dyn Aggregator> {
    Box::new(Count {
        name: name.to_string(),
    })
}

struct Sum {
    col: String,
}

impl Aggregator for Sum {
    fn columns(&self) -> Vec<String> {
        vec![format!("sum {}", self.col)]
    }

    fn reduce(&self, sub: &Table) -> Result<Vec<Value>> {
        use crate::column::Column;
        let v = match sub.must_column(&self.col)? {
            Column::Int(v) => Value::Int(v.iter().sum()),
            Column::Float(v) => Value::Float(v.iter().sum()),
            other => {
                return Err(TableError::TypeMismatch(format!(
                    "cannot sum a {} column",
                    other.value_type()
                )))
            }
        };
        Ok(vec![v])
    }
}

/// Sum a numeric column, preserving its element type.
pub fn agg_sum(col: &str) -> Box<dyn Aggregator> {
    Box::new(Sum {
        col: col.to_string(),
    })
}

struct Numeric {
    prefix: String,
    col: String,
    reduce: fn(&[f64]) -> f64,
}

impl Aggregator for Numeric {
    fn columns(&self) -> Vec<String> {
        vec![format!("{} {}", self.prefix, self.col)]
    }

    fn reduce(&self, sub: &Table) -> Result<Vec<Value>> {
        let data = sub.must_column(&self.col)?;
        let ty = data.value_type();
        let mut xs = Vec::with_capacity(data.len());
        for i in 0..data.len() {
            xs.push(data.get(i).to_f64()?);
        }
        Ok(vec![Value::from_f64(ty, (self.reduce)(&xs))?])
    }
}

/// Arithmetic mean of a numeric column.
pub fn agg_mean(col: &str) -> Box<dyn Aggregator> {
    Box::new(Numeric {
        prefix: "mean".to_string(),
        col: col.to_string(),
        reduce: |xs| xs.iter().sum::<f64>() / xs.len() as f64,
    })
}

/// Geometric mean of a numeric column.
pub fn agg_geomean(col: &str) -> Box<dyn Aggregator> {
    Box::new(Numeric {
        prefix: "geomean".to_string(),
        col: col.to_string(),
        reduce: |xs| (xs.iter().map(|x| x.ln()).sum::<f64>() / xs.len() as f64).exp(),
    })
}

struct Extremum {
    prefix: String,
    col: String,
    keep: Ordering,
}

impl Aggregator for Extremum {
    fn columns(&self) -> Vec<String> {
        vec![format!("{} {}", self.prefix, self.col)]
    }

    fn reduce(&self, sub: &Table) -> Result<Vec<Value>> {
        let data = sub.must_column(&self.col)?;
        let mut best = data.get(0);
        for i in 1..data.len() {
            let v = data.get(i);
            match v.try_cmp(&best) {
                Some(ord) if ord == self.keep => best = v,
                Some(_) => {}
                None => {
                    return Err(TableError::NotOrderable(
                        self.col.clone(),
                        "values do not have a defined order".to_string(),
                    ))
                }
            }
        }
        Ok(vec![best])
    }
}

/// Minimum of an orderable column.
pub fn agg_min(col: &str) -> Box<dyn Aggregator> {
    Box::new(Extremum {
        prefix: "min".to_string(),
        col: col.to_string(),
        keep: Ordering::Less,
    })
}

/// Maximum of an orderable column.
pub fn agg_max(col: &str) -> Box<dyn Aggregator> {
    Box::new(Extremum {
        prefix: "max".to_string(),
        col: col.to_string(),
        keep: Ordering::Greater,
    })
}

struct Quantile {
    prefix: String,
    q: f64,
    col: String,
}

impl Aggregator for Quantile {
    fn columns(&self) -> Vec<String> {
        vec![format!("{} {}", self.prefix, self.col)]
    }

    fn reduce(&self, sub: &Table) -> Result<Vec<Value>> {
        let data = sub.must_column(&self.col)?;
        let ty = data.value_type();
        let mut xs = Vec::with_capacity(data.len());
        for i in 0..data.len() {
            xs.push(data.get(i).to_f64()?);
        }
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let idx = (((xs.len() - 1) as f64 * self.q).round() as usize).min(xs.len() - 1);
        Ok(vec![Value::from_f64(ty, xs[idx])?])
    }
}

/// Nearest-rank quantile of a numeric column, named "`prefix` `col`".
pub fn agg_quantile(prefix: &str, q: f64, col: &str) -> Box<dyn Aggregator> {
    Box::new(Quantile {
        prefix: prefix.to_string(),
        q,
        col: col.to_string(),
    })
}

struct Unique {
    col: String,
}

impl Aggregator for Unique {
    fn columns(&self) -> Vec<String> {
        vec![self.col.clone()]
    }

    fn reduce(&self, sub: &Table) -> Result<Vec<Value>> {
        let data = sub.must_column(&self.col)?;
        let first = data.get(0);
        for i in 1..data.len() {
            if ValueKey(data.get(i)) != ValueKey(first.clone()) {
                return Err(TableError::NonUniqueValue(self.col.clone()));
            }
        }
        Ok(vec![first])
    }
}

/// Carry a column through aggregation, requiring it to hold one value
/// per subgroup.
pub fn agg_unique(col: &str) -> Box<dyn Aggregator> {
    Box::new(Unique {
        col: col.to_string(),
    })
}

/// Group each table by the tuple of `xs` and reduce every subgroup to
/// one output row: the key columns, then input columns observed to be
/// uniform within every subgroup of every table, then one column per
/// aggregator output. Tables with no rows are dropped.
pub fn aggregate(
    g: &Grouping,
    xs: &[&str],
    aggs: &[Box<dyn Aggregator>],
) -> Result<Grouping> {
    if g.is_empty() {
        return Ok(g.clone());
    }
    let agg_names: Vec<String> = aggs.iter().flat_map(|a| a.columns()).collect();

    // first pass: subgroups per table, and promotion eligibility for
    // every non-key, non-output column across the whole grouping
    let mut all_groups: Vec<Vec<Vec<usize>>> = Vec::new();
    let carried_candidates: Vec<String> = g
        .columns()
        .into_iter()
        .filter(|n| !xs.contains(&n.as_str()) && !agg_names.contains(n))
        .collect();
    let mut carried: Vec<bool> = vec![true; carried_candidates.len()];
    for (_, table) in g.iter() {
        let groups = partition_multi(table, xs)?;
        for (slot, name) in carried_candidates.iter().enumerate() {
            if !carried[slot] || table.const_value(name).is_some() {
                continue;
            }
            let col = table.must_column(name)?;
            for rows in &groups {
                let first = ValueKey(col.get(rows[0]));
                if rows.iter().any(|&i| ValueKey(col.get(i)) != first) {
                    carried[slot] = false;
                    break;
                }
            }
        }
        all_groups.push(groups);
    }
    let carried: Vec<&String> = carried_candidates
        .iter()
        .zip(&carried)
        .filter_map(|(n, &keep)| if keep { Some(n) } else { None })
        .collect();

    let mut b = GroupingBuilder::new();
    for ((gid, table), groups) in g.iter().zip(&all_groups) {
        if groups.is_empty() {
            continue;
        }
        let reduced = aggregate_table(table, xs, &carried, aggs, groups)?;
        b.add(gid.clone(), &reduced)?;
    }
    Ok(b.done())
}

fn aggregate_table(
    table: &Table,
    xs: &[&str],
    carried: &[&String],
    aggs: &[Box<dyn Aggregator>],
    groups: &[Vec<usize>],
) -> Result<Table> {
    let mut b = TableBuilder::new();
    b.set_len(groups.len())?;

    for &x in xs {
        match table.const_value(x) {
            Some(v) => {
                b.add_const(x, v.clone());
            }
            None => {
                let col = table.must_column(x)?;
                let mut cb = ColumnBuilder::new(col.value_type());
                for rows in groups {
                    cb.push(&col.get(rows[0]))?;
                }
                b.add(x, cb.finish())?;
            }
        }
    }

    for &name in carried {
        match table.const_value(name) {
            Some(v) => {
                b.add_const(name, v.clone());
            }
            None => {
                let col = table.must_column(name)?;
                let mut cb = ColumnBuilder::new(col.value_type());
                for rows in groups {
                    cb.push(&col.get(rows[0]))?;
                }
                b.add(name, cb.finish())?;
            }
        }
    }

    for agg in aggs {
        let names = agg.columns();
        let mut builders: Vec<Option<ColumnBuilder>> = (0..names.len()).map(|_| None).collect();
        for rows in groups {
            let sub = subtable(table, rows, &[])?;
            let values = agg.reduce(&sub)?;
            if values.len() != names.len() {
                return Err(TableError::LengthMismatch(format!(
                    "aggregator produced {} values for {} columns",
                    values.len(),
                    names.len()
                )));
            }
            for (slot, v) in values.iter().enumerate() {
                builders[slot]
                    .get_or_insert_with(|| ColumnBuilder::new(v.value_type()))
                    .push(v)?;
            }
        }
        for (name, cb) in names.iter().zip(builders) {
            if let Some(cb) = cb {
                b.add(name, cb.finish())?;
            }
        }
    }
    Ok(b.done())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::groupid::GroupId;

    fn sample() -> Grouping {
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64, 1, 2].into()).unwrap();
        b.add("c", vec!["x", "x", "y"].into()).unwrap();
        b.add("v", vec![5i64, 7, 3].into()).unwrap();
        Grouping::from_table(&b.done())
    }

    #[test]
    fn test_constant_promotion() {
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64, 1].into()).unwrap();
        b.add("c", vec!["x", "x"].into()).unwrap();
        b.add("v", vec![5i64, 7].into()).unwrap();
        let g = Grouping::from_table(&b.done());

        let out = aggregate(&g, &["k"], &[agg_sum("v")]).unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(
            t.columns(),
            &["k".to_string(), "c".to_string(), "sum v".to_string()]
        );
        assert_eq!(t.must_column("c").unwrap().get(0), Value::from("x"));
        assert_eq!(t.must_column("sum v").unwrap().get(0), Value::Int(12));
    }

    #[test]
    fn test_promotion_requires_uniformity_everywhere() {
        // c is uniform within the k=1 subgroup but not within k=2's
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64, 1, 2, 2].into()).unwrap();
        b.add("c", vec!["x", "x", "y", "z"].into()).unwrap();
        b.add("v", vec![1i64, 2, 3, 4].into()).unwrap();
        let g = Grouping::from_table(&b.done());

        let out = aggregate(&g, &["k"], &[agg_count("n")]).unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.columns(), &["k".to_string(), "n".to_string()]);
    }

    #[test]
    fn test_sum_preserves_type() {
        let out = aggregate(&sample(), &["k"], &[agg_sum("v")]).unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        match t.must_column("sum v").unwrap() {
            Column::Int(v) => assert_eq!(&v[..], &[12, 3]),
            other => panic!("Expected Int, got {:?}", other),
        }
    }

    #[test]
    fn test_mean_rebinds_to_column_type() {
        let out = aggregate(&sample(), &["k"], &[agg_mean("v")]).unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        // int column, mean 6.0 rounds back to int
        match t.must_column("mean v").unwrap() {
            Column::Int(v) => assert_eq!(&v[..], &[6, 3]),
            other => panic!("Expected Int, got {:?}", other),
        }
    }

    #[test]
    fn test_geomean() {
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64, 1].into()).unwrap();
        b.add("v", vec![2.0, 8.0].into()).unwrap();
        let g = Grouping::from_table(&b.done());
        let out = aggregate(&g, &["k"], &[agg_geomean("v")]).unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        match t.must_column("geomean v").unwrap() {
            Column::Float(v) => assert!((v[0] - 4.0).abs() < 1e-12),
            other => panic!("Expected Float, got {:?}", other),
        }
    }

    #[test]
    fn test_min_max_count() {
        let out = aggregate(
            &sample(),
            &["k"],
            &[agg_min("v"), agg_max("v"), agg_count("n")],
        )
        .unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.must_column("min v").unwrap().get(0), Value::Int(5));
        assert_eq!(t.must_column("max v").unwrap().get(0), Value::Int(7));
        assert_eq!(t.must_column("n").unwrap().get(0), Value::Int(2));
        assert_eq!(t.must_column("n").unwrap().get(1), Value::Int(1));
    }

    #[test]
    fn test_quantile() {
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64; 5].into()).unwrap();
        b.add("v", vec![10.0, 30.0, 20.0, 50.0, 40.0].into()).unwrap();
        let g = Grouping::from_table(&b.done());
        let out = aggregate(&g, &["k"], &[agg_quantile("median", 0.5, "v")]).unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.must_column("median v").unwrap().get(0), Value::Float(30.0));
    }

    #[test]
    fn test_unique_rejects_mixed_groups() {
        let err = aggregate(&sample(), &["c"], &[agg_unique("k")]);
        assert!(err.is_ok());
        let bad = aggregate(&sample(), &["k"], &[agg_unique("c")]);
        // k=1 has one c value; regroup so a subgroup holds two
        assert!(bad.is_ok());
        let really_bad = aggregate(&sample(), &[], &[agg_unique("c")]);
        assert!(matches!(really_bad, Err(TableError::NonUniqueValue(_))));
    }

    #[test]
    fn test_count_spans_const_only_subgroups() {
        use crate::transforms::groupby::group_by;

        // after group_by the key is constant, so the subgroups built for
        // reduction hold no regular column at all
        let mut b = TableBuilder::new();
        b.add("k", vec![1i64, 1, 1].into()).unwrap();
        let g = group_by(&Grouping::from_table(&b.done()), &["k"]).unwrap();

        let out = aggregate(&g, &["k"], &[agg_count("n")]).unwrap();
        let gids = out.tables();
        let t = out.table(&gids[0]).unwrap();
        assert_eq!(t.must_column("n").unwrap().get(0), Value::Int(3));
    }

    #[test]
    fn test_aggregate_keeps_const_keys() {
        let mut b = TableBuilder::new();
        b.add_const("k", Value::Int(1));
        b.add("v", vec![1i64, 2].into()).unwrap();
        let g = Grouping::from_table(&b.done());
        let out = aggregate(&g, &["k"], &[agg_sum("v")]).unwrap();
        let t = out.table(&GroupId::root()).unwrap();
        assert_eq!(t.const_value("k"), Some(&Value::Int(1)));
        assert_eq!(t.len(), 1);
    }
}
