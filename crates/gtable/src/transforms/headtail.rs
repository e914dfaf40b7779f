//! Truncation of rows and of groups.

use gtable_types::error::Result;

use crate::grouping::{Grouping, GroupingBuilder};
use crate::transforms::groupby::subtable;

/// Keep the first `n` rows of each table. Tables with `n` rows or fewer
/// pass through unchanged.
pub fn head(g: &Grouping, n: usize) -> Result<Grouping> {
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        if table.len() <= n {
            b.add(gid.clone(), table)?;
        } else {
            let indices: Vec<usize> = (0..n).collect();
            b.add(gid.clone(), &subtable(table, &indices, &[])?)?;
        }
    }
    Ok(b.done())
}

/// Keep the last `n` rows of each table.
pub fn tail(g: &Grouping, n: usize) -> Result<Grouping> {
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter() {
        if table.len() <= n {
            b.add(gid.clone(), table)?;
        } else {
            let indices: Vec<usize> = (table.len() - n..table.len()).collect();
            b.add(gid.clone(), &subtable(table, &indices, &[])?)?;
        }
    }
    Ok(b.done())
}

/// Keep the first `n` groups, in appearance order.
pub fn head_tables(g: &Grouping, n: usize) -> Result<Grouping> {
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter().take(n) {
        b.add(gid.clone(), table)?;
    }
    Ok(b.done())
}

/// Keep the last `n` groups, in appearance order.
pub fn tail_tables(g: &Grouping, n: usize) -> Result<Grouping> {
    let skip = g.len().saturating_sub(n);
    let mut b = GroupingBuilder::new();
    for (gid, table) in g.iter().skip(skip) {
        b.add(gid.clone(), table)?;
    }
    Ok(b.done())
}
