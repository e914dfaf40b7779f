//! Groupings: ordered collections of tables keyed by group identity.
//!
//! Every table in a grouping carries the same schema (same column names,
//! in the same order, with the same element types). The grouping is the
//! unit every transform consumes and produces.

use gtable_types::error::{Result, TableError};
use gtable_types::value::ValueType;

use crate::groupid::GroupId;
use crate::table::Table;

/// An ordered, schema-uniform collection of tables keyed by [`GroupId`].
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    groups: Vec<(GroupId, Table)>,
    schema: Vec<(String, ValueType)>,
}

impl Grouping {
    /// The empty grouping: zero groups, no schema.
    pub fn new() -> Grouping {
        Grouping::default()
    }

    /// Wrap a single table as a one-group grouping at the root identity.
    /// An empty table yields the empty grouping.
    pub fn from_table(table: &Table) -> Grouping {
        if table.is_empty() {
            return Grouping::new();
        }
        Grouping {
            schema: table.schema(),
            groups: vec![(GroupId::root(), table.clone())],
        }
    }

    /// Ordered column names shared by every table.
    pub fn columns(&self) -> Vec<String> {
        self.schema.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Shared (name, element type) pairs, in column order.
    pub fn schema(&self) -> &[(String, ValueType)] {
        &self.schema
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group identities, in grouping order.
    pub fn tables(&self) -> Vec<GroupId> {
        self.groups.iter().map(|(gid, _)| gid.clone()).collect()
    }

    /// Look up the table of one group.
    pub fn table(&self, gid: &GroupId) -> Option<&Table> {
        self.groups
            .iter()
            .find(|(g, _)| g == gid)
            .map(|(_, t)| t)
    }

    /// Iterate over (identity, table) pairs in grouping order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupId, &Table)> {
        self.groups.iter().map(|(g, t)| (g, t))
    }
}

/// The element type of a column across a grouping.
pub fn col_type(g: &Grouping, name: &str) -> Result<ValueType> {
    g.schema
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, t)| *t)
        .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
}

/// Mutable staging object that accumulates groups and freezes into a
/// [`Grouping`]. Like `TableBuilder`, it is single-use: `done()` resets
/// the builder to empty.
#[derive(Debug, Default)]
pub struct GroupingBuilder {
    groups: Vec<(GroupId, Table)>,
    schema: Vec<(String, ValueType)>,
}

impl GroupingBuilder {
    pub fn new() -> GroupingBuilder {
        GroupingBuilder::default()
    }

    /// Start from an existing grouping, sharing every table.
    pub fn from_grouping(g: &Grouping) -> GroupingBuilder {
        GroupingBuilder {
            groups: g.groups.clone(),
            schema: g.schema.clone(),
        }
    }

    /// Install or replace the table of one group. Empty tables are
    /// ignored. The first table fixes the schema; later tables must
    /// match it exactly (names, order and element types). The schema may
    /// only change while the builder holds at most one group, and a
    /// schema-changing add must replace that group.
    pub fn add(&mut self, gid: GroupId, table: &Table) -> Result<&mut Self> {
        if table.is_empty() {
            return Ok(self);
        }
        let schema = table.schema();
        if schema != self.schema {
            let redefines_sole_group = self.groups.len() == 1 && self.groups[0].0 == gid;
            if !self.groups.is_empty() && !redefines_sole_group {
                return Err(TableError::SchemaMismatch(format!(
                    "group {} has columns [{}], grouping has [{}]",
                    gid,
                    join_names(&schema),
                    join_names(&self.schema)
                )));
            }
            self.schema = schema;
        }
        match self.groups.iter_mut().find(|(g, _)| *g == gid) {
            Some(slot) => slot.1 = table.clone(),
            None => self.groups.push((gid, table.clone())),
        }
        Ok(self)
    }

    /// Remove one group. Unknown identities are ignored.
    pub fn remove(&mut self, gid: &GroupId) -> &mut Self {
        self.groups.retain(|(g, _)| g != gid);
        self
    }

    pub fn has(&self, gid: &GroupId) -> bool {
        self.groups.iter().any(|(g, _)| g == gid)
    }

    /// Freeze the accumulated groups and reset the builder.
    pub fn done(&mut self) -> Grouping {
        let b = std::mem::take(self);
        if b.groups.is_empty() {
            return Grouping::new();
        }
        Grouping {
            groups: b.groups,
            schema: b.schema,
        }
    }
}

fn join_names(schema: &[(String, ValueType)]) -> String {
    schema
        .iter()
        .map(|(n, _)| n.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
