//! Hierarchical group identity.
//!
//! A `GroupId` is an identity, not a name: two ids produced by separate
//! `extend` calls are distinct even when their labels are equal. Labels
//! and the slash-joined path rendering are diagnostic only and never
//! participate in equality.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Identity of one group of rows within a grouping hierarchy.
#[derive(Debug, Clone)]
pub struct GroupId(Arc<Node>);

#[derive(Debug)]
struct Node {
    parent: Option<GroupId>,
    label: Arc<str>,
}

static ROOT: OnceLock<GroupId> = OnceLock::new();

impl GroupId {
    /// The distinguished root group. It is its own parent.
    pub fn root() -> GroupId {
        ROOT.get_or_init(|| {
            GroupId(Arc::new(Node {
                parent: None,
                label: Arc::from(""),
            }))
        })
        .clone()
    }

    /// Create a new child identity under `self`. Every call allocates a
    /// distinct identity, regardless of the label.
    pub fn extend(&self, label: &str) -> GroupId {
        GroupId(Arc::new(Node {
            parent: Some(self.clone()),
            label: Arc::from(label),
        }))
    }

    /// The parent group. The root is its own parent.
    pub fn parent(&self) -> GroupId {
        match &self.0.parent {
            Some(p) => p.clone(),
            None => self.clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// The label this id was created with.
    pub fn label(&self) -> &str {
        &self.0.label
    }
}

impl PartialEq for GroupId {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for GroupId {}

impl Hash for GroupId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        let mut labels = Vec::new();
        let mut cur = self.clone();
        while !cur.is_root() {
            labels.push(cur.0.label.clone());
            cur = cur.parent();
        }
        for label in labels.iter().rev() {
            write!(f, "/{}", label)?;
        }
        Ok(())
    }
}
