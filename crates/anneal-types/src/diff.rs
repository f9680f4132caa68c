//! Cluster-state drift entries
//!
//! A diff set describes how live cluster state diverged from the manifests
//! the release rendered. Entries are produced by an external comparer; the
//! reconciler only carries and summarizes them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of divergence observed for one resource path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Resource is missing and would be created
    Create,

    /// Resource exists but differs from the rendered manifest
    Update,

    /// Resource exists in the cluster but not in the rendered manifests
    Delete,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Create => write!(f, "create"),
            DiffKind::Update => write!(f, "update"),
            DiffKind::Delete => write!(f, "delete"),
        }
    }
}

/// One observed divergence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffEntry {
    /// Kind of divergence
    pub kind: DiffKind,

    /// Resource path, e.g. `apps/v1/Deployment/default/podinfo`
    pub path: String,

    /// Optional rendered detail of the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DiffEntry {
    pub fn new(kind: DiffKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            detail: None,
        }
    }
}

/// Set of observed divergences for a release
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffSet(Vec<DiffEntry>);

impl DiffSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Number of entries of the given kind
    pub fn count(&self, kind: DiffKind) -> usize {
        self.0.iter().filter(|e| e.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiffEntry> {
        self.0.iter()
    }
}

impl From<Vec<DiffEntry>> for DiffSet {
    fn from(entries: Vec<DiffEntry>) -> Self {
        Self(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_by_kind() {
        let diff = DiffSet::from(vec![
            DiffEntry::new(DiffKind::Create, "v1/ConfigMap/default/a"),
            DiffEntry::new(DiffKind::Update, "apps/v1/Deployment/default/b"),
            DiffEntry::new(DiffKind::Update, "v1/Service/default/c"),
        ]);

        assert_eq!(diff.len(), 3);
        assert_eq!(diff.count(DiffKind::Create), 1);
        assert_eq!(diff.count(DiffKind::Update), 2);
        assert_eq!(diff.count(DiffKind::Delete), 0);
    }
}
