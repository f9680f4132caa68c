//! Diff rendering seam
//!
//! Human-readable rendering of drift diffs is delegated to a summarizer so
//! richer renderers can be plugged in without touching the selector.

use anneal_types::{DiffKind, DiffSet};

/// Renders a diff set for event bodies and logs
pub trait DiffSummarizer: Send + Sync {
    /// One line per entry, suitable for an event body
    fn summarize(&self, diff: &DiffSet) -> String;

    /// Single-line counts, suitable for a log message
    fn summarize_brief(&self, diff: &DiffSet) -> String;
}

/// Plain-text summarizer
#[derive(Debug, Default)]
pub struct PlainDiffSummarizer;

impl DiffSummarizer for PlainDiffSummarizer {
    fn summarize(&self, diff: &DiffSet) -> String {
        diff.iter()
            .map(|entry| match &entry.detail {
                Some(detail) => format!("{} {}: {}", entry.kind, entry.path, detail),
                None => format!("{} {}", entry.kind, entry.path),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn summarize_brief(&self, diff: &DiffSet) -> String {
        format!(
            "{} change(s): {} create, {} update, {} delete",
            diff.len(),
            diff.count(DiffKind::Create),
            diff.count(DiffKind::Update),
            diff.count(DiffKind::Delete),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anneal_types::DiffEntry;

    fn diff() -> DiffSet {
        DiffSet::from(vec![
            DiffEntry::new(DiffKind::Create, "v1/ConfigMap/default/a"),
            DiffEntry {
                kind: DiffKind::Update,
                path: "apps/v1/Deployment/default/b".into(),
                detail: Some("replicas 2 -> 3".into()),
            },
        ])
    }

    #[test]
    fn test_summarize_lists_entries() {
        let rendered = PlainDiffSummarizer.summarize(&diff());
        assert_eq!(
            rendered,
            "create v1/ConfigMap/default/a\nupdate apps/v1/Deployment/default/b: replicas 2 -> 3"
        );
    }

    #[test]
    fn test_summarize_brief_counts() {
        let rendered = PlainDiffSummarizer.summarize_brief(&diff());
        assert_eq!(rendered, "2 change(s): 1 create, 1 update, 0 delete");
    }
}
