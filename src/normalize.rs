//! Task normalization.
//!
//! Turns the parsed hierarchy into flat, board-ready tasks. Each task's title
//! becomes the separator-joined chain of its ancestors' titles. With grouping
//! enabled, root tasks become labels instead of cards and are dropped from the
//! title chain of their descendants.

use serde::Serialize;

use crate::checklist::{Checklist, Status, TaskId};

pub const DEFAULT_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub group_by_top_level: bool,
    pub separator: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            group_by_top_level: false,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// A task ready to be matched against remote cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncTask {
    pub id: TaskId,
    pub title: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Normalized {
    /// Grouping label titles, first occurrence order, no duplicates.
    pub labels: Vec<String>,
    /// Content tasks in source order.
    pub tasks: Vec<SyncTask>,
}

pub fn normalize(checklist: &Checklist, options: &NormalizeOptions) -> Normalized {
    let mut normalized = Normalized::default();

    for (id, task) in checklist.iter() {
        if options.group_by_top_level && task.parent.is_none() {
            if !normalized.labels.contains(&task.title) {
                normalized.labels.push(task.title.clone());
            }
            continue;
        }

        let chain = checklist.title_chain(id);
        let (title, label) = if options.group_by_top_level {
            (
                chain[1..].join(options.separator.as_str()),
                checklist
                    .root(id)
                    .and_then(|root| checklist.get(root))
                    .map(|root| root.title.clone()),
            )
        } else {
            (chain.join(options.separator.as_str()), None)
        };

        normalized.tasks.push(SyncTask {
            id,
            title,
            status: task.status,
            label,
        });
    }

    normalized
}
