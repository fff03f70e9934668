//! Reconciliation of local tasks against remote cards.
//!
//! Everything here is pure: the functions take what was read from the board
//! and return the operations needed to align it with the checklist. Executing
//! those operations is the job of [`crate::apply`].
//!
//! Tasks and cards are joined by exact title. A task whose text changes
//! between runs therefore shows up as a new card, and the card carrying the
//! old title is left on the board untouched. Titles may repeat (grouped
//! checklists strip the group from the title), so each card is claimed by at
//! most one task.

use std::collections::HashSet;

use serde::Serialize;

use crate::board::{RemoteCard, RemoteLabel};
use crate::normalize::SyncTask;
use crate::status::StatusColumns;

/// A label to be created on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Label provisioning split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelPlan {
    /// Local grouping titles already present on the board.
    pub existing: Vec<String>,
    pub to_create: Vec<LabelRequest>,
}

impl LabelPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty()
    }
}

/// Partition grouping titles into present and absent remote labels.
///
/// Absent titles get colours from `palette`, cycling by their position in the
/// absent list. An empty palette yields colourless labels. Remote labels with
/// an empty title never match.
pub fn plan_labels(local: &[String], remote: &[RemoteLabel], palette: &[String]) -> LabelPlan {
    let remote_titles: HashSet<&str> = remote
        .iter()
        .map(|label| label.title.as_str())
        .filter(|title| !title.is_empty())
        .collect();

    let mut plan = LabelPlan::default();
    let mut seen = HashSet::new();
    for title in local {
        if !seen.insert(title.as_str()) {
            continue;
        }
        if remote_titles.contains(title.as_str()) {
            plan.existing.push(title.clone());
        } else {
            let color = match palette.len() {
                0 => None,
                len => Some(palette[plan.to_create.len() % len].clone()),
            };
            plan.to_create.push(LabelRequest {
                title: title.clone(),
                color,
            });
        }
    }
    plan
}

/// A task paired with the card it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardUpdate {
    pub task: SyncTask,
    pub card: RemoteCard,
}

/// Operations needed to align the board with the checklist.
///
/// `move_column` and `add_label` may both contain the same pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub create: Vec<SyncTask>,
    pub move_column: Vec<CardUpdate>,
    pub add_label: Vec<CardUpdate>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.move_column.is_empty() && self.add_label.is_empty()
    }
}

/// Compute create, column and label drift for `tasks` against `cards`.
///
/// A card backs at most one task. Among cards sharing a task's title, one that
/// is already aligned is preferred, otherwise the first unclaimed one is used.
pub fn diff(tasks: &[SyncTask], cards: &[RemoteCard], columns: &StatusColumns) -> SyncPlan {
    let mut claimed = vec![false; cards.len()];
    let mut matches: Vec<Option<usize>> = vec![None; tasks.len()];

    for (slot, task) in matches.iter_mut().zip(tasks) {
        *slot = claim(cards, &mut claimed, |card| {
            card.title == task.title && is_aligned(task, card, columns)
        });
    }
    for (slot, task) in matches.iter_mut().zip(tasks) {
        if slot.is_none() {
            *slot = claim(cards, &mut claimed, |card| card.title == task.title);
        }
    }

    let mut plan = SyncPlan::default();
    for (task, matched) in tasks.iter().zip(matches) {
        let Some(card) = matched.map(|index| &cards[index]) else {
            plan.create.push(task.clone());
            continue;
        };

        if card.column_id != columns.column_for(task.status).id {
            plan.move_column.push(CardUpdate {
                task: task.clone(),
                card: card.clone(),
            });
        }
        if needs_label(task, card) {
            plan.add_label.push(CardUpdate {
                task: task.clone(),
                card: card.clone(),
            });
        }
    }

    plan
}

fn claim(
    cards: &[RemoteCard],
    claimed: &mut [bool],
    accept: impl Fn(&RemoteCard) -> bool,
) -> Option<usize> {
    let index = (0..cards.len()).find(|&index| !claimed[index] && accept(&cards[index]))?;
    claimed[index] = true;
    Some(index)
}

fn needs_label(task: &SyncTask, card: &RemoteCard) -> bool {
    task.label
        .as_deref()
        .is_some_and(|label| !card.has_label(label))
}

fn is_aligned(task: &SyncTask, card: &RemoteCard, columns: &StatusColumns) -> bool {
    card.column_id == columns.column_for(task.status).id && !needs_label(task, card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CardLabel, RemoteColumn};
    use crate::checklist::{Checklist, Status};
    use crate::normalize::{normalize, NormalizeOptions};

    fn columns() -> StatusColumns {
        let column = |id: &str, name: &str| RemoteColumn {
            id: id.to_string(),
            name: name.to_string(),
        };
        StatusColumns::classify(&[
            column("todo", "To Do"),
            column("doing", "In Progress"),
            column("done", "Done"),
        ])
        .expect("columns")
    }

    fn card(id: &str, title: &str, column_id: &str, labels: &[&str]) -> RemoteCard {
        RemoteCard {
            id: id.to_string(),
            title: title.to_string(),
            column_id: column_id.to_string(),
            labels: labels
                .iter()
                .map(|label| CardLabel {
                    id: format!("id-{label}"),
                    title: label.to_string(),
                })
                .collect(),
        }
    }

    fn label(id: &str, title: &str) -> RemoteLabel {
        RemoteLabel {
            id: id.to_string(),
            title: title.to_string(),
            color: None,
        }
    }

    fn tasks(text: &str, group: bool) -> Vec<SyncTask> {
        let options = NormalizeOptions {
            group_by_top_level: group,
            ..NormalizeOptions::default()
        };
        normalize(&Checklist::parse(text), &options).tasks
    }

    #[test]
    fn status_drift_only_moves_column() {
        let local = tasks("[ ] Parent\n  [ ] Child", false);
        let cards = vec![
            card("c0", "Parent", "todo", &[]),
            card("c1", "Parent - Child", "done", &[]),
        ];

        let plan = diff(&local, &cards, &columns());
        assert!(plan.create.is_empty());
        assert!(plan.add_label.is_empty());
        assert_eq!(plan.move_column.len(), 1);
        let update = &plan.move_column[0];
        assert_eq!(update.card.id, "c1");
        assert_eq!(update.task.status, Status::Todo);
        assert_eq!(columns().column_for(update.task.status).id, "todo");
    }

    #[test]
    fn unmatched_tasks_are_created() {
        let local = tasks("[x] Ship\n[~] Review", false);
        let cards = vec![card("c0", "ship", "done", &[])];

        let plan = diff(&local, &cards, &columns());
        let titles: Vec<_> = plan.create.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Ship", "Review"]);
    }

    #[test]
    fn missing_label_and_wrong_column_overlap() {
        let local = tasks("[ ] Area\n  [x] Task", true);
        let cards = vec![card("c0", "Task", "todo", &["Other"])];

        let plan = diff(&local, &cards, &columns());
        assert!(plan.create.is_empty());
        assert_eq!(plan.move_column.len(), 1);
        assert_eq!(plan.add_label.len(), 1);
        assert_eq!(plan.move_column[0].card.id, plan.add_label[0].card.id);
    }

    #[test]
    fn aligned_board_yields_empty_plan() {
        let local = tasks("[ ] Area\n  [~] Task", true);
        let cards = vec![card("c0", "Task", "doing", &["Area"])];

        let plan = diff(&local, &cards, &columns());
        assert!(plan.is_empty());
    }

    #[test]
    fn repeated_titles_claim_distinct_cards() {
        let local = tasks("[ ] A\n  [ ] Fix\n[ ] B\n  [x] Fix", true);
        let forward = vec![
            card("c0", "Fix", "todo", &["A"]),
            card("c1", "Fix", "done", &["B"]),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        assert!(diff(&local, &forward, &columns()).is_empty());
        assert!(diff(&local, &reversed, &columns()).is_empty());
    }

    #[test]
    fn repeated_title_without_second_card_creates_one() {
        let local = tasks("[ ] A\n  [ ] Fix\n[ ] B\n  [x] Fix", true);
        let cards = vec![card("c0", "Fix", "done", &["B"])];

        let plan = diff(&local, &cards, &columns());
        assert!(plan.move_column.is_empty());
        assert_eq!(plan.create.len(), 1);
        assert_eq!(plan.create[0].label.as_deref(), Some("A"));
    }

    #[test]
    fn ungrouped_tasks_never_need_labels() {
        let local = tasks("[ ] Task", false);
        let cards = vec![card("c0", "Task", "todo", &[])];
        assert!(diff(&local, &cards, &columns()).is_empty());
    }

    #[test]
    fn labels_partition_and_cycle_palette() {
        let local: Vec<String> = ["A", "B", "C", "D", "B"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let remote = vec![label("l1", "B"), label("l2", "")];
        let palette = vec!["green".to_string(), "red".to_string()];

        let plan = plan_labels(&local, &remote, &palette);
        assert_eq!(plan.existing, vec!["B".to_string()]);
        assert_eq!(
            plan.to_create,
            vec![
                LabelRequest {
                    title: "A".to_string(),
                    color: Some("green".to_string()),
                },
                LabelRequest {
                    title: "C".to_string(),
                    color: Some("red".to_string()),
                },
                LabelRequest {
                    title: "D".to_string(),
                    color: Some("green".to_string()),
                },
            ]
        );
    }

    #[test]
    fn empty_palette_creates_colourless_labels() {
        let plan = plan_labels(&["A".to_string()], &[], &[]);
        assert_eq!(plan.to_create[0].color, None);
    }
}
