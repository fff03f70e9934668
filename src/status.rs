//! Mapping of board columns to canonical statuses.
//!
//! Column names are free-form ("To-Do", "in_progress", "Done!!"), so each
//! status is recognized by a case-insensitive pattern that tolerates
//! punctuation and spacing between words.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::board::RemoteColumn;
use crate::checklist::Status;
use crate::error::{Error, Result};

fn pattern(status: Status) -> &'static Regex {
    static TODO: OnceLock<Regex> = OnceLock::new();
    static IN_PROGRESS: OnceLock<Regex> = OnceLock::new();
    static DONE: OnceLock<Regex> = OnceLock::new();

    let (cell, source) = match status {
        Status::Todo => (&TODO, r"(?i)to[\W_]*do"),
        Status::InProgress => (&IN_PROGRESS, r"(?i)in[\W_]*progress"),
        Status::Done => (&DONE, r"(?i)d+o+n+e+"),
    };
    cell.get_or_init(|| Regex::new(source).expect("status pattern is valid"))
}

/// Whether a column name reads as the given status.
pub fn matches_status(name: &str, status: Status) -> bool {
    pattern(status).is_match(name)
}

/// One column per canonical status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusColumns {
    pub todo: RemoteColumn,
    pub in_progress: RemoteColumn,
    pub done: RemoteColumn,
}

impl StatusColumns {
    /// Resolve a distinct column for each status.
    ///
    /// Each status takes the first column (in board order) that matches it and
    /// is not taken by another status. Statuses are tried in `todo`,
    /// `in-progress`, `done` order first, then in every other order, so a board
    /// is accepted whenever some distinct assignment exists. On failure the
    /// error names the status the default order could not place.
    pub fn classify(columns: &[RemoteColumn]) -> Result<Self> {
        let [todo, in_progress, done] = Status::ALL;
        let orders = [
            [todo, in_progress, done],
            [todo, done, in_progress],
            [in_progress, todo, done],
            [in_progress, done, todo],
            [done, todo, in_progress],
            [done, in_progress, todo],
        ];

        let mut first_error = None;
        for order in orders {
            match assign(columns, order) {
                Ok(resolved) => return Ok(resolved),
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(_) => {}
            }
        }
        Err(first_error.unwrap_or(Error::UnresolvedStatus(todo)))
    }

    pub fn column_for(&self, status: Status) -> &RemoteColumn {
        match status {
            Status::Todo => &self.todo,
            Status::InProgress => &self.in_progress,
            Status::Done => &self.done,
        }
    }

    /// Reverse lookup; `None` for columns outside the three status columns.
    pub fn status_of(&self, column_id: &str) -> Option<Status> {
        Status::ALL
            .into_iter()
            .find(|status| self.column_for(*status).id == column_id)
    }
}

fn assign(columns: &[RemoteColumn], order: [Status; 3]) -> Result<StatusColumns> {
    let mut resolved: Vec<(Status, &RemoteColumn)> = Vec::with_capacity(order.len());
    for status in order {
        let column = columns
            .iter()
            .find(|column| {
                resolved.iter().all(|(_, taken)| taken.id != column.id)
                    && matches_status(&column.name, status)
            })
            .ok_or(Error::UnresolvedStatus(status))?;
        resolved.push((status, column));
    }

    let pick = |status: Status| {
        resolved
            .iter()
            .find(|(candidate, _)| *candidate == status)
            .map(|(_, column)| (*column).clone())
            .ok_or(Error::UnresolvedStatus(status))
    };
    Ok(StatusColumns {
        todo: pick(Status::Todo)?,
        in_progress: pick(Status::InProgress)?,
        done: pick(Status::Done)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<RemoteColumn> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| RemoteColumn {
                id: format!("l{i}"),
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn tolerates_spelling_variants() {
        for name in ["To Do", "To-Do", "to_do", "TODO", "todo list"] {
            assert!(matches_status(name, Status::Todo), "{name}");
        }
        for name in ["In Progress", "in-progress", "IN_PROGRESS", "InProgress"] {
            assert!(matches_status(name, Status::InProgress), "{name}");
        }
        for name in ["Done", "Done!!", "DONE", "doooone"] {
            assert!(matches_status(name, Status::Done), "{name}");
        }
        assert!(!matches_status("Doing", Status::InProgress));
        assert!(!matches_status("Shipped", Status::Done));
    }

    #[test]
    fn classifies_standard_board() {
        let cols = columns(&["Backlog", "To Do", "In Progress", "Done"]);
        let resolved = StatusColumns::classify(&cols).expect("classify");
        assert_eq!(resolved.todo.id, "l1");
        assert_eq!(resolved.in_progress.id, "l2");
        assert_eq!(resolved.done.id, "l3");
        assert_eq!(resolved.status_of("l2"), Some(Status::InProgress));
        assert_eq!(resolved.status_of("l0"), None);
    }

    #[test]
    fn unresolved_todo_is_reported_first() {
        let cols = columns(&["Icebox", "Doing", "Shipped"]);
        let err = StatusColumns::classify(&cols).expect_err("no match");
        assert!(matches!(err, Error::UnresolvedStatus(Status::Todo)));
        assert_eq!(err.to_string(), "Could not find list for status todo");
    }

    #[test]
    fn unresolved_later_status_is_named() {
        let cols = columns(&["To Do", "Doing", "Done"]);
        let err = StatusColumns::classify(&cols).expect_err("no in-progress");
        assert!(matches!(err, Error::UnresolvedStatus(Status::InProgress)));
    }

    #[test]
    fn overlapping_names_find_a_distinct_assignment() {
        let cols = columns(&["Todo in progress", "To Do", "Done"]);
        let resolved = StatusColumns::classify(&cols).expect("classify");
        assert_eq!(resolved.todo.id, "l1");
        assert_eq!(resolved.in_progress.id, "l0");
        assert_eq!(resolved.done.id, "l2");
    }

    #[test]
    fn first_fit_is_kept_when_it_works() {
        let cols = columns(&["To Do", "Todo in progress", "In Progress", "Done"]);
        let resolved = StatusColumns::classify(&cols).expect("classify");
        assert_eq!(resolved.todo.id, "l0");
        assert_eq!(resolved.in_progress.id, "l1");
    }

    #[test]
    fn one_column_cannot_serve_two_statuses() {
        let cols = columns(&["To Do / Done", "In Progress"]);
        let err = StatusColumns::classify(&cols).expect_err("shared column");
        assert!(matches!(err, Error::UnresolvedStatus(Status::Done)));
    }
}
