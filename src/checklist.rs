//! Checklist parsing.
//!
//! A checklist line looks like `  [x] Ship it`: leading whitespace, a bracketed
//! status marker, then the title. Leading whitespace width is the nesting
//! scope; each task's parent is the nearest earlier task (in the same source)
//! with a strictly smaller scope.
//!
//! Tasks live in a [`Checklist`] arena and refer to their parent by
//! [`TaskId`], so a parent always has a smaller index than its children.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    /// Map a bracket marker to a status. Markers are case-insensitive.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker.to_ascii_lowercase() {
            'x' => Some(Status::Done),
            '~' => Some(Status::InProgress),
            ' ' => Some(Status::Todo),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recognized checklist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub status: Status,
    pub scope: usize,
    pub title: String,
}

fn line_regex() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"(\s*)\[([ xX~])\](.+)$").expect("checklist line regex is valid")
    })
}

/// Recognize one checklist line.
///
/// Returns `None` for anything that is not a checklist item, including lines
/// whose title is empty after trimming.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let captures = line_regex().captures(line)?;
    let whitespace = captures.get(1).map_or("", |m| m.as_str());
    let marker = captures.get(2)?.as_str().chars().next()?;
    let title = captures.get(3)?.as_str().trim();

    let status = Status::from_marker(marker)?;
    if title.is_empty() {
        return None;
    }

    Some(ParsedLine {
        status,
        scope: whitespace.chars().count(),
        title: title.to_string(),
    })
}

/// Index of a task inside its [`Checklist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TaskId(usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A task produced from one checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub status: Status,
    pub title: String,
    pub scope: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<TaskId>,
    /// Index of the source this task was read from.
    pub source: usize,
}

/// Arena of parsed tasks, in source order.
#[derive(Debug, Clone, Default)]
pub struct Checklist {
    tasks: Vec<Task>,
    sources: usize,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single source.
    pub fn parse(text: &str) -> Self {
        let mut checklist = Self::new();
        checklist.push_source(text);
        checklist
    }

    /// Parse another source and append its tasks.
    ///
    /// Parent lookback never crosses into earlier sources. Returns the number
    /// of tasks added.
    pub fn push_source(&mut self, text: &str) -> usize {
        let source = self.sources;
        self.sources += 1;

        // Enclosing chain for the current line, scopes strictly increasing.
        let mut open: Vec<(usize, TaskId)> = Vec::new();
        let before = self.tasks.len();

        for line in text.split('\n') {
            let Some(parsed) = parse_line(line) else {
                continue;
            };

            while open
                .last()
                .is_some_and(|(scope, _)| *scope >= parsed.scope)
            {
                open.pop();
            }

            let id = TaskId(self.tasks.len());
            self.tasks.push(Task {
                status: parsed.status,
                title: parsed.title,
                scope: parsed.scope,
                parent: open.last().map(|(_, parent)| *parent),
                source,
            });
            open.push((parsed.scope, id));
        }

        self.tasks.len() - before
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn source_count(&self) -> usize {
        self.sources
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (TaskId(index), task))
    }

    pub fn parent(&self, id: TaskId) -> Option<&Task> {
        self.get(id)?.parent.and_then(|parent| self.get(parent))
    }

    /// Titles from the root ancestor down to the task itself.
    pub fn title_chain(&self, id: TaskId) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut cursor = self.get(id);
        while let Some(task) = cursor {
            chain.push(task.title.as_str());
            cursor = task.parent.and_then(|parent| self.get(parent));
        }
        chain.reverse();
        chain
    }

    /// The root ancestor of a task (the task itself when it has no parent).
    pub fn root(&self, id: TaskId) -> Option<TaskId> {
        let mut current = id;
        loop {
            let task = self.get(current)?;
            match task.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_indented_todo() {
        let parsed = parse_line("  [ ]  Write tests").expect("line");
        assert_eq!(
            parsed,
            ParsedLine {
                status: Status::Todo,
                scope: 2,
                title: "Write tests".to_string(),
            }
        );
    }

    #[test]
    fn markers_are_case_insensitive() {
        assert_eq!(parse_line("[x] a").map(|p| p.status), Some(Status::Done));
        assert_eq!(parse_line("[X] a").map(|p| p.status), Some(Status::Done));
        assert_eq!(
            parse_line("[~] a").map(|p| p.status),
            Some(Status::InProgress)
        );
    }

    #[test]
    fn rejects_unknown_markers_and_empty_titles() {
        assert!(parse_line("[?] nope").is_none());
        assert!(parse_line("[-] nope").is_none());
        assert!(parse_line("[x]    ").is_none());
        assert!(parse_line("[x]").is_none());
        assert!(parse_line("plain text").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn trailing_carriage_return_is_trimmed() {
        let parsed = parse_line("[x] Done thing\r").expect("line");
        assert_eq!(parsed.title, "Done thing");
    }

    #[test]
    fn tabs_count_as_single_characters() {
        let parsed = parse_line("\t\t[ ] Tabbed").expect("line");
        assert_eq!(parsed.scope, 2);
    }

    #[test]
    fn comment_prefixed_lines_are_recognized() {
        let parsed = parse_line(" * [x] Get a glob of all the files").expect("line");
        assert_eq!(parsed.status, Status::Done);
        assert_eq!(parsed.scope, 1);
        assert_eq!(parsed.title, "Get a glob of all the files");
    }

    #[test]
    fn increasing_scope_builds_linear_chain() {
        let checklist = Checklist::parse("[ ] a\n  [ ] b\n    [ ] c\n      [ ] d");
        for (id, task) in checklist.iter() {
            let expected = id.index().checked_sub(1).map(TaskId);
            assert_eq!(task.parent, expected, "task {}", task.title);
        }
    }

    #[test]
    fn equal_scope_is_flat() {
        let checklist = Checklist::parse("  [ ] a\n  [x] b\n  [~] c");
        assert_eq!(checklist.len(), 3);
        assert!(checklist.tasks().iter().all(|task| task.parent.is_none()));
    }

    #[test]
    fn siblings_share_parent() {
        let checklist = Checklist::parse("[ ] root\n  [ ] one\n  [ ] two");
        assert_eq!(checklist.tasks()[1].parent, Some(TaskId(0)));
        assert_eq!(checklist.tasks()[2].parent, Some(TaskId(0)));
    }

    #[test]
    fn irregular_dedent_attaches_to_nearest_shallower() {
        let text = "[ ] a\n    [ ] b\n  [ ] c\n      [ ] d\n [ ] e";
        let checklist = Checklist::parse(text);
        let parents: Vec<_> = checklist.tasks().iter().map(|t| t.parent).collect();
        assert_eq!(
            parents,
            vec![
                None,
                Some(TaskId(0)),
                Some(TaskId(0)),
                Some(TaskId(2)),
                Some(TaskId(0)),
            ]
        );
    }

    #[test]
    fn blank_and_unrecognized_lines_do_not_break_lookback() {
        let text = "[ ] a\n\nsome prose\n  [ ] b\n  [?] skipped\n    [ ] c";
        let checklist = Checklist::parse(text);
        assert_eq!(checklist.len(), 3);
        assert_eq!(checklist.tasks()[1].parent, Some(TaskId(0)));
        assert_eq!(checklist.tasks()[2].parent, Some(TaskId(1)));
    }

    #[test]
    fn parents_precede_and_are_shallower() {
        let text = "  [ ] a\n[ ] b\n      [ ] c\n   [ ] d\n    [ ] e\n  [ ] f\n [ ] g";
        let checklist = Checklist::parse(text);
        for (id, task) in checklist.iter() {
            if let Some(parent) = task.parent {
                assert!(parent < id);
                assert!(checklist.tasks()[parent.index()].scope < task.scope);
            }
        }
    }

    #[test]
    fn lookback_stays_within_source() {
        let mut checklist = Checklist::new();
        assert_eq!(checklist.push_source("[ ] first root"), 1);
        assert_eq!(checklist.push_source("  [ ] indented in second file"), 1);
        assert_eq!(checklist.source_count(), 2);
        assert_eq!(checklist.tasks()[1].parent, None);
        assert_eq!(checklist.tasks()[1].source, 1);
    }

    #[test]
    fn title_chain_is_root_first() {
        let checklist = Checklist::parse("[ ] Area\n  [ ] Feature\n    [ ] Task");
        assert_eq!(
            checklist.title_chain(TaskId(2)),
            vec!["Area", "Feature", "Task"]
        );
        assert_eq!(checklist.root(TaskId(2)), Some(TaskId(0)));
        assert_eq!(
            checklist.parent(TaskId(2)).map(|t| t.title.as_str()),
            Some("Feature")
        );
    }
}
