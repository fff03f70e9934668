//! Execution of reconciliation plans against a board.
//!
//! Each phase fans out one request per item and waits for all of them before
//! returning. Label resolution problems are reported per item; any other
//! failure aborts the phase once every in-flight request has settled. Writes
//! that already succeeded are not rolled back.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::board::{BoardGateway, RemoteLabel};
use crate::error::{Error, Result};
use crate::normalize::SyncTask;
use crate::reconcile::{CardUpdate, LabelRequest};
use crate::status::StatusColumns;

/// Write phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NewLabels,
    Columns,
    CardLabels,
    NewCards,
}

impl Phase {
    pub fn heading(&self) -> &'static str {
        match self {
            Phase::NewLabels => "Labels to create",
            Phase::Columns => "Statuses to update",
            Phase::CardLabels => "Cards to update labels",
            Phase::NewCards => "New cards to add",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Phase::NewLabels => "Are you sure you want to create these labels",
            Phase::Columns => "Are you sure you want to change these statuses",
            Phase::CardLabels => "Are you sure you want to change these labels",
            Phase::NewCards => "Are you sure you want to add these cards",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// Random delay before each card creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min_ms: u64,
    max_ms: u64,
}

impl Throttle {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn pick(&self) -> Duration {
        if self.max_ms == self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }
}

/// Board label ids by title.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    ids: HashMap<String, String>,
}

impl LabelIndex {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a RemoteLabel>) -> Self {
        let mut index = Self::default();
        for label in labels {
            index.insert(label);
        }
        index
    }

    /// First label with a given title wins; untitled labels are skipped.
    pub fn insert(&mut self, label: &RemoteLabel) {
        if label.title.is_empty() {
            return;
        }
        self.ids
            .entry(label.title.clone())
            .or_insert_with(|| label.id.clone());
    }

    pub fn id_for(&self, title: &str) -> Option<&str> {
        self.ids.get(title).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// An item that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub title: String,
    pub message: String,
}

/// What a phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseOutcome {
    pub applied: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemFailure>,
}

fn settle(phase: Phase, results: Vec<(String, Result<()>)>) -> Result<PhaseOutcome> {
    let mut outcome = PhaseOutcome::default();
    let mut fatal = None;

    for (title, result) in results {
        match result {
            Ok(()) => outcome.applied.push(title),
            Err(err @ Error::LabelNotResolved(_)) => {
                warn!(%phase, title = %title, "{err}");
                outcome.failures.push(ItemFailure {
                    title,
                    message: err.to_string(),
                });
            }
            Err(err) => {
                error!(%phase, title = %title, "{err}");
                if fatal.is_none() {
                    fatal = Some(err);
                }
            }
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => {
            debug!(%phase, applied = outcome.applied.len(), failed = outcome.failures.len());
            Ok(outcome)
        }
    }
}

/// Create labels on the board, returning the created records.
pub async fn create_labels(
    gateway: &dyn BoardGateway,
    requests: &[LabelRequest],
) -> Result<Vec<RemoteLabel>> {
    let results = join_all(
        requests
            .iter()
            .map(|request| gateway.create_label(&request.title, request.color.as_deref())),
    )
    .await;
    results.into_iter().collect()
}

/// Move matched cards into the column for their task's status.
pub async fn move_cards(
    gateway: &dyn BoardGateway,
    updates: &[CardUpdate],
    columns: &StatusColumns,
) -> Result<PhaseOutcome> {
    let results = join_all(updates.iter().map(|update| async move {
        let column = columns.column_for(update.task.status);
        let result = gateway.move_card(&update.card.id, &column.id).await;
        (update.task.title.clone(), result)
    }))
    .await;
    settle(Phase::Columns, results)
}

/// Attach each task's grouping label to its matched card.
pub async fn add_labels(
    gateway: &dyn BoardGateway,
    updates: &[CardUpdate],
    labels: &LabelIndex,
) -> Result<PhaseOutcome> {
    let results = join_all(updates.iter().map(|update| async move {
        let title = update.task.title.clone();
        let label_id = update
            .task
            .label
            .as_deref()
            .and_then(|label| labels.id_for(label));
        let result = match label_id {
            Some(label_id) => gateway.add_label(&update.card.id, label_id).await,
            None => Err(Error::LabelNotResolved(title.clone())),
        };
        (title, result)
    }))
    .await;
    settle(Phase::CardLabels, results)
}

/// Create cards for unmatched tasks, each after a throttle delay.
pub async fn create_cards(
    gateway: &dyn BoardGateway,
    tasks: &[SyncTask],
    labels: &LabelIndex,
    columns: &StatusColumns,
    throttle: Throttle,
) -> Result<PhaseOutcome> {
    let results = join_all(tasks.iter().map(|task| async move {
        let delay = throttle.pick();
        tokio::time::sleep(delay).await;

        let column = columns.column_for(task.status);
        let label_id = match task.label.as_deref() {
            Some(label) => {
                let id = labels.id_for(label);
                if id.is_none() {
                    warn!(title = %task.title, label, "label not on board; creating card without it");
                }
                id
            }
            None => None,
        };
        let result = gateway
            .create_card(&task.title, &column.id, label_id)
            .await
            .map(|card| debug!(card_id = %card.id, title = %card.title, "created card"));
        (task.title.clone(), result)
    }))
    .await;
    settle(Phase::NewCards, results)
}
