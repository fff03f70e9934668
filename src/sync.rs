//! Sync orchestration.
//!
//! A run reads everything it needs from the board, computes the label and card
//! plans, then walks the write phases in order. Each non-empty phase is shown
//! to an [`ApplyPolicy`] before anything is written, so callers decide whether
//! to prompt, auto-approve or stay read-only.

use serde::Serialize;
use tracing::info;

use crate::apply::{self, LabelIndex, Phase, PhaseOutcome, Throttle};
use crate::board::{BoardGateway, RemoteLabel};
use crate::checklist::Checklist;
use crate::error::Result;
use crate::normalize::{normalize, NormalizeOptions, Normalized};
use crate::reconcile::{diff, plan_labels, LabelPlan, SyncPlan};
use crate::status::StatusColumns;

/// Decides whether a proposed phase is executed.
pub trait ApplyPolicy: Send + Sync {
    fn should_apply(&self, phase: Phase, proposed: &[String]) -> bool;
}

/// Apply every phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ApplyPolicy for AutoApprove {
    fn should_apply(&self, _phase: Phase, _proposed: &[String]) -> bool {
        true
    }
}

/// Never write.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl ApplyPolicy for DryRun {
    fn should_apply(&self, _phase: Phase, _proposed: &[String]) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub normalize: NormalizeOptions,
    /// Overrides the board palette when non-empty.
    pub palette: Vec<String>,
    pub throttle: Throttle,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            palette: Vec::new(),
            throttle: Throttle::none(),
        }
    }
}

/// Everything read from the board plus the computed plans.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub normalized: Normalized,
    pub columns: StatusColumns,
    #[serde(skip)]
    pub remote_labels: Vec<RemoteLabel>,
    pub labels: LabelPlan,
    pub plan: SyncPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub proposed: Vec<String>,
    pub applied: bool,
    #[serde(flatten)]
    pub outcome: PhaseOutcome,
}

/// Outcome of a run: the computed plans plus what each phase did.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub tasks: usize,
    pub labels: usize,
    pub columns: StatusColumns,
    pub label_plan: LabelPlan,
    pub plan: SyncPlan,
    pub phases: Vec<PhaseReport>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.phases.iter().map(|p| p.outcome.failures.len()).sum()
    }
}

pub struct Synchronizer<G> {
    gateway: G,
    options: SyncOptions,
}

impl<G: BoardGateway> Synchronizer<G> {
    pub fn new(gateway: G, options: SyncOptions) -> Self {
        Self { gateway, options }
    }

    /// Read the board and compute what a run would do.
    pub async fn preview(&self, checklist: &Checklist) -> Result<Preview> {
        let normalized = normalize(checklist, &self.options.normalize);

        let (remote_labels, labels) = if normalized.labels.is_empty() {
            (Vec::new(), LabelPlan::default())
        } else {
            let remote = self.gateway.list_labels().await?;
            let palette = if self.options.palette.is_empty() {
                self.gateway.label_palette().await?
            } else {
                self.options.palette.clone()
            };
            let plan = plan_labels(&normalized.labels, &remote, &palette);
            (remote, plan)
        };

        let columns = StatusColumns::classify(&self.gateway.list_columns().await?)?;
        let cards = self.gateway.list_cards().await?;
        let plan = diff(&normalized.tasks, &cards, &columns);

        info!(
            tasks = normalized.tasks.len(),
            cards = cards.len(),
            create = plan.create.len(),
            move_column = plan.move_column.len(),
            add_label = plan.add_label.len(),
            "computed sync plan"
        );

        Ok(Preview {
            normalized,
            columns,
            remote_labels,
            labels,
            plan,
        })
    }

    /// Preview, then execute each approved phase.
    pub async fn run(&self, checklist: &Checklist, policy: &dyn ApplyPolicy) -> Result<SyncReport> {
        let preview = self.preview(checklist).await?;
        self.apply(preview, policy).await
    }

    pub async fn apply(&self, preview: Preview, policy: &dyn ApplyPolicy) -> Result<SyncReport> {
        let gateway: &dyn BoardGateway = &self.gateway;
        let mut phases = Vec::new();
        let mut label_index = LabelIndex::from_labels(&preview.remote_labels);

        let proposed = describe_new_labels(&preview.labels);
        if !proposed.is_empty() {
            let applied = policy.should_apply(Phase::NewLabels, &proposed);
            let mut outcome = PhaseOutcome::default();
            if applied {
                for label in apply::create_labels(gateway, &preview.labels.to_create).await? {
                    label_index.insert(&label);
                    outcome.applied.push(label.title);
                }
            }
            phases.push(PhaseReport {
                phase: Phase::NewLabels,
                proposed,
                applied,
                outcome,
            });
        }

        let proposed = describe_moves(&preview);
        if !proposed.is_empty() {
            let applied = policy.should_apply(Phase::Columns, &proposed);
            let outcome = if applied {
                apply::move_cards(gateway, &preview.plan.move_column, &preview.columns).await?
            } else {
                PhaseOutcome::default()
            };
            phases.push(PhaseReport {
                phase: Phase::Columns,
                proposed,
                applied,
                outcome,
            });
        }

        let proposed = describe_label_updates(&preview.plan);
        if !proposed.is_empty() {
            let applied = policy.should_apply(Phase::CardLabels, &proposed);
            let outcome = if applied {
                apply::add_labels(gateway, &preview.plan.add_label, &label_index).await?
            } else {
                PhaseOutcome::default()
            };
            phases.push(PhaseReport {
                phase: Phase::CardLabels,
                proposed,
                applied,
                outcome,
            });
        }

        let proposed = describe_creates(&preview.plan);
        if !proposed.is_empty() {
            let applied = policy.should_apply(Phase::NewCards, &proposed);
            let outcome = if applied {
                apply::create_cards(
                    gateway,
                    &preview.plan.create,
                    &label_index,
                    &preview.columns,
                    self.options.throttle,
                )
                .await?
            } else {
                PhaseOutcome::default()
            };
            phases.push(PhaseReport {
                phase: Phase::NewCards,
                proposed,
                applied,
                outcome,
            });
        }

        Ok(SyncReport {
            tasks: preview.normalized.tasks.len(),
            labels: preview.normalized.labels.len(),
            columns: preview.columns,
            label_plan: preview.labels,
            plan: preview.plan,
            phases,
        })
    }
}

fn describe_new_labels(plan: &LabelPlan) -> Vec<String> {
    plan.to_create
        .iter()
        .map(|request| match &request.color {
            Some(color) => format!("\"{}\" ({color})", request.title),
            None => format!("\"{}\"", request.title),
        })
        .collect()
}

fn describe_moves(preview: &Preview) -> Vec<String> {
    preview
        .plan
        .move_column
        .iter()
        .map(|update| {
            let from = preview
                .columns
                .status_of(&update.card.column_id)
                .map_or("unknown", |status| status.as_str());
            format!("\"{}\" {from} -> {}", update.task.title, update.task.status)
        })
        .collect()
}

fn describe_label_updates(plan: &SyncPlan) -> Vec<String> {
    plan.add_label
        .iter()
        .map(|update| {
            let current: Vec<&str> = update
                .card
                .labels
                .iter()
                .map(|label| label.title.as_str())
                .collect();
            let mut next = current.clone();
            next.push(update.task.label.as_deref().unwrap_or("Empty Label"));
            format!(
                "\"{}\" [{}] -> [{}]",
                update.task.title,
                current.join(", "),
                next.join(", ")
            )
        })
        .collect()
}

fn describe_creates(plan: &SyncPlan) -> Vec<String> {
    plan.create
        .iter()
        .map(|task| match &task.label {
            Some(label) => format!("\"{}\" [{label}]", task.title),
            None => format!("\"{}\"", task.title),
        })
        .collect()
}
