//! ticksync sync command implementation
//!
//! Loads checklist sources, reconciles them with the configured board and
//! reports what each write phase did.

use std::path::PathBuf;

use tracing::info;

use crate::board::{BoardCredentials, TrelloBoard};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::sources;
use crate::sync::{ApplyPolicy, AutoApprove, DryRun, SyncOptions, SyncReport, Synchronizer};

use super::prompt::Prompt;
use super::{load_config, runtime, NormalizeArgs};

/// Options for the sync command
pub struct SyncCommandOptions {
    pub patterns: Vec<String>,
    pub board_id: Option<String>,
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    pub normalize: NormalizeArgs,
    pub yes: bool,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: SyncCommandOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;

    let board_id = options
        .board_id
        .or_else(|| Some(config.board.id.clone()).filter(|id| !id.trim().is_empty()));
    let credentials = BoardCredentials::new(options.api_key, options.api_token, board_id)?;
    let gateway = TrelloBoard::with_url(credentials, &config.board.api_url)?;

    let sync_options = SyncOptions {
        normalize: options.normalize.resolve(&config.sync)?,
        palette: config.sync.palette.clone(),
        throttle: config.throttle.throttle(),
    };

    let policy: Box<dyn ApplyPolicy> = if options.dry_run {
        Box::new(DryRun)
    } else if options.yes {
        Box::new(AutoApprove)
    } else {
        Box::new(Prompt::stdin())
    };

    let patterns = options.patterns;
    let report = runtime()?.block_on(async {
        let checklist = sources::load_checklist(&patterns).await?;
        info!(
            tasks = checklist.len(),
            sources = checklist.source_count(),
            "loaded checklist"
        );
        Synchronizer::new(gateway, sync_options)
            .run(&checklist, policy.as_ref())
            .await
    })?;

    let human = render(&report, options.dry_run);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "sync",
        &report,
        Some(&human),
    )
}

fn render(report: &SyncReport, dry_run: bool) -> HumanOutput {
    let header = if report.is_noop() {
        "ticksync sync: board already up to date".to_string()
    } else if dry_run {
        "ticksync sync: dry run, nothing written".to_string()
    } else {
        let applied = report.phases.iter().filter(|p| p.applied).count();
        format!(
            "ticksync sync: applied {applied} of {} phase(s)",
            report.phases.len()
        )
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("tasks", report.tasks.to_string());
    human.push_summary("labels", report.labels.to_string());

    for phase in &report.phases {
        let state = if phase.applied {
            format!(
                "{} applied, {} failed",
                phase.outcome.applied.len(),
                phase.outcome.failures.len()
            )
        } else {
            format!("{} skipped", phase.proposed.len())
        };
        human.push_summary(phase.phase.heading(), state);

        if dry_run {
            for line in &phase.proposed {
                human.push_detail(line.clone());
            }
        }
        for failure in &phase.outcome.failures {
            human.push_warning(failure.message.clone());
        }
    }

    if dry_run && !report.is_noop() {
        human.push_next_step("ticksync sync --yes <patterns>");
    }

    human
}
