//! ticksync parse command implementation
//!
//! Parses and normalizes checklist sources without contacting the board.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::normalize::{normalize, SyncTask};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::sources;

use super::{load_config, runtime, NormalizeArgs};

/// Options for the parse command
pub struct ParseOptions {
    pub patterns: Vec<String>,
    pub normalize: NormalizeArgs,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ParseReport {
    sources: Vec<PathBuf>,
    labels: Vec<String>,
    tasks: Vec<SyncTask>,
}

pub fn run(options: ParseOptions) -> Result<()> {
    let config = load_config(options.config.as_deref())?;
    let normalize_options = options.normalize.resolve(&config.sync)?;

    let paths = sources::expand(&options.patterns)?;
    let loaded = runtime()?.block_on(sources::read_all(paths))?;
    let checklist = sources::build_checklist(&loaded);
    let normalized = normalize(&checklist, &normalize_options);

    let report = ParseReport {
        sources: loaded.into_iter().map(|source| source.path).collect(),
        labels: normalized.labels,
        tasks: normalized.tasks,
    };

    let human = render(&report);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "parse",
        &report,
        Some(&human),
    )
}

fn render(report: &ParseReport) -> HumanOutput {
    let mut human = HumanOutput::new(format!(
        "ticksync parse: {} task(s) from {} source(s)",
        report.tasks.len(),
        report.sources.len()
    ));
    if !report.labels.is_empty() {
        human.push_summary("labels", report.labels.join(", "));
    }
    for task in &report.tasks {
        match &task.label {
            Some(label) => human.push_detail(format!("[{}] {} ({label})", task.status, task.title)),
            None => human.push_detail(format!("[{}] {}", task.status, task.title)),
        }
    }
    if report.sources.is_empty() {
        human.push_warning("no files matched the given patterns");
    }
    human
}
