//! ticksync init command implementation
//!
//! Writes a default `.ticksync.toml` so every setting is visible and editable.

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for the init command
pub struct InitOptions {
    pub board_id: Option<String>,
    pub force: bool,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    path: PathBuf,
    overwritten: bool,
    board_id: String,
}

pub fn run(options: InitOptions) -> Result<()> {
    let path = match options.config {
        Some(path) => path,
        None => std::env::current_dir()?.join(CONFIG_FILE),
    };

    let existed = path.exists();
    if existed && !options.force {
        return Err(Error::ConfigExists(path));
    }

    let mut config = Config::default();
    if let Some(board_id) = options.board_id {
        config.board.id = board_id;
    }
    config.validate()?;
    config.save(&path)?;

    let report = InitReport {
        path: path.clone(),
        overwritten: existed,
        board_id: config.board.id.clone(),
    };

    let header = if existed {
        "ticksync init: config overwritten"
    } else {
        "ticksync init: config created"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("path", path.display().to_string());
    if config.board.id.is_empty() {
        human.push_next_step("set board.id in the config or TRELLO_BOARD_ID");
    }
    human.push_next_step("set TRELLO_API_KEY and TRELLO_API_TOKEN");
    human.push_next_step("ticksync sync --dry-run <patterns>");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        Some(&human),
    )
}
