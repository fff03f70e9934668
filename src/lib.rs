//! ticksync - Checklist to Board Sync Library
//!
//! This library provides the core functionality for the ticksync CLI tool,
//! which mirrors plain-text checklists onto a kanban board.
//!
//! # Core Concepts
//!
//! - **Checklist**: `[ ]`, `[~]` and `[x]` lines whose indentation forms a tree
//! - **Task titles**: each task is named by its ancestor chain, joined by a separator
//! - **Grouping**: top-level tasks can become labels instead of cards
//! - **Reconciliation**: a pure diff between tasks and the board's cards
//! - **Phases**: writes happen in confirmed batches, labels first
//!
//! # Module Organization
//!
//! - `checklist`: Line parsing and hierarchy building
//! - `normalize`: Title composition and grouping labels
//! - `status`: Mapping board lists to statuses
//! - `reconcile`: Label and card plans
//! - `board`: Board gateway trait with in-memory and Trello implementations
//! - `apply`: Concurrent execution of a plan
//! - `sync`: Orchestration and confirmation policies
//! - `sources`: Glob expansion and file loading
//! - `config`: Configuration loading from `.ticksync.toml`
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON output
//! - `cli`: Command-line interface using clap

pub mod apply;
pub mod board;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod error;
pub mod normalize;
pub mod output;
pub mod reconcile;
pub mod sources;
pub mod status;
pub mod sync;

pub use error::{Error, Result};
