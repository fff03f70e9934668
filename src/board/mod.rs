//! Remote kanban board access.
//!
//! [`BoardGateway`] is the only way the sync engine talks to a board. Entity
//! records carry just the fields the engine reads; anything else a provider
//! returns is dropped at the adapter boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod memory;
pub mod trello;

pub use memory::InMemoryBoard;
pub use trello::{BoardCredentials, TrelloBoard};

/// A status bucket on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteColumn {
    pub id: String,
    pub name: String,
}

/// A label as applied to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLabel {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCard {
    pub id: String,
    pub title: String,
    pub column_id: String,
    #[serde(default)]
    pub labels: Vec<CardLabel>,
}

impl RemoteCard {
    pub fn has_label(&self, title: &str) -> bool {
        self.labels.iter().any(|label| label.title == title)
    }
}

/// A board-level label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLabel {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Read and write operations the sync engine needs from a board.
///
/// Every call may fail; errors are surfaced as-is and never interpreted.
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Columns in board order.
    async fn list_columns(&self) -> Result<Vec<RemoteColumn>>;

    async fn list_cards(&self) -> Result<Vec<RemoteCard>>;

    async fn list_labels(&self) -> Result<Vec<RemoteLabel>>;

    /// Label colours the board offers, in a stable order.
    async fn label_palette(&self) -> Result<Vec<String>>;

    async fn create_label(&self, title: &str, color: Option<&str>) -> Result<RemoteLabel>;

    async fn create_card(
        &self,
        title: &str,
        column_id: &str,
        label_id: Option<&str>,
    ) -> Result<RemoteCard>;

    async fn move_card(&self, card_id: &str, column_id: &str) -> Result<()>;

    async fn add_label(&self, card_id: &str, label_id: &str) -> Result<()>;
}
