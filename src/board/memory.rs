//! In-memory board for tests and local runs.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{BoardGateway, CardLabel, RemoteCard, RemoteColumn, RemoteLabel};
use crate::error::{Error, Result};

/// Thread-safe in-memory board.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoard {
    state: Arc<RwLock<BoardState>>,
}

#[derive(Debug, Default)]
struct BoardState {
    columns: Vec<RemoteColumn>,
    cards: Vec<RemoteCard>,
    labels: Vec<RemoteLabel>,
    palette: Vec<String>,
    next_id: u64,
    fail_writes: bool,
    writes: usize,
}

impl BoardState {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn begin_write(&mut self, op: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::OperationFailed(format!("{op} rejected by board")));
        }
        self.writes += 1;
        Ok(())
    }

    fn column_exists(&self, column_id: &str) -> bool {
        self.columns.iter().any(|column| column.id == column_id)
    }
}

impl InMemoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board with one column per name; ids are `col-1`, `col-2`, ...
    pub fn with_columns(names: &[&str]) -> Self {
        let board = Self::new();
        for name in names {
            board.add_column(name);
        }
        board
    }

    pub fn add_column(&self, name: &str) -> RemoteColumn {
        let mut state = self.write();
        let column = RemoteColumn {
            id: state.allocate("col"),
            name: name.to_string(),
        };
        state.columns.push(column.clone());
        column
    }

    /// Seed a label without counting it as a write.
    pub fn add_label_definition(&self, title: &str, color: Option<&str>) -> RemoteLabel {
        let mut state = self.write();
        let label = RemoteLabel {
            id: state.allocate("label"),
            title: title.to_string(),
            color: color.map(str::to_string),
        };
        state.labels.push(label.clone());
        label
    }

    /// Seed a card without counting it as a write.
    pub fn add_card(&self, title: &str, column_id: &str, labels: &[&RemoteLabel]) -> RemoteCard {
        let mut state = self.write();
        let card = RemoteCard {
            id: state.allocate("card"),
            title: title.to_string(),
            column_id: column_id.to_string(),
            labels: labels
                .iter()
                .map(|label| CardLabel {
                    id: label.id.clone(),
                    title: label.title.clone(),
                })
                .collect(),
        };
        state.cards.push(card.clone());
        card
    }

    pub fn set_palette(&self, palette: &[&str]) {
        self.write().palette = palette.iter().map(|c| c.to_string()).collect();
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.write().fail_writes = fail;
    }

    pub fn columns(&self) -> Vec<RemoteColumn> {
        self.read().columns.clone()
    }

    pub fn cards(&self) -> Vec<RemoteCard> {
        self.read().cards.clone()
    }

    pub fn labels(&self) -> Vec<RemoteLabel> {
        self.read().labels.clone()
    }

    pub fn card(&self, title: &str) -> Option<RemoteCard> {
        self.read()
            .cards
            .iter()
            .find(|card| card.title == title)
            .cloned()
    }

    /// Number of successful write operations so far.
    pub fn write_count(&self) -> usize {
        self.read().writes
    }

    fn read(&self) -> RwLockReadGuard<'_, BoardState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BoardState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BoardGateway for InMemoryBoard {
    async fn list_columns(&self) -> Result<Vec<RemoteColumn>> {
        Ok(self.columns())
    }

    async fn list_cards(&self) -> Result<Vec<RemoteCard>> {
        Ok(self.cards())
    }

    async fn list_labels(&self) -> Result<Vec<RemoteLabel>> {
        Ok(self.labels())
    }

    async fn label_palette(&self) -> Result<Vec<String>> {
        Ok(self.read().palette.clone())
    }

    async fn create_label(&self, title: &str, color: Option<&str>) -> Result<RemoteLabel> {
        let mut state = self.write();
        state.begin_write("create label")?;
        let label = RemoteLabel {
            id: state.allocate("label"),
            title: title.to_string(),
            color: color.map(str::to_string),
        };
        state.labels.push(label.clone());
        Ok(label)
    }

    async fn create_card(
        &self,
        title: &str,
        column_id: &str,
        label_id: Option<&str>,
    ) -> Result<RemoteCard> {
        let mut state = self.write();
        state.begin_write("create card")?;
        if !state.column_exists(column_id) {
            return Err(Error::Remote {
                status: 400,
                body: format!("invalid value for idList: {column_id}"),
            });
        }
        let labels = match label_id {
            Some(id) => {
                let label = state
                    .labels
                    .iter()
                    .find(|label| label.id == id)
                    .ok_or_else(|| Error::Remote {
                        status: 400,
                        body: format!("invalid value for idLabels: {id}"),
                    })?;
                vec![CardLabel {
                    id: label.id.clone(),
                    title: label.title.clone(),
                }]
            }
            None => Vec::new(),
        };
        let card = RemoteCard {
            id: state.allocate("card"),
            title: title.to_string(),
            column_id: column_id.to_string(),
            labels,
        };
        state.cards.push(card.clone());
        Ok(card)
    }

    async fn move_card(&self, card_id: &str, column_id: &str) -> Result<()> {
        let mut state = self.write();
        state.begin_write("move card")?;
        if !state.column_exists(column_id) {
            return Err(Error::Remote {
                status: 400,
                body: format!("invalid value for idList: {column_id}"),
            });
        }
        let card = state
            .cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| Error::Remote {
                status: 404,
                body: format!("card not found: {card_id}"),
            })?;
        card.column_id = column_id.to_string();
        Ok(())
    }

    async fn add_label(&self, card_id: &str, label_id: &str) -> Result<()> {
        let mut state = self.write();
        state.begin_write("add label")?;
        let label = state
            .labels
            .iter()
            .find(|label| label.id == label_id)
            .map(|label| CardLabel {
                id: label.id.clone(),
                title: label.title.clone(),
            })
            .ok_or_else(|| Error::Remote {
                status: 400,
                body: format!("invalid value for value: {label_id}"),
            })?;
        let card = state
            .cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| Error::Remote {
                status: 404,
                body: format!("card not found: {card_id}"),
            })?;
        if !card.labels.iter().any(|existing| existing.id == label.id) {
            card.labels.push(label);
        }
        Ok(())
    }
}
