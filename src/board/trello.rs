//! Trello REST gateway.
//!
//! Lists map to columns, cards to cards, and board labels to labels. The
//! palette is the set of colour keys in the board's `labelNames`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{BoardGateway, CardLabel, RemoteCard, RemoteColumn, RemoteLabel};
use crate::error::{Error, Result};

/// Trello API endpoint
pub const TRELLO_API_URL: &str = "https://api.trello.com/1";

/// Credentials and target board for a Trello gateway.
#[derive(Clone)]
pub struct BoardCredentials {
    pub api_key: String,
    pub api_token: String,
    pub board_id: String,
}

impl std::fmt::Debug for BoardCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardCredentials")
            .field("api_key", &"<redacted>")
            .field("api_token", &"<redacted>")
            .field("board_id", &self.board_id)
            .finish()
    }
}

impl BoardCredentials {
    /// Build credentials, rejecting blank values.
    pub fn new(
        api_key: Option<String>,
        api_token: Option<String>,
        board_id: Option<String>,
    ) -> Result<Self> {
        fn required(value: Option<String>, name: &'static str) -> Result<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(Error::MissingCredential(name))
        }

        Ok(Self {
            api_key: required(api_key, "TRELLO_API_KEY")?,
            api_token: required(api_token, "TRELLO_API_TOKEN")?,
            board_id: required(board_id, "TRELLO_BOARD_ID")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TrelloList {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrelloLabel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrelloCard {
    id: String,
    name: String,
    id_list: String,
    #[serde(default)]
    labels: Vec<TrelloLabel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrelloBoardSettings {
    #[serde(default)]
    label_names: BTreeMap<String, String>,
}

impl From<TrelloList> for RemoteColumn {
    fn from(list: TrelloList) -> Self {
        RemoteColumn {
            id: list.id,
            name: list.name,
        }
    }
}

impl From<TrelloLabel> for RemoteLabel {
    fn from(label: TrelloLabel) -> Self {
        RemoteLabel {
            id: label.id,
            title: label.name,
            color: label.color,
        }
    }
}

impl From<TrelloCard> for RemoteCard {
    fn from(card: TrelloCard) -> Self {
        RemoteCard {
            id: card.id,
            title: card.name,
            column_id: card.id_list,
            labels: card
                .labels
                .into_iter()
                .map(|label| CardLabel {
                    id: label.id,
                    title: label.name,
                })
                .collect(),
        }
    }
}

/// Trello REST client scoped to one board.
#[derive(Debug, Clone)]
pub struct TrelloBoard {
    client: reqwest::Client,
    api_url: String,
    credentials: BoardCredentials,
}

impl TrelloBoard {
    pub fn new(credentials: BoardCredentials) -> Result<Self> {
        Self::with_url(credentials, TRELLO_API_URL)
    }

    /// Create a client against a custom API root (self-hosted proxies, tests).
    pub fn with_url(credentials: BoardCredentials, api_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ticksync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn board_path(&self, resource: &str) -> String {
        if resource.is_empty() {
            format!("/boards/{}", self.credentials.board_id)
        } else {
            format!("/boards/{}/{resource}", self.credentials.board_id)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.api_url))
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("token", self.credentials.api_token.as_str()),
            ])
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl BoardGateway for TrelloBoard {
    #[instrument(skip(self))]
    async fn list_columns(&self) -> Result<Vec<RemoteColumn>> {
        let lists: Vec<TrelloList> = self
            .send(self.request(Method::GET, &self.board_path("lists")))
            .await?;
        debug!(count = lists.len(), "fetched lists");
        Ok(lists.into_iter().map(RemoteColumn::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_cards(&self) -> Result<Vec<RemoteCard>> {
        let cards: Vec<TrelloCard> = self
            .send(self.request(Method::GET, &self.board_path("cards")))
            .await?;
        debug!(count = cards.len(), "fetched cards");
        Ok(cards.into_iter().map(RemoteCard::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_labels(&self) -> Result<Vec<RemoteLabel>> {
        let labels: Vec<TrelloLabel> = self
            .send(self.request(Method::GET, &self.board_path("labels")))
            .await?;
        debug!(count = labels.len(), "fetched labels");
        Ok(labels.into_iter().map(RemoteLabel::from).collect())
    }

    #[instrument(skip(self))]
    async fn label_palette(&self) -> Result<Vec<String>> {
        let settings: TrelloBoardSettings = self
            .send(self.request(Method::GET, &self.board_path("")))
            .await?;
        Ok(settings.label_names.into_keys().collect())
    }

    #[instrument(skip(self))]
    async fn create_label(&self, title: &str, color: Option<&str>) -> Result<RemoteLabel> {
        let mut request = self
            .request(Method::POST, &self.board_path("labels"))
            .query(&[("name", title)]);
        if let Some(color) = color {
            request = request.query(&[("color", color)]);
        }
        let label: TrelloLabel = self.send(request).await?;
        Ok(label.into())
    }

    #[instrument(skip(self))]
    async fn create_card(
        &self,
        title: &str,
        column_id: &str,
        label_id: Option<&str>,
    ) -> Result<RemoteCard> {
        let mut request = self
            .request(Method::POST, "/cards")
            .query(&[("name", title), ("idList", column_id)]);
        if let Some(label_id) = label_id {
            request = request.query(&[("idLabels", label_id)]);
        }
        let card: TrelloCard = self.send(request).await?;
        Ok(card.into())
    }

    #[instrument(skip(self))]
    async fn move_card(&self, card_id: &str, column_id: &str) -> Result<()> {
        let request = self
            .request(Method::PUT, &format!("/cards/{card_id}"))
            .query(&[("idList", column_id)]);
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_label(&self, card_id: &str, label_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, &format!("/cards/{card_id}/idLabels"))
            .query(&[("value", label_id)]);
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }
}
