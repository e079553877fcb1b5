//! Google Sheets backend for the tabular store.
//!
//! Talks to the Sheets v4 REST API with a service account token. Values are
//! written with `USER_ENTERED` input so numbers stay numeric and a leading
//! apostrophe keeps ids and project names as text.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use booked_models::Cell;

use crate::auth::{ServiceAccountKey, TokenProvider};
use crate::error::{Result, StoreError};
use crate::store::{SheetInfo, TabularStore};

/// Sheets API base URL.
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

/// Google Sheets store bound to one spreadsheet document.
pub struct GoogleSheetsStore {
    client: reqwest::Client,
    auth: TokenProvider,
    spreadsheet_id: String,
}

impl GoogleSheetsStore {
    /// Creates a store for the spreadsheet `spreadsheet_id`.
    pub fn new(spreadsheet_id: impl Into<String>, key: ServiceAccountKey) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id.into();
        if spreadsheet_id.trim().is_empty() {
            return Err(StoreError::Config("spreadsheet id is empty".to_string()));
        }

        let client = reqwest::Client::new();
        Ok(Self {
            auth: TokenProvider::new(key, client.clone()),
            client,
            spreadsheet_id,
        })
    }

    fn document_url(&self, suffix: &str) -> Result<Url> {
        document_url(&self.spreadsheet_id, suffix)
    }

    fn values_url(&self, range: &str, action: Option<&str>) -> Result<Url> {
        let mut url = self.document_url("")?;
        let segment = match action {
            Some(action) => format!("{}:{}", range, action),
            None => range.to_string(),
        };
        url.path_segments_mut()
            .map_err(|_| StoreError::Config("invalid API base URL".to_string()))?
            .push("values")
            .push(&segment);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let token = self.auth.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn batch_update(&self, request: Value) -> Result<Value> {
        let url = self.document_url(":batchUpdate")?;
        self.send(self.client.post(url).json(&json!({ "requests": [request] })))
            .await
    }
}

#[async_trait]
impl TabularStore for GoogleSheetsStore {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn find_sheet(&self, title: &str) -> Result<Option<SheetInfo>> {
        let mut url = self.document_url("")?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");

        let body = self.send(self.client.get(url)).await?;
        let sheets = parse_sheets(body)?;
        debug!(count = sheets.len(), "listed sheets");

        Ok(sheets.into_iter().find(|sheet| sheet.title == title))
    }

    async fn create_sheet(&self, title: &str) -> Result<SheetInfo> {
        let body = self
            .batch_update(json!({ "addSheet": { "properties": { "title": title } } }))
            .await?;

        let properties = body
            .pointer("/replies/0/addSheet/properties")
            .cloned()
            .ok_or_else(|| StoreError::Decode("addSheet reply has no properties".to_string()))?;
        let properties: SheetProperties =
            serde_json::from_value(properties).map_err(|e| StoreError::Decode(e.to_string()))?;

        info!(title, sheet_id = properties.sheet_id, "created sheet");
        Ok(properties.into())
    }

    async fn resize_columns(&self, sheet: &SheetInfo, columns: usize) -> Result<()> {
        if columns <= sheet.column_count {
            return Ok(());
        }

        self.batch_update(json!({
            "updateSheetProperties": {
                "properties": {
                    "sheetId": sheet.sheet_id,
                    "gridProperties": { "columnCount": columns },
                },
                "fields": "gridProperties.columnCount",
            }
        }))
        .await?;
        Ok(())
    }

    async fn clear(&self, sheet: &SheetInfo) -> Result<()> {
        let url = self.values_url(&quote_title(&sheet.title), Some("clear"))?;
        self.send(self.client.post(url).json(&json!({}))).await?;
        Ok(())
    }

    async fn set_header(&self, sheet: &SheetInfo, header: &[String]) -> Result<()> {
        let range = anchor_range(&sheet.title);
        let mut url = self.values_url(&range, None)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        self.send(self.client.put(url).json(&json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [header],
        })))
        .await?;
        Ok(())
    }

    async fn append_rows(&self, sheet: &SheetInfo, rows: &[Vec<Cell>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let range = anchor_range(&sheet.title);
        let mut url = self.values_url(&range, Some("append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        self.send(self.client.post(url).json(&json!({
            "majorDimension": "ROWS",
            "values": rows,
        })))
        .await?;
        Ok(())
    }
}

/// Builds `{base}{spreadsheet_id}{suffix}` with the id as one path segment.
fn document_url(spreadsheet_id: &str, suffix: &str) -> Result<Url> {
    let mut url =
        Url::parse(SHEETS_API_BASE).map_err(|e| StoreError::Config(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Config("invalid API base URL".to_string()))?
        .pop_if_empty()
        .push(&format!("{}{}", spreadsheet_id, suffix));
    Ok(url)
}

/// Quotes a sheet title for A1 notation.
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Range anchored at the top-left cell of a sheet.
fn anchor_range(title: &str) -> String {
    format!("{}!A1", quote_title(title))
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

// Zero-valued fields are omitted from API responses, so every number defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

impl From<SheetProperties> for SheetInfo {
    fn from(properties: SheetProperties) -> Self {
        SheetInfo::new(
            properties.sheet_id,
            properties.title,
            properties.grid_properties.row_count,
            properties.grid_properties.column_count,
        )
    }
}

fn parse_sheets(body: Value) -> Result<Vec<SheetInfo>> {
    let metadata: SpreadsheetMetadata =
        serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(metadata
        .sheets
        .into_iter()
        .map(|entry| entry.properties.into())
        .collect())
}
