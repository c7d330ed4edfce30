use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, RequestBuilder,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::{
    configuration::{Credentials, NotionSettings},
    domain::business::{Business, ContactStatus, Urgency, WebsiteStatus},
};

use super::places_client::parse_base_url;

pub const PLACE_ID_PROPERTY: &str = "PlaceID";
const CATEGORY_OPTIONS: [&str; 3] = ["Restaurant", "Shop", "Business"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Skipped,
}

/// Destination for mapped businesses.
#[async_trait]
pub trait BusinessStore: Send + Sync {
    async fn insert_business(&self, business: &Business) -> anyhow::Result<InsertOutcome>;
}

pub struct NotionClient {
    client: Client,
    base_url: Url,
    database_id: String,
    parent_page_id: Option<String>,
    database_title: String,
}

#[derive(Deserialize)]
struct NotionError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct DatabaseObject {
    #[serde(default)]
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Deserialize)]
struct PageObject {
    #[serde(default)]
    id: String,
}

#[derive(Serialize)]
struct TextFilter<'a> {
    equals: &'a str,
}

#[derive(Serialize)]
struct PropertyFilter<'a> {
    property: &'a str,
    rich_text: TextFilter<'a>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    filter: PropertyFilter<'a>,
    page_size: u8,
}

fn select_options<'a>(names: impl IntoIterator<Item = &'a str>) -> Value {
    let options: Vec<Value> = names.into_iter().map(|name| json!({ "name": name })).collect();
    json!({ "options": options })
}

fn rich_text(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": content } }])
}

/// Property schema of the businesses database.
pub fn database_schema() -> Value {
    json!({
        "Name": { "title": {} },
        "Address": { "rich_text": {} },
        PLACE_ID_PROPERTY: { "rich_text": {} },
        "Type": { "multi_select": select_options(CATEGORY_OPTIONS) },
        "WebsiteStatus": {
            "select": select_options(WebsiteStatus::ALL.iter().map(|s| s.as_str()))
        },
        "Urgency": { "select": select_options(Urgency::ALL.iter().map(|u| u.as_str())) },
        "Contacted": {
            "select": select_options(ContactStatus::ALL.iter().map(|c| c.as_str()))
        },
        "URL": { "url": {} },
    })
}

pub fn page_properties(business: &Business) -> Value {
    let categories: Vec<Value> = business
        .categories
        .iter()
        .map(|category| json!({ "name": category }))
        .collect();

    json!({
        "Name": { "title": rich_text(&business.name) },
        "Address": { "rich_text": rich_text(&business.address) },
        PLACE_ID_PROPERTY: { "rich_text": rich_text(&business.place_id) },
        "Type": { "multi_select": categories },
        "WebsiteStatus": { "select": { "name": business.website_status.as_str() } },
        "Urgency": { "select": { "name": business.urgency.as_str() } },
        "Contacted": { "select": { "name": business.contact_status.as_str() } },
        "URL": { "url": business.url },
    })
}

impl NotionClient {
    pub fn new(settings: &NotionSettings, credentials: &Credentials) -> anyhow::Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!(
            "Bearer {}",
            credentials.notion_api_key
        ))
        .context("NOTION_API_KEY is not a valid header value")?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            "notion-version",
            HeaderValue::from_str(&settings.version)
                .context("notion.version is not a valid header value")?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build Notion http client")?;

        Ok(NotionClient {
            client,
            base_url: parse_base_url(&settings.base_url)?,
            database_id: credentials.notion_database_id.clone(),
            parent_page_id: credentials.notion_page_id.clone(),
            database_title: settings.database_title.clone(),
        })
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid Notion endpoint: {}", path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> anyhow::Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return match serde_json::from_str::<NotionError>(&body) {
                Ok(e) => Err(anyhow!(
                    "Notion API error ({} {}): {}",
                    status.as_u16(),
                    e.code,
                    e.message
                )),
                Err(_) => Err(anyhow!("Notion API error ({}): {}", status.as_u16(), body)),
            };
        }

        Ok(response.json::<T>().await?)
    }

    /// Any failure, including a network error, counts as "does not exist".
    pub async fn database_exists(&self) -> bool {
        let request = match self.endpoint(&format!("databases/{}", self.database_id)) {
            Ok(url) => self.client.get(url),
            Err(e) => {
                log::debug!("Database lookup failed: {:?}", e);
                return false;
            }
        };

        match self.send::<DatabaseObject>(request).await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Database lookup failed: {:?}", e);
                false
            }
        }
    }

    pub async fn create_database(&mut self) -> anyhow::Result<()> {
        let Some(parent_page_id) = self.parent_page_id.as_deref() else {
            bail!("NOTION_PAGE_ID must be set to create the database");
        };

        let body = json!({
            "parent": { "type": "page_id", "page_id": parent_page_id },
            "title": rich_text(&self.database_title),
            "properties": database_schema(),
            "is_inline": false,
        });

        let database: DatabaseObject = self
            .send(self.client.post(self.endpoint("databases")?).json(&body))
            .await?;

        if database.id.is_empty() {
            log::warn!(
                "Created database returned no id, keeping {}",
                self.database_id
            );
        } else {
            log::info!("Created database {}", database.id);
            self.database_id = database.id;
        }

        Ok(())
    }

    pub async fn ensure_database(&mut self) -> anyhow::Result<()> {
        if !self.database_exists().await {
            log::info!("Database does not exist, creating it...");
            self.create_database()
                .await
                .context("Failed to create Notion database")?;
        }
        Ok(())
    }

    pub async fn business_exists(&self, place_id: &str) -> anyhow::Result<bool> {
        let query = QueryRequest {
            filter: PropertyFilter {
                property: PLACE_ID_PROPERTY,
                rich_text: TextFilter { equals: place_id },
            },
            page_size: 1,
        };

        let url = self.endpoint(&format!("databases/{}/query", self.database_id))?;
        let response: QueryResponse = self.send(self.client.post(url).json(&query)).await?;

        Ok(!response.results.is_empty())
    }
}

#[async_trait]
impl BusinessStore for NotionClient {
    async fn insert_business(&self, business: &Business) -> anyhow::Result<InsertOutcome> {
        if self.business_exists(&business.place_id).await? {
            log::info!(
                "Business with PlaceID {} already exists, skipping...",
                business.place_id
            );
            return Ok(InsertOutcome::Skipped);
        }

        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": page_properties(business),
        });

        let page: PageObject = self
            .send(self.client.post(self.endpoint("pages")?).json(&body))
            .await?;
        log::debug!("Created page {} for {}", page.id, business.place_id);

        Ok(InsertOutcome::Inserted)
    }
}
