use crate::error::StoreError;
use crate::journal_entry::{JournalEntry, MoodRecord, RecordId};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, info, warn};

const SELECT_FIELDS: &str = "id,dt,note,sentiment,user_id";

/// The table mood entries live in.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All rows, newest `dt` first.
    async fn select_entries(&self) -> Result<Vec<MoodRecord>, StoreError>;

    async fn insert_entry(&self, entry: &JournalEntry) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub table: String,
}

/// PostgREST-style HTTP table, as served by Supabase.
pub struct RestStore {
    config: RestStoreConfig,
    client: Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> Result<Self, StoreError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref api_key) = config.api_key {
            let key = header::HeaderValue::from_str(api_key)
                .map_err(|e| StoreError(format!("Invalid API key: {e}")))?;
            let bearer = header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| StoreError(format!("Invalid API key: {e}")))?;
            headers.insert("apikey", key);
            headers.insert(header::AUTHORIZATION, bearer);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { config, client })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError(error_message(status, &body)))
    }
}

/// The store's own wording for a failed request.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { message: Some(message) }) = serde_json::from_str::<ErrorBody>(body) {
        return message;
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status.to_string()
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select_entries(&self) -> Result<Vec<MoodRecord>, StoreError> {
        let url = self.table_url();
        debug!(%url, "selecting mood entries");

        let response = self
            .client
            .get(&url)
            .query(&[("select", SELECT_FIELDS), ("order", "dt.desc")])
            .send()
            .await?;
        let rows: Vec<MoodRecord> = Self::check(response).await?.json().await?;

        debug!(count = rows.len(), "mood entries loaded");
        Ok(rows)
    }

    async fn insert_entry(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        let url = self.table_url();
        debug!(%url, sentiment = %entry.sentiment, "inserting mood entry");

        let response = self
            .client
            .post(&url)
            .header("Prefer", "return=minimal")
            .json(&[entry])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryTable {
    rows: Vec<MoodRecord>,
    next_id: i64,
    inserts: usize,
    failure: Option<String>,
}

/// Process-local table for offline runs.
#[derive(Default)]
pub struct MemoryStore {
    table: Mutex<MemoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, MemoryTable> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every following call fail with `message` until cleared.
    #[cfg(test)]
    pub fn fail_with(&self, message: Option<&str>) {
        self.table().failure = message.map(str::to_string);
    }

    /// Number of accepted inserts so far.
    #[cfg(test)]
    pub fn insert_count(&self) -> usize {
        self.table().inserts
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select_entries(&self) -> Result<Vec<MoodRecord>, StoreError> {
        let table = self.table();
        if let Some(ref message) = table.failure {
            return Err(StoreError(message.clone()));
        }

        let mut rows = table.rows.clone();
        // stable, so same-day rows keep insertion order
        rows.sort_by(|a, b| b.dt.cmp(&a.dt));
        Ok(rows)
    }

    async fn insert_entry(&self, entry: &JournalEntry) -> Result<(), StoreError> {
        let mut table = self.table();
        if let Some(ref message) = table.failure {
            warn!("memory store refusing insert");
            return Err(StoreError(message.clone()));
        }

        table.next_id += 1;
        let id = RecordId::Number(table.next_id);
        table.rows.push(MoodRecord::from_entry(id, entry));
        table.inserts += 1;
        info!(inserts = table.inserts, "memory store row added");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::MoodCategory;
    use chrono::NaiveDate;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rest_store(server: &MockServer) -> RestStore {
        RestStore::new(RestStoreConfig {
            base_url: server.uri(),
            api_key: Some("k".to_string()),
            table: "moods".to_string(),
        })
        .unwrap()
    }

    fn entry(day: u32, note: &str) -> JournalEntry {
        JournalEntry::new(
            NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            note.to_string(),
            MoodCategory::Neutral,
            "RE-71904/24".to_string(),
        )
    }

    #[tokio::test]
    async fn memory_store_lists_newest_day_first() {
        let store = MemoryStore::new();
        store.insert_entry(&entry(3, "b")).await.unwrap();
        store.insert_entry(&entry(10, "c")).await.unwrap();
        store.insert_entry(&entry(1, "a")).await.unwrap();

        let rows = store.select_entries().await.unwrap();
        let days: Vec<&str> = rows.iter().map(|r| r.dt.as_str()).collect();
        assert_eq!(days, ["2024-04-10", "2024-04-03", "2024-04-01"]);
        assert_eq!(rows[0].id, RecordId::Number(2));
        assert_eq!(rows[0].sentiment, "neutral");
        assert_eq!(store.insert_count(), 3);
    }

    #[tokio::test]
    async fn memory_store_failure_is_reported_verbatim() {
        let store = MemoryStore::new();
        store.fail_with(Some("permission denied for table moods"));

        let err = store.insert_entry(&entry(1, "a")).await.unwrap_err();
        assert_eq!(err.to_string(), "permission denied for table moods");
        assert!(store.select_entries().await.is_err());
        assert_eq!(store.insert_count(), 0);

        store.fail_with(None);
        assert!(store.select_entries().await.unwrap().is_empty());
    }

    #[test]
    fn error_message_prefers_the_json_message() {
        assert_eq!(
            error_message(
                StatusCode::UNAUTHORIZED,
                r#"{"code":"42501","message":"new row violates row-level security policy"}"#
            ),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn error_message_falls_back_to_body_then_status() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down\n"), "upstream down");
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "503 Service Unavailable"
        );
    }

    #[test]
    fn table_url_joins_base_and_table() {
        let store = RestStore::new(RestStoreConfig {
            base_url: "https://example.supabase.co/".to_string(),
            api_key: Some("anon".to_string()),
            table: "moods".to_string(),
        })
        .unwrap();
        assert_eq!(store.table_url(), "https://example.supabase.co/rest/v1/moods");
    }

    #[tokio::test]
    async fn rest_insert_posts_a_single_row_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/moods"))
            .and(header("prefer", "return=minimal"))
            .and(header("apikey", "k"))
            .and(header("authorization", "Bearer k"))
            .and(body_json(json!([{
                "dt": "2024-01-02",
                "note": "calm",
                "sentiment": "calm",
                "user_id": "RE-71904/24",
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let entry = JournalEntry::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "calm".to_string(),
            MoodCategory::Calm,
            "RE-71904/24".to_string(),
        );
        rest_store(&server).insert_entry(&entry).await.unwrap();
    }

    #[tokio::test]
    async fn rest_select_asks_for_fields_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/moods"))
            .and(query_param("select", "id,dt,note,sentiment,user_id"))
            .and(query_param("order", "dt.desc"))
            .and(header("apikey", "k"))
            .and(header("authorization", "Bearer k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 2, "dt": "2024-01-03", "note": "tired", "sentiment": "tired", "user_id": "RE-71904/24"},
                {"id": 1, "dt": "2024-01-02", "note": "calm", "sentiment": "calm", "user_id": "RE-71904/24"},
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = rest_store(&server).select_entries().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, RecordId::Number(2));
        assert_eq!(rows[0].dt, "2024-01-03");
        assert_eq!(rows[1].sentiment, "calm");
    }

    #[tokio::test]
    async fn rest_errors_carry_the_store_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/moods"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "boom!"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/moods"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database is down"))
            .mount(&server)
            .await;

        let store = rest_store(&server);
        let err = store.insert_entry(&entry(2, "calm")).await.unwrap_err();
        assert_eq!(err, StoreError("boom!".to_string()));
        let err = store.select_entries().await.unwrap_err();
        assert_eq!(err, StoreError("database is down".to_string()));
    }
}
