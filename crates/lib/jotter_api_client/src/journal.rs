//! Journal endpoints.

use jotter_core::models::journal::{JournalDraft, JournalEntry, sort_newest_first};
use jotter_core::validation::validate_journal_entry;
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiResult;

impl ApiClient {
    /// `GET /journal`, newest first.
    pub async fn journal_entries(&self) -> ApiResult<Vec<JournalEntry>> {
        let builder = self.request(Method::GET, "/journal")?;
        let mut entries: Vec<JournalEntry> = self
            .send_optional_json(builder)
            .await?
            .unwrap_or_default();
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// `POST /journal`.
    pub async fn create_journal_entry(&self, draft: &JournalDraft) -> ApiResult<()> {
        validate_journal_entry(&draft.title, &draft.content)?;
        let builder = self.request(Method::POST, "/journal")?.json(draft);
        self.send_empty(builder).await
    }

    /// `PUT /journal/id/{id}`.
    pub async fn update_journal_entry(&self, id: &str, draft: &JournalDraft) -> ApiResult<()> {
        validate_journal_entry(&draft.title, &draft.content)?;
        let builder = self
            .request(Method::PUT, &format!("/journal/id/{id}"))?
            .json(draft);
        self.send_empty(builder).await
    }

    /// `DELETE /journal/id/{id}`.
    pub async fn delete_journal_entry(&self, id: &str) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, &format!("/journal/id/{id}"))?;
        self.send_empty(builder).await
    }
}
