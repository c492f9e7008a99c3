//! Trendline CRUD endpoints.

use crate::client::ApiClient;
use crate::error::{Error, Operation, Result};
use crate::types::{NewTrendline, TrendlinePatch, TrendlineRecord};

const TRENDLINES: &str = "/api/trendlines";

/// Trendline CRUD API.
#[derive(Debug, Clone)]
pub struct TrendlinesApi {
    client: ApiClient,
}

impl TrendlinesApi {
    /// Create a new trendlines API instance.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List every stored trendline.
    pub async fn list(&self) -> Result<Vec<TrendlineRecord>> {
        self.client
            .get(TRENDLINES, None)
            .await
            .map_err(|e| e.in_operation(Operation::ListTrendlines))
    }

    /// Store a new trendline. The body is validated before sending.
    pub async fn create(&self, trendline: &NewTrendline) -> Result<TrendlineRecord> {
        trendline.validate()?;
        self.client
            .post(TRENDLINES, trendline)
            .await
            .map_err(|e| e.in_operation(Operation::CreateTrendline))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    /// [`Error::NotFound`] when no record has `id`.
    pub async fn update(&self, id: i64, patch: &TrendlinePatch) -> Result<TrendlineRecord> {
        patch.validate()?;
        self.client
            .patch(&format!("{TRENDLINES}/{id}"), patch)
            .await
            .map_err(|e| e.in_operation(Operation::UpdateTrendline))
    }

    /// Delete a record.
    ///
    /// # Errors
    /// [`Error::NotFound`] when no record has `id`.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .delete(&format!("{TRENDLINES}/{id}"))
            .await
            .map_err(|e| e.in_operation(Operation::DeleteTrendline))
    }

    /// Delete every listed record, returning how many were removed.
    ///
    /// Records that vanish between listing and deletion are skipped.
    pub async fn delete_all(&self) -> Result<usize> {
        let mut removed = 0;
        for record in self.list().await? {
            match self.delete(record.id).await {
                Ok(()) => removed += 1,
                Err(Error::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }
}
