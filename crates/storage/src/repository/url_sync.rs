use sqlx::PgPool;

use crate::dto::url_sync::UpdateUrlSyncRequest;
use crate::error::{Result, StorageError};
use crate::models::UrlSync;

/// Repository for timing-provider URL records
pub struct UrlSyncRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UrlSyncRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_competitions(&self, competition_ids: &[i32]) -> Result<Vec<UrlSync>> {
        let rows = sqlx::query_as::<_, UrlSync>(
            r#"
            SELECT * FROM url_syncs
            WHERE competition_id = ANY($1)
            ORDER BY competition_id, kind, url_sync_id
            "#,
        )
        .bind(competition_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_id(&self, url_sync_id: i32) -> Result<UrlSync> {
        let row = sqlx::query_as::<_, UrlSync>("SELECT * FROM url_syncs WHERE url_sync_id = $1")
            .bind(url_sync_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(row)
    }

    pub async fn update(
        &self,
        url_sync_id: i32,
        request: &UpdateUrlSyncRequest,
    ) -> Result<UrlSync> {
        let row = sqlx::query_as::<_, UrlSync>(
            r#"
            UPDATE url_syncs
            SET kind = $2, url = $3, current_url = $4, sync_index = $5, expires = $6
            WHERE url_sync_id = $1
            RETURNING *
            "#,
        )
        .bind(url_sync_id)
        .bind(&request.kind)
        .bind(&request.url)
        .bind(request.current_url.as_deref())
        .bind(request.sync_index)
        .bind(request.expires)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(row)
    }
}
