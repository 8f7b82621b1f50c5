use sqlx::{PgPool, QueryBuilder};

use crate::dto::flat_page::{FlatPageQuery, SaveFlatPageRequest};
use crate::error::{Result, StorageError};
use crate::models::FlatPage;

/// Repository for editorial content pages
pub struct FlatPageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FlatPageRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published pages, optionally narrowed by competition, language or
    /// exact url.
    pub async fn list_published(&self, filter: &FlatPageQuery) -> Result<Vec<FlatPage>> {
        let mut query = QueryBuilder::new(
            "SELECT * FROM flat_pages WHERE is_published IS TRUE",
        );

        if let Some(competition_id) = filter.competition {
            query.push(" AND competition_id = ");
            query.push_bind(competition_id);
        }

        if let Some(ref language) = filter.language {
            query.push(" AND language = ");
            query.push_bind(language.clone());
        }

        if let Some(ref url) = filter.url {
            query.push(" AND url = ");
            query.push_bind(url.clone());
        }

        query.push(" ORDER BY ordering, title");

        let pages: Vec<FlatPage> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(pages)
    }

    pub async fn find_by_id(&self, flat_page_id: i32) -> Result<FlatPage> {
        let page = sqlx::query_as::<_, FlatPage>(
            "SELECT * FROM flat_pages WHERE flat_page_id = $1",
        )
        .bind(flat_page_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(page)
    }

    pub async fn create(&self, request: &SaveFlatPageRequest) -> Result<FlatPage> {
        let page = sqlx::query_as::<_, FlatPage>(
            r#"
            INSERT INTO flat_pages (url, title, content, enable_comments, competition_id,
                                    ordering, is_published, language)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&request.url)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.enable_comments)
        .bind(request.competition_id)
        .bind(request.ordering)
        .bind(request.is_published)
        .bind(&request.language)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).on_conflict("a page with this url and language already exists")
        })?;

        Ok(page)
    }

    pub async fn update(
        &self,
        flat_page_id: i32,
        request: &SaveFlatPageRequest,
    ) -> Result<FlatPage> {
        let page = sqlx::query_as::<_, FlatPage>(
            r#"
            UPDATE flat_pages
            SET url = $2, title = $3, content = $4, enable_comments = $5,
                competition_id = $6, ordering = $7, is_published = $8, language = $9
            WHERE flat_page_id = $1
            RETURNING *
            "#,
        )
        .bind(flat_page_id)
        .bind(&request.url)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.enable_comments)
        .bind(request.competition_id)
        .bind(request.ordering)
        .bind(request.is_published)
        .bind(&request.language)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).on_conflict("a page with this url and language already exists")
        })?
        .ok_or(StorageError::NotFound)?;

        Ok(page)
    }
}
