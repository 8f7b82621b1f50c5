use sqlx::PgPool;
use storage::dto::flat_page::{FlatPageQuery, SaveFlatPageRequest};
use storage::models::FlatPage;
use storage::repository::flat_page::FlatPageRepository;

use crate::error::WebError;

pub async fn list_pages(pool: &PgPool, filter: &FlatPageQuery) -> Result<Vec<FlatPage>, WebError> {
    let pages = FlatPageRepository::new(pool).list_published(filter).await?;
    Ok(pages)
}

pub async fn get_page(pool: &PgPool, flat_page_id: i32) -> Result<FlatPage, WebError> {
    let page = FlatPageRepository::new(pool).find_by_id(flat_page_id).await?;
    Ok(page)
}

pub async fn create_page(pool: &PgPool, req: &SaveFlatPageRequest) -> Result<FlatPage, WebError> {
    let page = FlatPageRepository::new(pool).create(req).await?;
    Ok(page)
}

pub async fn update_page(
    pool: &PgPool,
    flat_page_id: i32,
    req: &SaveFlatPageRequest,
) -> Result<FlatPage, WebError> {
    let page = FlatPageRepository::new(pool)
        .update(flat_page_id, req)
        .await?;
    Ok(page)
}
