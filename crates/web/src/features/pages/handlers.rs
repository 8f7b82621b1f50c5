use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::flat_page::{FlatPageQuery, SaveFlatPageRequest},
    models::FlatPage,
};
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/pages",
    params(FlatPageQuery),
    responses(
        (status = 200, description = "Published pages, site-wide or for one competition", body = Vec<FlatPage>)
    ),
    tag = "pages"
)]
pub async fn list_pages(
    State(db): State<Database>,
    Query(filter): Query<FlatPageQuery>,
) -> Result<Json<Vec<FlatPage>>, WebError> {
    let pages = services::list_pages(db.pool(), &filter).await?;

    Ok(Json(pages))
}

#[utoipa::path(
    get,
    path = "/api/pages/{page_id}",
    params(
        ("page_id" = i32, Path, description = "Page id")
    ),
    responses(
        (status = 200, description = "Page found", body = FlatPage),
        (status = 404, description = "Page not found")
    ),
    tag = "pages"
)]
pub async fn get_page(
    State(db): State<Database>,
    Path(page_id): Path<i32>,
) -> Result<Response, WebError> {
    let page = services::get_page(db.pool(), page_id).await?;

    Ok(Json(page).into_response())
}

#[utoipa::path(
    post,
    path = "/api/pages",
    request_body = SaveFlatPageRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Page created", body = FlatPage),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Url and language already taken")
    ),
    tag = "pages"
)]
pub async fn create_page(
    State(db): State<Database>,
    Json(req): Json<SaveFlatPageRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let page = services::create_page(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(page)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/pages/{page_id}",
    params(
        ("page_id" = i32, Path, description = "Page id")
    ),
    request_body = SaveFlatPageRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Page updated", body = FlatPage),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Page not found"),
        (status = 409, description = "Url and language already taken")
    ),
    tag = "pages"
)]
pub async fn update_page(
    State(db): State<Database>,
    Path(page_id): Path<i32>,
    Json(req): Json<SaveFlatPageRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let page = services::update_page(db.pool(), page_id, &req).await?;

    Ok(Json(page).into_response())
}
