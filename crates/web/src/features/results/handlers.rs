use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::competition::{ArchiveYear, CompetitionDetailResponse},
    dto::result::ResultListQuery,
    dto::standing::StandingListQuery,
    models::Competition,
};

use crate::error::WebError;
use crate::features::pdf_attachment;

use super::services::{self, ResultListResponse, StandingListResponse};

#[utoipa::path(
    get,
    path = "/api/results/archive",
    responses(
        (status = 200, description = "Past competitions grouped by season, newest first", body = Vec<ArchiveYear>)
    ),
    tag = "results"
)]
pub async fn archive(State(db): State<Database>) -> Result<Json<Vec<ArchiveYear>>, WebError> {
    let years = services::archive(db.pool(), Utc::now().date_naive()).await?;

    Ok(Json(years))
}

#[utoipa::path(
    get,
    path = "/api/competitions",
    responses(
        (status = 200, description = "List all top level competitions", body = Vec<Competition>)
    ),
    tag = "competitions"
)]
pub async fn list_competitions(
    State(db): State<Database>,
) -> Result<Json<Vec<Competition>>, WebError> {
    let competitions = services::list_competitions(db.pool()).await?;

    Ok(Json(competitions))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Competition with its stages and distances", body = CompetitionDetailResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
) -> Result<Response, WebError> {
    let detail = services::competition_detail(db.pool(), competition_id).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/results",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ResultListQuery
    ),
    responses(
        (status = 200, description = "Result table for one distance of the competition", body = ResultListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Competition not found")
    ),
    tag = "results"
)]
pub async fn list_results(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
    Query(query): Query<ResultListQuery>,
) -> Result<Response, WebError> {
    query.pagination.validate().map_err(WebError::BadRequest)?;

    let response = services::result_list(db.pool(), competition_id, &query).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/standings",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        StandingListQuery
    ),
    responses(
        (status = 200, description = "Series standings table for one distance", body = StandingListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Competition not found")
    ),
    tag = "standings"
)]
pub async fn list_standings(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
    Query(query): Query<StandingListQuery>,
) -> Result<Response, WebError> {
    query.pagination.validate().map_err(WebError::BadRequest)?;

    let response = services::standing_list(db.pool(), competition_id, &query).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/results/{result_id}/diploma",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("result_id" = i32, Path, description = "Result id")
    ),
    responses(
        (status = 200, description = "Finisher diploma as a PDF attachment", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "No diploma for this result")
    ),
    tag = "results"
)]
pub async fn get_diploma(
    State(db): State<Database>,
    Path((competition_id, result_id)): Path<(i32, i32)>,
) -> Result<Response, WebError> {
    // Any failure along the way reads as "no diploma here".
    match services::diploma(db.pool(), competition_id, result_id).await {
        Ok((file_name, bytes)) => Ok(pdf_attachment(&file_name, bytes)),
        Err(e) => {
            tracing::warn!(competition_id, result_id, error = %e, "diploma request failed");
            Err(WebError::NotFound)
        }
    }
}
