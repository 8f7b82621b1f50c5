use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::team::{DistanceQuery, TeamDetailResponse, TeamListQuery},
};

use crate::cache::ReportCache;
use crate::error::WebError;

use super::services::{
    self, TeamListResponse, TeamResultsResponse, TeamStandingsResponse, TeamsByNameResponse,
};

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/team-results",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        DistanceQuery
    ),
    responses(
        (status = 200, description = "Teams of the current stage with their scoring members", body = TeamResultsResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn team_results(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
    Query(query): Query<DistanceQuery>,
) -> Result<Response, WebError> {
    let response = services::team_results(
        db.pool(),
        competition_id,
        query.distance,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/team-standings",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        TeamListQuery
    ),
    responses(
        (status = 200, description = "Season team standings table", body = TeamStandingsResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn team_standings(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
    Query(query): Query<TeamListQuery>,
) -> Result<Response, WebError> {
    query.pagination.validate().map_err(WebError::BadRequest)?;

    let response = services::team_standings(
        db.pool(),
        competition_id,
        query.distance,
        query.pagination.page,
    )
    .await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/teams",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        TeamListQuery
    ),
    responses(
        (status = 200, description = "Registered teams of one distance", body = TeamListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
    Query(query): Query<TeamListQuery>,
) -> Result<Response, WebError> {
    query.pagination.validate().map_err(WebError::BadRequest)?;

    let response =
        services::team_list(db.pool(), competition_id, query.distance, &query.pagination).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/teams/{team_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("team_id" = i32, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Team with its roster", body = TeamDetailResponse),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(db): State<Database>,
    Path((competition_id, team_id)): Path<(i32, i32)>,
) -> Result<Response, WebError> {
    let detail = services::team_detail(db.pool(), competition_id, team_id).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/team-results/by-name",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        DistanceQuery
    ),
    responses(
        (status = 200, description = "Informal teams grouped by free-text team name", body = TeamsByNameResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "teams"
)]
pub async fn teams_by_name(
    State(db): State<Database>,
    State(report_cache): State<ReportCache>,
    Path(competition_id): Path<i32>,
    Query(query): Query<DistanceQuery>,
) -> Result<Response, WebError> {
    let response = services::teams_by_name(
        db.pool(),
        &report_cache,
        competition_id,
        query.distance,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(response).into_response())
}
