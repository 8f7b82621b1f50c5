use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::result::{ResultDetailResponse, ResultListQuery, SaveResultRequest},
    dto::team::{StageApplication, TeamApplicationRow, TeamDetailResponse, UpdateTeamRequest},
    dto::url_sync::UpdateUrlSyncRequest,
    models::{Team, UrlSync},
};
use validator::Validate;

use crate::error::WebError;
use crate::features::pdf_attachment;

use super::services::{
    self, ManageResultListResponse, RecalculateResponse, ReportRequest,
};

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/results",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ResultListQuery
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Manager result table with filter warnings", body = ManageResultListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "manager"
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
    post,
    path = "/api/manager/competitions/{competition_id}/results",
    params(
        ("competition_id" = i32, Path, description = "Competition id")
    ),
    request_body = SaveResultRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Result created and standings recomputed", body = ResultDetailResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Participant already has a result")
    ),
    tag = "manager"
)]
pub async fn create_result(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
    Json(req): Json<SaveResultRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let detail = services::create_result(db.pool(), competition_id, &req).await?;

    Ok((StatusCode::CREATED, Json(detail)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/results/{result_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("result_id" = i32, Path, description = "Result id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Result with rider and laps", body = ResultDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Result not found")
    ),
    tag = "manager"
)]
pub async fn get_result(
    State(db): State<Database>,
    Path((competition_id, result_id)): Path<(i32, i32)>,
) -> Result<Response, WebError> {
    let detail = services::get_result(db.pool(), competition_id, result_id).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    put,
    path = "/api/manager/competitions/{competition_id}/results/{result_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("result_id" = i32, Path, description = "Result id")
    ),
    request_body = SaveResultRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Result updated and standings recomputed", body = ResultDetailResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Result not found")
    ),
    tag = "manager"
)]
pub async fn update_result(
    State(db): State<Database>,
    Path((competition_id, result_id)): Path<(i32, i32)>,
    Json(req): Json<SaveResultRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let detail = services::update_result(db.pool(), competition_id, result_id, &req).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    post,
    path = "/api/manager/competitions/{competition_id}/reports",
    params(
        ("competition_id" = i32, Path, description = "Competition id")
    ),
    request_body = ReportRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Report as a PDF attachment", body = Vec<u8>, content_type = "application/pdf"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown report action or competition")
    ),
    tag = "manager"
)]
pub async fn build_report(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
    Json(req): Json<ReportRequest>,
) -> Result<Response, WebError> {
    let (file_name, bytes) =
        services::build_report(db.pool(), competition_id, &req, Utc::now().date_naive()).await?;

    Ok(pdf_attachment(&file_name, bytes))
}

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/teams",
    params(
        ("competition_id" = i32, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Teams registered on the competition's distances", body = Vec<Team>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "manager"
)]
pub async fn list_teams(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
) -> Result<Json<Vec<Team>>, WebError> {
    let teams = services::team_list(db.pool(), competition_id).await?;

    Ok(Json(teams))
}

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/teams/{team_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("team_id" = i32, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team with its roster", body = TeamDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "manager"
)]
pub async fn get_team(
    State(db): State<Database>,
    Path((competition_id, team_id)): Path<(i32, i32)>,
) -> Result<Response, WebError> {
    let detail = services::team_detail(db.pool(), competition_id, team_id).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    put,
    path = "/api/manager/competitions/{competition_id}/teams/{team_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("team_id" = i32, Path, description = "Team id")
    ),
    request_body = UpdateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Team and roster updated, team points recomputed", body = TeamDetailResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "manager"
)]
pub async fn update_team(
    State(db): State<Database>,
    Path((competition_id, team_id)): Path<(i32, i32)>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let detail = services::update_team(db.pool(), competition_id, team_id, &req).await?;

    Ok(Json(detail).into_response())
}

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/teams/{team_id}/applications",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("team_id" = i32, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Applications of one team, stage by stage", body = Vec<StageApplication>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "manager"
)]
pub async fn team_applications(
    State(db): State<Database>,
    Path((competition_id, team_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<StageApplication>>, WebError> {
    let applications = services::team_applications(
        db.pool(),
        competition_id,
        team_id,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/applications",
    params(
        ("competition_id" = i32, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Applied members across the competition family", body = Vec<TeamApplicationRow>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "manager"
)]
pub async fn list_applications(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
) -> Result<Json<Vec<TeamApplicationRow>>, WebError> {
    let rows = services::applications(db.pool(), competition_id).await?;

    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/url-syncs",
    params(
        ("competition_id" = i32, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Timing provider URLs of the competition family", body = Vec<UrlSync>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "manager"
)]
pub async fn list_url_syncs(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
) -> Result<Json<Vec<UrlSync>>, WebError> {
    let syncs = services::url_sync_list(db.pool(), competition_id).await?;

    Ok(Json(syncs))
}

#[utoipa::path(
    get,
    path = "/api/manager/competitions/{competition_id}/url-syncs/{url_sync_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("url_sync_id" = i32, Path, description = "Url sync id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Url sync found", body = UrlSync),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Url sync not found")
    ),
    tag = "manager"
)]
pub async fn get_url_sync(
    State(db): State<Database>,
    Path((competition_id, url_sync_id)): Path<(i32, i32)>,
) -> Result<Response, WebError> {
    let sync = services::url_sync_detail(db.pool(), competition_id, url_sync_id).await?;

    Ok(Json(sync).into_response())
}

#[utoipa::path(
    put,
    path = "/api/manager/competitions/{competition_id}/url-syncs/{url_sync_id}",
    params(
        ("competition_id" = i32, Path, description = "Competition id"),
        ("url_sync_id" = i32, Path, description = "Url sync id")
    ),
    request_body = UpdateUrlSyncRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Url sync updated", body = UrlSync),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Url sync not found")
    ),
    tag = "manager"
)]
pub async fn update_url_sync(
    State(db): State<Database>,
    Path((competition_id, url_sync_id)): Path<(i32, i32)>,
    Json(req): Json<UpdateUrlSyncRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let sync = services::update_url_sync(db.pool(), competition_id, url_sync_id, &req).await?;

    Ok(Json(sync).into_response())
}

#[utoipa::path(
    post,
    path = "/api/manager/competitions/{competition_id}/standings/recalculate",
    params(
        ("competition_id" = i32, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Standings recomputed from stored results", body = RecalculateResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "manager"
)]
pub async fn recalculate_standings(
    State(db): State<Database>,
    Path(competition_id): Path<i32>,
) -> Result<Json<RecalculateResponse>, WebError> {
    let response = services::recalculate_standings(db.pool(), competition_id).await?;

    Ok(Json(response))
}
