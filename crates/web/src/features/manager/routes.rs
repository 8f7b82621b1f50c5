use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    build_report, create_result, get_result, get_team, get_url_sync, list_applications,
    list_results, list_teams, list_url_syncs, recalculate_standings, team_applications,
    update_result, update_team, update_url_sync,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route(
            "/manager/competitions/:competition_id/results",
            get(list_results).post(create_result),
        )
        .route(
            "/manager/competitions/:competition_id/results/:result_id",
            get(get_result).put(update_result),
        )
        .route(
            "/manager/competitions/:competition_id/reports",
            post(build_report),
        )
        .route(
            "/manager/competitions/:competition_id/teams",
            get(list_teams),
        )
        .route(
            "/manager/competitions/:competition_id/teams/:team_id",
            get(get_team).put(update_team),
        )
        .route(
            "/manager/competitions/:competition_id/teams/:team_id/applications",
            get(team_applications),
        )
        .route(
            "/manager/competitions/:competition_id/applications",
            get(list_applications),
        )
        .route(
            "/manager/competitions/:competition_id/url-syncs",
            get(list_url_syncs),
        )
        .route(
            "/manager/competitions/:competition_id/url-syncs/:url_sync_id",
            get(get_url_sync).put(update_url_sync),
        )
        .route(
            "/manager/competitions/:competition_id/standings/recalculate",
            post(recalculate_standings),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
