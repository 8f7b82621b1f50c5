use axum::{Router, routing::get};

use super::handlers::{get_team, list_teams, team_results, team_standings, teams_by_name};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/competitions/:competition_id/team-results",
            get(team_results),
        )
        .route(
            "/competitions/:competition_id/team-results/by-name",
            get(teams_by_name),
        )
        .route(
            "/competitions/:competition_id/team-standings",
            get(team_standings),
        )
        .route("/competitions/:competition_id/teams", get(list_teams))
        .route("/competitions/:competition_id/teams/:team_id", get(get_team))
}
