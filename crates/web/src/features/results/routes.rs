use axum::{Router, routing::get};

use super::handlers::{
    archive, get_competition, get_diploma, list_competitions, list_results, list_standings,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/results/archive", get(archive))
        .route("/competitions", get(list_competitions))
        .route("/competitions/:competition_id", get(get_competition))
        .route("/competitions/:competition_id/results", get(list_results))
        .route(
            "/competitions/:competition_id/standings",
            get(list_standings),
        )
        .route(
            "/competitions/:competition_id/results/:result_id/diploma",
            get(get_diploma),
        )
}
