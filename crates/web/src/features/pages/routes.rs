use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{create_page, get_page, list_pages, update_page};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/pages", post(create_page))
        .route("/pages/:page_id", put(update_page))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/pages", get(list_pages))
        .route("/pages/:page_id", get(get_page))
        .merge(protected)
}
