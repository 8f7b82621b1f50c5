use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUrlSyncRequest {
    #[validate(length(min = 1, max = 64))]
    pub kind: String,
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    #[validate(url(message = "current_url must be a valid URL"))]
    pub current_url: Option<String>,
    pub sync_index: i32,
    pub expires: Option<chrono::NaiveDateTime>,
}
