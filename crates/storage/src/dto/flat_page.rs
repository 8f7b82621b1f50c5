use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FlatPageQuery {
    pub competition: Option<i32>,
    pub language: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveFlatPageRequest {
    #[validate(length(min = 1, max = 255))]
    #[validate(custom(function = "validate_page_url"))]
    pub url: String,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub enable_comments: bool,

    pub competition_id: Option<i32>,

    #[serde(default)]
    pub ordering: i32,

    #[serde(default = "default_published")]
    pub is_published: bool,

    #[validate(length(min = 2, max = 8))]
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_published() -> bool {
    true
}

fn default_language() -> String {
    "lv".to_string()
}

fn validate_page_url(url: &str) -> Result<(), validator::ValidationError> {
    let is_valid = url.starts_with('/')
        && url.ends_with('/')
        && url
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '/' || c == '-' || c == '_');

    if is_valid {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_page_url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_requires_slashes() {
        assert!(validate_page_url("/about/").is_ok());
        assert!(validate_page_url("/seb-mtb/rules/").is_ok());
        assert!(validate_page_url("about/").is_err());
        assert!(validate_page_url("/about").is_err());
        assert!(validate_page_url("/ab out/").is_err());
    }
}
