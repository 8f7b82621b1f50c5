pub mod manager;
pub mod pages;
pub mod results;
pub mod teams;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Serves PDF bytes as a downloadable attachment.
pub(crate) fn pdf_attachment(file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}
