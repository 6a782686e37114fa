use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use rust_embed::Embed;

use crate::settings::VIEWER_PAGE;

/// Assets compiled into the binary, used when no on-disk copy exists
#[derive(Embed)]
#[folder = "static/"]
struct Assets;

pub async fn embedded_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// The bundled viewer page, under `index_page` or its default name
pub fn embedded_viewer(index_page: &str) -> Response {
    match Assets::get(index_page).or_else(|| Assets::get(VIEWER_PAGE)) {
        Some(content) => Html(String::from_utf8_lossy(&content.data).to_string()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
