use axum::{
    http::{StatusCode, Uri},
    Json,
};

use crate::errors::RequestErrorJson;

mod auth;
mod comments;
mod news;
mod users;

pub use auth::*;
pub use comments::*;
pub use news::*;
pub use users::*;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<RequestErrorJson>) {
    (
        StatusCode::NOT_FOUND,
        Json(RequestErrorJson::new(&format!("URL {} was not found", uri))),
    )
}
