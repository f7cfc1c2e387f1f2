// /api/file: named JSON blob read/write

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState, ok};
use crate::file_store::FileStore;

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/{name}", get(read_file).post(write_file))
}

fn known(name: &str) -> Result<(), ApiError> {
    if FileStore::is_known(name) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("Unknown file '{}'", name)))
    }
}

async fn read_file(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult {
    known(&name)?;
    ok(state.files.read(&name)?)
}

#[derive(Deserialize)]
struct WriteBody {
    contents: Option<serde_json::Value>,
}

async fn write_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<axum::Json<WriteBody>>,
) -> ApiResult {
    known(&name)?;
    let contents = body
        .and_then(|axum::Json(b)| b.contents)
        .ok_or(ApiError::MissingParams)?;
    state.files.write(&name, &contents)?;
    ok("success")
}
