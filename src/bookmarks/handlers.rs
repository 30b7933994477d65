use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use super::BookmarkService;
use crate::error::AppError;
use crate::schema::Bookmark;

/// `GET /bookmarks`
pub async fn list_bookmarks(
    State(service): State<BookmarkService>,
) -> Result<Json<Vec<Bookmark>>, AppError> {
    let bookmarks = service.list().await?;
    info!(count = bookmarks.len(), "Bookmarks listed");
    Ok(Json(bookmarks))
}

/// `GET /bookmarks/{id}`
///
/// The id is taken as a raw string so malformed ids reach the service and
/// come back as 404 instead of a path-rejection 400.
pub async fn get_bookmark(
    State(service): State<BookmarkService>,
    Path(id): Path<String>,
) -> Result<Json<Bookmark>, AppError> {
    let bookmark = service.get(&id).await?;
    info!(bookmark_id = bookmark.id, "Bookmark served");
    Ok(Json(bookmark))
}
