//! JSON API for statuses, types, categories and subcategories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    error::ApiError,
    taxonomy::{
        EntityName, EntryInput, TaxonomyEntry, TaxonomyKind, create_entry, get_all_entries,
        get_entry, guard::delete_entry, update_entry,
    },
};

/// The state needed for the directory entry API.
#[derive(Debug, Clone)]
pub struct EntryApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EntryApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn lock(db_connection: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
    db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

pub async fn list_entries_api(
    State(state): State<EntryApiState>,
    Path(kind): Path<TaxonomyKind>,
) -> ApiResult<Json<Vec<TaxonomyEntry>>> {
    let connection = lock(&state.db_connection)?;

    Ok(Json(get_all_entries(kind, &connection)?))
}

pub async fn get_entry_api(
    State(state): State<EntryApiState>,
    Path((kind, entry_id)): Path<(TaxonomyKind, DatabaseId)>,
) -> ApiResult<Json<TaxonomyEntry>> {
    let connection = lock(&state.db_connection)?;

    Ok(Json(get_entry(kind, entry_id, &connection)?))
}

pub async fn create_entry_api(
    State(state): State<EntryApiState>,
    Path(kind): Path<TaxonomyKind>,
    Json(input): Json<EntryInput>,
) -> ApiResult<(StatusCode, Json<TaxonomyEntry>)> {
    let name = EntityName::new(&input.name)?;
    let connection = lock(&state.db_connection)?;
    let entry = create_entry(kind, name, input.parent_id, &connection)?;

    tracing::info!("Created {kind} {} \"{}\"", entry.id, entry.name);

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry_api(
    State(state): State<EntryApiState>,
    Path((kind, entry_id)): Path<(TaxonomyKind, DatabaseId)>,
    Json(input): Json<EntryInput>,
) -> ApiResult<Json<TaxonomyEntry>> {
    let name = EntityName::new(&input.name)?;
    let connection = lock(&state.db_connection)?;

    Ok(Json(update_entry(
        kind,
        entry_id,
        name,
        input.parent_id,
        &connection,
    )?))
}

pub async fn delete_entry_api(
    State(state): State<EntryApiState>,
    Path((kind, entry_id)): Path<(TaxonomyKind, DatabaseId)>,
) -> ApiResult<StatusCode> {
    let connection = lock(&state.db_connection)?;
    delete_entry(kind, entry_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
