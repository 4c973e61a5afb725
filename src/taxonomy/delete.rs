//! The htmx endpoint for deleting directory entries.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    database_id::DatabaseId,
    endpoints,
    taxonomy::{TaxonomyKind, guard::delete_entry},
};

/// The state needed for deleting a directory entry.
#[derive(Debug, Clone)]
pub struct DeleteEntryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete an entry that no record depends on.
///
/// Statuses and subcategories are removed from the page by swapping out
/// their table row. Deleting a type or category also deletes the entries
/// below it, so the page is reloaded instead.
pub async fn delete_entry_endpoint(
    State(state): State<DeleteEntryState>,
    Path((kind, entry_id)): Path<(TaxonomyKind, DatabaseId)>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_entry(kind, entry_id, &connection) {
        Ok(()) if matches!(kind, TaxonomyKind::Type | TaxonomyKind::Category) => (
            HxRedirect(endpoints::DIRECTORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(()) => Alert::SuccessSimple {
            message: format!("{} deleted", kind.title()),
        }
        .into_response(),
        Err(Error::EntityInUse(kind)) => {
            tracing::info!("Refused to delete {kind} {entry_id} since records depend on it");
            Error::EntityInUse(kind).into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not delete {kind} {entry_id}: {error}");
            error.into_alert_response()
        }
    }
}
