//! JSON API for cash flow records.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    error::ApiError,
    record::{
        RecordFilter, RecordId, RecordInput, RecordJson, create_record, delete_record, get_record,
        query_records, update_record,
    },
    timezone::current_local_date,
};

/// The state needed for the record API.
#[derive(Debug, Clone)]
pub struct RecordApiState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn lock(db_connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

/// List the records matching the filter in the query string, newest first.
pub async fn list_records_api(
    State(state): State<RecordApiState>,
    Query(filter): Query<RecordFilter>,
) -> ApiResult<Json<Vec<RecordJson>>> {
    let connection = lock(&state.db_connection)?;
    let records = query_records(&filter, &connection)?;

    Ok(Json(records.into_iter().map(RecordJson::from).collect()))
}

pub async fn get_record_api(
    State(state): State<RecordApiState>,
    Path(record_id): Path<RecordId>,
) -> ApiResult<Json<RecordJson>> {
    let connection = lock(&state.db_connection)?;

    Ok(Json(get_record(record_id, &connection)?.into()))
}

/// Validate and store a record. Responds with 422 and every field error if
/// the record is invalid.
pub async fn create_record_api(
    State(state): State<RecordApiState>,
    Json(input): Json<RecordInput>,
) -> ApiResult<(StatusCode, Json<RecordJson>)> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = lock(&state.db_connection)?;
    let new_record = input.validate(today, &connection)?;
    let record = create_record(&new_record, today, &connection)?;

    tracing::info!("Created record {}", record.id);

    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn update_record_api(
    State(state): State<RecordApiState>,
    Path(record_id): Path<RecordId>,
    Json(input): Json<RecordInput>,
) -> ApiResult<Json<RecordJson>> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = lock(&state.db_connection)?;
    let new_record = input.validate(today, &connection)?;

    Ok(Json(update_record(record_id, &new_record, &connection)?.into()))
}

pub async fn delete_record_api(
    State(state): State<RecordApiState>,
    Path(record_id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    let connection = lock(&state.db_connection)?;
    delete_record(record_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
