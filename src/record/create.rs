//! The page and htmx endpoint for creating a record.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
// axum_extra's Form parses empty fields as None instead of rejecting the request.
use axum_extra::extract::Form;

use crate::{
    Error,
    record::{
        RecordInput, ValidationErrors, create_record,
        form::{
            FormAction, RecordChoices, RecordForm, RecordFormState, RecordFormValues, record_page,
            submission_response,
        },
    },
    timezone::current_local_date,
};

/// Render the page for creating a record.
pub async fn get_new_record_page(State(state): State<RecordFormState>) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let values = RecordFormValues::default();
    let choices = match RecordChoices::load(&values, &connection) {
        Ok(choices) => choices,
        Err(error) => return error.into_response(),
    };

    let form = RecordForm {
        action: FormAction::Create,
        values: &values,
        choices: &choices,
        errors: &ValidationErrors::default(),
        max_date: today,
    }
    .into_markup();

    record_page("New Record", form).into_response()
}

/// Validate and store a record, stamping it with today's local date.
pub async fn create_record_endpoint(
    State(state): State<RecordFormState>,
    Form(input): Form<RecordInput>,
) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = input
        .validate(today, &connection)
        .and_then(|record| create_record(&record, today, &connection));

    if let Ok(record) = &result {
        tracing::info!("Created record {}", record.id);
    }

    submission_response(FormAction::Create, &input, result, today, &connection)
}
