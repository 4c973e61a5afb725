//! Defines the app level error type and conversions to rendered HTML pages, alerts and JSON.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError,
    record::ValidationErrors, taxonomy::TaxonomyKind,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An empty string was used to name a status, type, category or subcategory.
    #[error("Name cannot be empty")]
    EmptyName,

    /// A name was longer than the maximum number of characters.
    #[error("Name cannot be longer than {0} characters")]
    NameTooLong(usize),

    /// The name is already used by another entry of the same kind (and parent).
    #[error("An entry with this name already exists")]
    DuplicateName,

    /// A category or subcategory was submitted without a parent.
    ///
    /// The wrapped kind is the kind of the parent, e.g. [TaxonomyKind::Type]
    /// for a category.
    #[error("Choose a {0}")]
    MissingParent(TaxonomyKind),

    /// The entry is referenced by at least one record.
    ///
    /// Deleting (or moving) the entry would leave records pointing at
    /// something that no longer exists, so the operation is refused.
    #[error("the {0} is used by one or more records")]
    EntityInUse(TaxonomyKind),

    /// One or more fields of a submitted record failed validation.
    #[error("the record is invalid: {0}")]
    Validation(ValidationErrors),

    /// Tried to update a taxonomy entry that does not exist
    #[error("tried to update a {0} that is not in the database")]
    UpdateMissingEntry(TaxonomyKind),

    /// Tried to delete a taxonomy entry that does not exist
    #[error("tried to delete a {0} that is not in the database")]
    DeleteMissingEntry(TaxonomyKind),

    /// Tried to update a record that does not exist
    #[error("tried to update a record that is not in the database")]
    UpdateMissingRecord,

    /// Tried to delete a record that does not exist
    #[error("tried to delete a record that is not in the database")]
    DeleteMissingRecord,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(error, _)
                if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateName
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::UpdateMissingRecord | Error::UpdateMissingEntry(_) => {
                NotFoundError.into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::EntityInUse(kind) => (
                StatusCode::CONFLICT,
                Alert::Warning {
                    message: format!("Could not delete {kind}"),
                    details: format!(
                        "This {kind} is still used by one or more records. \
                        Change or delete those records first."
                    ),
                },
            ),
            Error::UpdateMissingRecord => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update record".to_owned(),
                    details: "The record could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingRecord => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete record".to_owned(),
                    details: "The record could not be found. \
                    Try refreshing the page to see if the record has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingEntry(kind) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not update {kind}"),
                    details: format!("The {kind} could not be found."),
                },
            ),
            Error::DeleteMissingEntry(kind) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not delete {kind}"),
                    details: format!(
                        "The {kind} could not be found. \
                        Try refreshing the page to see if the {kind} has already been deleted."
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }

    /// Convert the error into an HTTP response with a JSON body.
    pub fn into_json_response(self) -> Response {
        ApiError(self).into_response()
    }

    /// The HTTP status code used when the error is returned from the JSON API.
    fn json_status_code(&self) -> StatusCode {
        match self {
            Error::NotFound
            | Error::UpdateMissingEntry(_)
            | Error::DeleteMissingEntry(_)
            | Error::UpdateMissingRecord
            | Error::DeleteMissingRecord => StatusCode::NOT_FOUND,
            Error::EmptyName | Error::NameTooLong(_) | Error::MissingParent(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::DuplicateName | Error::EntityInUse(_) => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::SqlError(_) | Error::InvalidTimezoneError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A field level error in a JSON error body.
#[derive(Debug, Serialize)]
struct FieldErrorBody {
    field: &'static str,
    message: String,
}

/// The body of an error response from the JSON API.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldErrorBody>,
}

/// Wraps [Error] so that JSON API handlers respond with a JSON error body
/// instead of an HTML page.
#[derive(Debug, PartialEq)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.0;
        let status_code = error.json_status_code();

        let body = match error {
            Error::Validation(errors) => ErrorBody {
                error: "The record is invalid".to_owned(),
                fields: errors
                    .iter()
                    .map(|field_error| FieldErrorBody {
                        field: field_error.field.as_str(),
                        message: field_error.error.to_string(),
                    })
                    .collect(),
            },
            error if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorBody {
                    error: "An internal error occurred".to_owned(),
                    fields: Vec::new(),
                }
            }
            error => ErrorBody {
                error: error.to_string(),
                fields: Vec::new(),
            },
        };

        (status_code, Json(body)).into_response()
    }
}
