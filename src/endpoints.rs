//! The endpoint URIs for pages, htmx fragments and the JSON API.
//!
//! For endpoints that take parameters, e.g., '/records/{record_id}', use
//! [format_endpoint] or [format_entry_endpoint].

use std::fmt::Display;

use crate::taxonomy::TaxonomyKind;

/// The root route which redirects to the records page.
pub const ROOT: &str = "/";
/// The page listing records, and the htmx route for creating one.
pub const RECORDS_VIEW: &str = "/records";
/// The page for creating a new record.
pub const NEW_RECORD_VIEW: &str = "/records/new";
/// The page for editing an existing record.
pub const EDIT_RECORD_VIEW: &str = "/records/{record_id}/edit";
/// The htmx route for updating or deleting a record.
pub const RECORD: &str = "/records/{record_id}";
/// The page listing statuses, types, categories and subcategories.
pub const DIRECTORIES_VIEW: &str = "/directories";
/// The page for creating a new directory entry of a given kind.
pub const NEW_ENTRY_VIEW: &str = "/directories/{kind}/new";
/// The page for editing a directory entry.
pub const EDIT_ENTRY_VIEW: &str = "/directories/{kind}/{entry_id}/edit";
/// The htmx route for creating a directory entry.
pub const ENTRIES: &str = "/directories/{kind}";
/// The htmx route for updating or deleting a directory entry.
pub const ENTRY: &str = "/directories/{kind}/{entry_id}";

/// The categories that belong to a type, as JSON.
pub const LOAD_CATEGORIES: &str = "/ajax/load-categories";
/// The subcategories that belong to a category, as JSON.
pub const LOAD_SUBCATEGORIES: &str = "/ajax/load-subcategories";

/// The JSON route for listing and creating records.
pub const RECORDS_API: &str = "/api/records";
/// The JSON route for a single record.
pub const RECORD_API: &str = "/api/records/{record_id}";
/// The JSON route for listing and creating directory entries of a given kind.
pub const ENTRIES_API: &str = "/api/{kind}";
/// The JSON route for a single directory entry.
pub const ENTRY_API: &str = "/api/{kind}/{entry_id}";

/// Replace the first parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/records/{record_id}', '{record_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}

/// Fill in the `{kind}` and, if present, the id parameter of a directory entry endpoint.
pub fn format_entry_endpoint(endpoint_path: &str, kind: TaxonomyKind, id: i64) -> String {
    format_endpoint(&format_endpoint(endpoint_path, kind.path_segment()), id)
}
