//! Database queries for cash flow records.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    record::{CashFlowRecord, NewRecord, RecordId},
};

/// The columns selected by every record query, in the order [map_record_row] expects.
pub(crate) const RECORD_COLUMNS: &str = "id, created_at, custom_date, status_id, type_id, \
    category_id, subcategory_id, amount, comment";

/// Store a validated record stamped with `created_at`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if one of the IDs does not refer to an existing entry,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_record(
    record: &NewRecord,
    created_at: Date,
    connection: &Connection,
) -> Result<CashFlowRecord, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO record (created_at, custom_date, status_id, type_id, category_id, \
                subcategory_id, amount, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {RECORD_COLUMNS}"
        ))?
        .query_row(
            (
                created_at,
                record.custom_date,
                record.status_id,
                record.type_id,
                record.category_id,
                record.subcategory_id,
                record.amount.to_string(),
                record.comment.as_deref(),
            ),
            map_record_row,
        )
        .map_err(map_foreign_key_error)
}

/// Retrieve a record by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid record,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_record(id: RecordId, connection: &Connection) -> Result<CashFlowRecord, Error> {
    let record = connection
        .prepare(&format!("SELECT {RECORD_COLUMNS} FROM record WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_record_row)?;

    Ok(record)
}

/// Overwrite the user editable fields of a record. The creation date is kept.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingRecord] if `id` does not refer to a valid record,
/// - [Error::NotFound] if one of the IDs does not refer to an existing entry,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_record(
    id: RecordId,
    record: &NewRecord,
    connection: &Connection,
) -> Result<CashFlowRecord, Error> {
    connection
        .prepare(&format!(
            "UPDATE record
             SET custom_date = ?1, status_id = ?2, type_id = ?3, category_id = ?4,
                subcategory_id = ?5, amount = ?6, comment = ?7
             WHERE id = ?8
             RETURNING {RECORD_COLUMNS}"
        ))?
        .query_row(
            (
                record.custom_date,
                record.status_id,
                record.type_id,
                record.category_id,
                record.subcategory_id,
                record.amount.to_string(),
                record.comment.as_deref(),
                id,
            ),
            map_record_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingRecord,
            error => map_foreign_key_error(error),
        })
}

/// Delete a record by its `id`.
///
/// # Errors
/// Returns [Error::DeleteMissingRecord] if the record does not exist.
pub fn delete_record(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM record WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecord);
    }

    Ok(())
}

/// Create the record table in the database.
///
/// Records keep the entries they refer to alive: deleting a referenced
/// status, type, category or subcategory fails.
pub fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS record (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            custom_date TEXT,
            status_id INTEGER,
            type_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            subcategory_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            comment TEXT,
            FOREIGN KEY(status_id) REFERENCES status(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(type_id) REFERENCES record_type(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(subcategory_id) REFERENCES subcategory(id) ON UPDATE CASCADE ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_record_created_at ON record(created_at, id);
        CREATE INDEX IF NOT EXISTS idx_record_status ON record(status_id);
        CREATE INDEX IF NOT EXISTS idx_record_type ON record(type_id);
        CREATE INDEX IF NOT EXISTS idx_record_category ON record(category_id);
        CREATE INDEX IF NOT EXISTS idx_record_subcategory ON record(subcategory_id);",
    )?;

    Ok(())
}

/// Map a database row to a record.
pub(crate) fn map_record_row(row: &Row) -> Result<CashFlowRecord, rusqlite::Error> {
    let raw_amount: String = row.get(7)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(error))
    })?;

    Ok(CashFlowRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        custom_date: row.get(2)?,
        status_id: row.get(3)?,
        type_id: row.get(4)?,
        category_id: row.get(5)?,
        subcategory_id: row.get(6)?,
        amount,
        comment: row.get(8)?,
    })
}

fn map_foreign_key_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::NotFound,
        error => error.into(),
    }
}
