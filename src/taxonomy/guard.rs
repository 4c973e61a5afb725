//! Refuses to delete directory entries that records still refer to.

use rusqlite::Connection;

use crate::{Error, database_id::DatabaseId, taxonomy::TaxonomyKind};

/// Count the records that refer to an entry or anything below it.
///
/// A type is referred to by records of that type and by records that use
/// one of its categories or subcategories. Likewise for a category and its
/// subcategories.
pub fn count_dependent_records(
    kind: TaxonomyKind,
    id: DatabaseId,
    connection: &Connection,
) -> Result<u32, Error> {
    let query = match kind {
        TaxonomyKind::Status => "SELECT COUNT(1) FROM record WHERE status_id = ?1",
        TaxonomyKind::Type => {
            "SELECT COUNT(1) FROM record
            WHERE type_id = ?1
                OR category_id IN (SELECT id FROM category WHERE type_id = ?1)
                OR subcategory_id IN (
                    SELECT subcategory.id FROM subcategory
                    INNER JOIN category ON subcategory.category_id = category.id
                    WHERE category.type_id = ?1
                )"
        }
        TaxonomyKind::Category => {
            "SELECT COUNT(1) FROM record
            WHERE category_id = ?1
                OR subcategory_id IN (SELECT id FROM subcategory WHERE category_id = ?1)"
        }
        TaxonomyKind::SubCategory => "SELECT COUNT(1) FROM record WHERE subcategory_id = ?1",
    };

    connection
        .query_row(query, [id], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete a directory entry unless a record refers to it or to anything
/// below it.
///
/// Deleting a type also deletes its categories and their subcategories, and
/// deleting a category deletes its subcategories.
///
/// # Errors
///
/// - [Error::EntityInUse] if any record depends on the entry. Nothing is deleted.
/// - [Error::DeleteMissingEntry] if the entry does not exist.
pub fn delete_entry(
    kind: TaxonomyKind,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    if count_dependent_records(kind, id, &transaction)? > 0 {
        return Err(Error::EntityInUse(kind));
    }

    let rows_affected = transaction
        .execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), [id])
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::EntityInUse(kind),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingEntry(kind));
    }

    transaction.commit()?;

    Ok(())
}
