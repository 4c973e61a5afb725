//! Database operations for statuses, types, categories and subcategories.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    database_id::DatabaseId,
    taxonomy::{
        Category, CategoryId, EntityName, RecordType, RecordTypeId, Status, StatusId, SubCategory,
        SubCategoryId, TaxonomyEntry, TaxonomyKind,
    },
};

/// Create a directory entry and return it with its generated ID.
///
/// # Errors
///
/// - [Error::MissingParent] if `kind` needs a parent and `parent_id` is `None`,
/// - [Error::NotFound] if the parent does not exist,
/// - [Error::DuplicateName] if the name is taken within the same scope.
pub fn create_entry(
    kind: TaxonomyKind,
    name: EntityName,
    parent_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<TaxonomyEntry, Error> {
    let parent_id = check_parent(kind, parent_id, connection)?;

    if name_is_taken(kind, &name, parent_id, None, connection)? {
        return Err(Error::DuplicateName);
    }

    match kind.parent_column() {
        Some(parent_column) => connection.execute(
            &format!(
                "INSERT INTO {} (name, {parent_column}) VALUES (?1, ?2);",
                kind.table()
            ),
            (name.as_ref(), parent_id),
        )?,
        None => connection.execute(
            &format!("INSERT INTO {} (name) VALUES (?1);", kind.table()),
            (name.as_ref(),),
        )?,
    };

    let id = connection.last_insert_rowid();

    Ok(TaxonomyEntry {
        kind,
        id,
        name,
        parent_id,
    })
}

/// Retrieve a single directory entry by ID.
pub fn get_entry(
    kind: TaxonomyKind,
    id: DatabaseId,
    connection: &Connection,
) -> Result<TaxonomyEntry, Error> {
    connection
        .prepare(&format!(
            "SELECT id, name, {} FROM {} WHERE id = :id;",
            kind.parent_column().unwrap_or("NULL"),
            kind.table()
        ))?
        .query_row(&[(":id", &id)], |row| map_entry_row(kind, row))
        .map_err(|error| error.into())
}

/// Retrieve all entries of one kind ordered alphabetically by name, then ID.
pub fn get_all_entries(
    kind: TaxonomyKind,
    connection: &Connection,
) -> Result<Vec<TaxonomyEntry>, Error> {
    connection
        .prepare(&format!(
            "SELECT id, name, {} FROM {} ORDER BY name ASC, id ASC;",
            kind.parent_column().unwrap_or("NULL"),
            kind.table()
        ))?
        .query_map([], |row| map_entry_row(kind, row))?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Rename a directory entry and, for categories and subcategories, move it
/// to a different parent.
///
/// Moving an entry that records refer to is refused with
/// [Error::EntityInUse], since those records would end up with a category
/// that does not belong to their type (or the like for subcategories).
///
/// # Errors
///
/// The errors of [create_entry], plus [Error::UpdateMissingEntry] if the
/// entry does not exist and [Error::EntityInUse] as described above.
pub fn update_entry(
    kind: TaxonomyKind,
    id: DatabaseId,
    name: EntityName,
    parent_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<TaxonomyEntry, Error> {
    let current = match get_entry(kind, id, connection) {
        Ok(entry) => entry,
        Err(Error::NotFound) => return Err(Error::UpdateMissingEntry(kind)),
        Err(error) => return Err(error),
    };

    let parent_id = check_parent(kind, parent_id, connection)?;

    if name_is_taken(kind, &name, parent_id, Some(id), connection)? {
        return Err(Error::DuplicateName);
    }

    if parent_id != current.parent_id
        && super::guard::count_dependent_records(kind, id, connection)? > 0
    {
        return Err(Error::EntityInUse(kind));
    }

    let rows_affected = match kind.parent_column() {
        Some(parent_column) => connection.execute(
            &format!(
                "UPDATE {} SET name = ?1, {parent_column} = ?2 WHERE id = ?3",
                kind.table()
            ),
            (name.as_ref(), parent_id, id),
        )?,
        None => connection.execute(
            &format!("UPDATE {} SET name = ?1 WHERE id = ?2", kind.table()),
            (name.as_ref(), id),
        )?,
    };

    if rows_affected == 0 {
        return Err(Error::UpdateMissingEntry(kind));
    }

    Ok(TaxonomyEntry {
        kind,
        id,
        name,
        parent_id,
    })
}

/// Retrieve a single status by ID.
pub fn get_status(id: StatusId, connection: &Connection) -> Result<Status, Error> {
    connection
        .prepare("SELECT id, name FROM status WHERE id = :id;")?
        .query_row(&[(":id", &id)], |row| {
            Ok(Status {
                id: row.get(0)?,
                name: EntityName::new_unchecked(&row.get::<_, String>(1)?),
            })
        })
        .map_err(|error| error.into())
}

/// Retrieve a single record type by ID.
pub fn get_record_type(id: RecordTypeId, connection: &Connection) -> Result<RecordType, Error> {
    connection
        .prepare("SELECT id, name FROM record_type WHERE id = :id;")?
        .query_row(&[(":id", &id)], |row| {
            Ok(RecordType {
                id: row.get(0)?,
                name: EntityName::new_unchecked(&row.get::<_, String>(1)?),
            })
        })
        .map_err(|error| error.into())
}

/// Retrieve a single category by ID.
pub fn get_category(id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, type_id FROM category WHERE id = :id;")?
        .query_row(&[(":id", &id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve a single subcategory by ID.
pub fn get_subcategory(id: SubCategoryId, connection: &Connection) -> Result<SubCategory, Error> {
    connection
        .prepare("SELECT id, name, category_id FROM subcategory WHERE id = :id;")?
        .query_row(&[(":id", &id)], map_subcategory_row)
        .map_err(|error| error.into())
}

/// Initialize the status, record_type, category and subcategory tables and indexes.
///
/// Deleting a type deletes its categories, and deleting a category deletes
/// its subcategories.
pub fn create_taxonomy_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS status (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS record_type (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type_id INTEGER NOT NULL,
            UNIQUE(name, type_id),
            FOREIGN KEY(type_id) REFERENCES record_type(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_type ON category(type_id);

        CREATE TABLE IF NOT EXISTS subcategory (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            UNIQUE(name, category_id),
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_subcategory_category ON subcategory(category_id);",
    )?;

    Ok(())
}

/// Check that `parent_id` names an existing parent when `kind` needs one.
///
/// Returns the parent ID to store, which is always `None` for statuses and types.
fn check_parent(
    kind: TaxonomyKind,
    parent_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<Option<DatabaseId>, Error> {
    let Some(parent_kind) = kind.parent() else {
        return Ok(None);
    };

    let Some(parent_id) = parent_id else {
        return Err(Error::MissingParent(parent_kind));
    };

    get_entry(parent_kind, parent_id, connection)?;

    Ok(Some(parent_id))
}

/// Statuses and types have unique names, categories have unique names
/// within their type and subcategories within their category.
fn name_is_taken(
    kind: TaxonomyKind,
    name: &EntityName,
    parent_id: Option<DatabaseId>,
    excluding_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<bool, Error> {
    let parent_clause = match kind.parent_column() {
        Some(parent_column) => format!("AND {parent_column} IS :parent_id"),
        None => String::new(),
    };

    let query = format!(
        "SELECT id FROM {} WHERE name = :name {parent_clause} AND id IS NOT :excluding_id LIMIT 1;",
        kind.table()
    );

    let mut statement = connection.prepare(&query)?;
    let found_id: Option<DatabaseId> = if kind.parent_column().is_some() {
        statement
            .query_row(
                rusqlite::named_params! {
                    ":name": name.as_ref(),
                    ":parent_id": parent_id,
                    ":excluding_id": excluding_id,
                },
                |row| row.get(0),
            )
            .optional()?
    } else {
        statement
            .query_row(
                rusqlite::named_params! {
                    ":name": name.as_ref(),
                    ":excluding_id": excluding_id,
                },
                |row| row.get(0),
            )
            .optional()?
    };

    Ok(found_id.is_some())
}

fn map_entry_row(kind: TaxonomyKind, row: &Row) -> Result<TaxonomyEntry, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let parent_id = row.get(2)?;

    Ok(TaxonomyEntry {
        kind,
        id,
        name: EntityName::new_unchecked(&raw_name),
        parent_id,
    })
}

pub(crate) fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let type_id = row.get(2)?;

    Ok(Category {
        id,
        name: EntityName::new_unchecked(&raw_name),
        type_id,
    })
}

pub(crate) fn map_subcategory_row(row: &Row) -> Result<SubCategory, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let category_id = row.get(2)?;

    Ok(SubCategory {
        id,
        name: EntityName::new_unchecked(&raw_name),
        category_id,
    })
}
