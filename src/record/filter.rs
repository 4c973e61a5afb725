//! Filtering and ordering the record list.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::DatabaseId,
    record::{
        CashFlowRecord,
        db::{RECORD_COLUMNS, map_record_row},
    },
    taxonomy::{
        CategoryId, RecordTypeId, StatusId, SubCategoryId, TaxonomyKind, get_entry,
    },
};

/// Which records to list. Every field is optional; an empty filter matches
/// every record.
///
/// The date bounds are inclusive and apply to the effective date, i.e. the
/// custom date if set, otherwise the creation date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<StatusId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<RecordTypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubCategoryId>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self == &RecordFilter::default()
    }

    fn entry_ids(&self) -> [(TaxonomyKind, Option<DatabaseId>); 4] {
        [
            (TaxonomyKind::Status, self.status_id),
            (TaxonomyKind::Type, self.type_id),
            (TaxonomyKind::Category, self.category_id),
            (TaxonomyKind::SubCategory, self.subcategory_id),
        ]
    }
}

/// Get the records that pass `filter`, newest first.
///
/// Records are ordered by creation date, newest first, with ties broken by
/// ID, highest first.
///
/// # Errors
/// Returns [Error::NotFound] if the filter names a status, type, category
/// or subcategory that does not exist.
pub fn query_records(
    filter: &RecordFilter,
    connection: &Connection,
) -> Result<Vec<CashFlowRecord>, Error> {
    for (kind, id) in filter.entry_ids() {
        if let Some(id) = id {
            get_entry(kind, id, connection)?;
        }
    }

    let mut conditions = Vec::new();
    let mut parameters: Vec<Value> = Vec::new();

    if let Some(date_from) = filter.date_from {
        conditions.push("COALESCE(custom_date, created_at) >= ?");
        parameters.push(Value::Text(date_from.to_string()));
    }

    if let Some(date_to) = filter.date_to {
        conditions.push("COALESCE(custom_date, created_at) <= ?");
        parameters.push(Value::Text(date_to.to_string()));
    }

    let id_columns = [
        ("status_id = ?", filter.status_id),
        ("type_id = ?", filter.type_id),
        ("category_id = ?", filter.category_id),
        ("subcategory_id = ?", filter.subcategory_id),
    ];

    for (condition, id) in id_columns {
        if let Some(id) = id {
            conditions.push(condition);
            parameters.push(Value::Integer(id));
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let query = format!(
        "SELECT {RECORD_COLUMNS} FROM record {where_clause} ORDER BY created_at DESC, id DESC"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters), map_record_row)?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}
