//! Narrows category and subcategory choices to those under the selected parent.
//!
//! The record form renders its choices with these functions and the
//! cascade lookup endpoints serve them, so both always agree.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    error::ApiError,
    taxonomy::{
        Category, CategoryId, RecordTypeId, SubCategory,
        db::{map_category_row, map_subcategory_row},
    },
};

/// The categories of the type `type_id`, ordered by name then ID.
///
/// Returns an empty list if `type_id` is `None` or names no type.
pub fn categories_for(
    type_id: Option<RecordTypeId>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let Some(type_id) = type_id else {
        return Ok(Vec::new());
    };

    connection
        .prepare(
            "SELECT id, name, type_id FROM category
            WHERE type_id = ?1
            ORDER BY name ASC, id ASC;",
        )?
        .query_map([type_id], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// The subcategories of the category `category_id`, ordered by name then ID.
///
/// Returns an empty list if `category_id` is `None` or names no category.
pub fn subcategories_for(
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<Vec<SubCategory>, Error> {
    let Some(category_id) = category_id else {
        return Ok(Vec::new());
    };

    connection
        .prepare(
            "SELECT id, name, category_id FROM subcategory
            WHERE category_id = ?1
            ORDER BY name ASC, id ASC;",
        )?
        .query_map([category_id], map_subcategory_row)?
        .map(|maybe_subcategory| maybe_subcategory.map_err(|error| error.into()))
        .collect()
}

/// The state needed for the cascade lookup endpoints.
#[derive(Debug, Clone)]
pub struct CascadeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CascadeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A selectable option in the record form.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: DatabaseId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryChoices {
    pub categories: Vec<Choice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubCategoryChoices {
    pub subcategories: Vec<Choice>,
}

/// Kept as text so that a malformed ID gives an empty list rather than a rejection.
#[derive(Debug, Deserialize)]
pub struct CategoryLookupQuery {
    type_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubCategoryLookupQuery {
    category_id: Option<String>,
}

fn parse_id(raw_id: Option<&str>) -> Option<DatabaseId> {
    raw_id.and_then(|raw_id| raw_id.trim().parse().ok())
}

/// List the categories of a type as JSON.
pub async fn load_categories(
    State(state): State<CascadeState>,
    Query(query): Query<CategoryLookupQuery>,
) -> Result<Json<CategoryChoices>, ApiError> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = categories_for(parse_id(query.type_id.as_deref()), &connection)?
        .into_iter()
        .map(|category| Choice {
            id: category.id,
            name: category.name.to_string(),
        })
        .collect();

    Ok(Json(CategoryChoices { categories }))
}

/// List the subcategories of a category as JSON.
pub async fn load_subcategories(
    State(state): State<CascadeState>,
    Query(query): Query<SubCategoryLookupQuery>,
) -> Result<Json<SubCategoryChoices>, ApiError> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let subcategories = subcategories_for(parse_id(query.category_id.as_deref()), &connection)?
        .into_iter()
        .map(|subcategory| Choice {
            id: subcategory.id,
            name: subcategory.name.to_string(),
        })
        .collect();

    Ok(Json(SubCategoryChoices { subcategories }))
}

#[cfg(test)]
mod cascade_tests {
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        taxonomy::{EntityName, TaxonomyKind, create_entry},
    };

    use super::{categories_for, subcategories_for};

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn create(kind: TaxonomyKind, name: &str, parent_id: Option<i64>, conn: &Connection) -> i64 {
        create_entry(kind, EntityName::new_unchecked(name), parent_id, conn)
            .expect("Could not create entry")
            .id
    }

    #[test]
    fn categories_are_limited_to_type_and_sorted() {
        let connection = get_test_connection();
        let income = create(TaxonomyKind::Type, "Income", None, &connection);
        let expense = create(TaxonomyKind::Type, "Expense", None, &connection);
        create(TaxonomyKind::Category, "Salary", Some(income), &connection);
        create(TaxonomyKind::Category, "Investments", Some(income), &connection);
        create(TaxonomyKind::Category, "Food", Some(expense), &connection);

        let names: Vec<String> = categories_for(Some(income), &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(names, ["Investments", "Salary"]);
    }

    #[test]
    fn absent_or_unknown_parent_gives_nothing() {
        let connection = get_test_connection();
        let income = create(TaxonomyKind::Type, "Income", None, &connection);
        create(TaxonomyKind::Category, "Salary", Some(income), &connection);

        assert!(categories_for(None, &connection).unwrap().is_empty());
        assert!(categories_for(Some(999), &connection).unwrap().is_empty());
        assert!(subcategories_for(None, &connection).unwrap().is_empty());
        assert!(subcategories_for(Some(999), &connection).unwrap().is_empty());
    }

    #[test]
    fn subcategories_are_limited_to_category() {
        let connection = get_test_connection();
        let expense = create(TaxonomyKind::Type, "Expense", None, &connection);
        let food = create(TaxonomyKind::Category, "Food", Some(expense), &connection);
        let transport = create(TaxonomyKind::Category, "Transport", Some(expense), &connection);
        let groceries = create(TaxonomyKind::SubCategory, "Groceries", Some(food), &connection);
        create(TaxonomyKind::SubCategory, "Fuel", Some(transport), &connection);

        let got = subcategories_for(Some(food), &connection).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, groceries);
        assert_eq!(got[0].category_id, food);
    }
}
