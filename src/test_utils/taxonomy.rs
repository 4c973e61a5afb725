use rusqlite::Connection;

use crate::{
    database_id::DatabaseId,
    taxonomy::{EntityName, TaxonomyKind, create_entry},
};

/// IDs of a small taxonomy: Income > Salary > Bonus and
/// Expense > Food > Groceries, plus a "Business" status.
pub(crate) struct SampleTaxonomy {
    pub business: DatabaseId,
    pub income: DatabaseId,
    pub expense: DatabaseId,
    pub salary: DatabaseId,
    pub bonus: DatabaseId,
    pub food: DatabaseId,
    pub groceries: DatabaseId,
}

#[track_caller]
pub(crate) fn create_sample_taxonomy(connection: &Connection) -> SampleTaxonomy {
    let create = |kind, name: &str, parent| {
        create_entry(kind, EntityName::new_unchecked(name), parent, connection)
            .expect("Could not create taxonomy entry")
            .id
    };

    let business = create(TaxonomyKind::Status, "Business", None);
    let income = create(TaxonomyKind::Type, "Income", None);
    let expense = create(TaxonomyKind::Type, "Expense", None);
    let salary = create(TaxonomyKind::Category, "Salary", Some(income));
    let bonus = create(TaxonomyKind::SubCategory, "Bonus", Some(salary));
    let food = create(TaxonomyKind::Category, "Food", Some(expense));
    let groceries = create(TaxonomyKind::SubCategory, "Groceries", Some(food));

    SampleTaxonomy {
        business,
        income,
        expense,
        salary,
        bonus,
        food,
        groceries,
    }
}
