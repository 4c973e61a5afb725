//! Core cash flow record types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    database_id::DatabaseId,
    taxonomy::{CategoryId, RecordTypeId, StatusId, SubCategoryId},
};

/// Database identifier for a record.
pub type RecordId = DatabaseId;

/// A single cash flow movement, e.g. a salary payment or a grocery bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowRecord {
    pub id: RecordId,
    /// The local date the record was created, set once on creation.
    pub created_at: Date,
    /// The date the money moved, when it differs from the creation date.
    pub custom_date: Option<Date>,
    pub status_id: Option<StatusId>,
    pub type_id: RecordTypeId,
    pub category_id: CategoryId,
    pub subcategory_id: SubCategoryId,
    pub amount: Decimal,
    pub comment: Option<String>,
}

impl CashFlowRecord {
    /// The date used for filtering and display: the custom date if set,
    /// otherwise the creation date.
    pub fn effective_date(&self) -> Date {
        self.custom_date.unwrap_or(self.created_at)
    }
}

/// The user editable fields of a record after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// The date the money moved, if not the creation date.
    pub custom_date: Option<Date>,
    /// An optional status, e.g. "Business".
    pub status_id: Option<StatusId>,
    /// The record's type, e.g. "Income".
    pub type_id: RecordTypeId,
    /// A category of `type_id`.
    pub category_id: CategoryId,
    /// A subcategory of `category_id`.
    pub subcategory_id: SubCategoryId,
    /// The non-negative amount of money.
    pub amount: Decimal,
    pub comment: Option<String>,
}

/// The JSON representation of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordJson {
    pub id: RecordId,
    pub created_at: Date,
    pub custom_date: Option<Date>,
    pub effective_date: Date,
    pub status_id: Option<StatusId>,
    pub type_id: RecordTypeId,
    pub category_id: CategoryId,
    pub subcategory_id: SubCategoryId,
    /// Serialized as a string so no precision is lost, e.g. "1500.00".
    pub amount: Decimal,
    pub comment: Option<String>,
}

impl From<CashFlowRecord> for RecordJson {
    fn from(record: CashFlowRecord) -> Self {
        Self {
            effective_date: record.effective_date(),
            id: record.id,
            created_at: record.created_at,
            custom_date: record.custom_date,
            status_id: record.status_id,
            type_id: record.type_id,
            category_id: record.category_id,
            subcategory_id: record.subcategory_id,
            amount: record.amount,
            comment: record.comment,
        }
    }
}
