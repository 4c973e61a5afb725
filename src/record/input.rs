//! Turns a submitted record into a validated [NewRecord].

use std::str::FromStr;

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    database_id::DatabaseId,
    record::{
        NewRecord,
        validation::{
            MAX_AMOUNT_DECIMAL_PLACES, RecordDraft, RecordField, ValidationError,
            ValidationErrors, validate_record,
        },
    },
    taxonomy::{
        CategoryId, RecordTypeId, StatusId, SubCategoryId, TaxonomyKind, get_category,
        get_record_type, get_status, get_subcategory,
    },
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// An amount as submitted: text from a form, or a number or string from JSON.
///
/// It is parsed during validation so that a malformed amount is reported
/// alongside the other field errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAmount {
    Number(serde_json::Number),
    Text(String),
}

impl SubmittedAmount {
    fn parse(&self) -> Option<Decimal> {
        match self {
            SubmittedAmount::Number(number) => Decimal::from_str(&number.to_string()).ok(),
            SubmittedAmount::Text(text) => Decimal::from_str(text.trim()).ok(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, SubmittedAmount::Text(text) if text.trim().is_empty())
    }
}

impl From<Decimal> for SubmittedAmount {
    fn from(amount: Decimal) -> Self {
        SubmittedAmount::Text(amount.to_string())
    }
}

/// The fields of a record as submitted through the form or the JSON API.
///
/// Empty form fields are `None`. The custom date is kept as text so that a
/// malformed date is reported as a field error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordInput {
    #[serde(default)]
    pub custom_date: Option<String>,
    #[serde(default)]
    pub status_id: Option<StatusId>,
    #[serde(default)]
    pub type_id: Option<RecordTypeId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub subcategory_id: Option<SubCategoryId>,
    #[serde(default)]
    pub amount: Option<SubmittedAmount>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RecordInput {
    /// Look up the submitted IDs and check every rule, collecting all problems.
    ///
    /// `today` is the local date used to reject custom dates in the future.
    ///
    /// # Errors
    /// Returns [Error::Validation] with every field error, or another error
    /// if the database could not be read.
    pub fn validate(&self, today: Date, connection: &Connection) -> Result<NewRecord, Error> {
        let mut errors = ValidationErrors::default();

        let status = resolve(
            self.status_id,
            RecordField::Status,
            TaxonomyKind::Status,
            false,
            &mut errors,
            |id| get_status(id, connection),
        )?;
        let record_type = resolve(
            self.type_id,
            RecordField::Type,
            TaxonomyKind::Type,
            true,
            &mut errors,
            |id| get_record_type(id, connection),
        )?;
        let category = resolve(
            self.category_id,
            RecordField::Category,
            TaxonomyKind::Category,
            true,
            &mut errors,
            |id| get_category(id, connection),
        )?;
        let subcategory = resolve(
            self.subcategory_id,
            RecordField::SubCategory,
            TaxonomyKind::SubCategory,
            true,
            &mut errors,
            |id| get_subcategory(id, connection),
        )?;

        let custom_date = match self.custom_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => {
                let parsed = Date::parse(text, DATE_FORMAT).ok();

                if parsed.is_none() {
                    errors.push(RecordField::CustomDate, ValidationError::InvalidDate);
                }

                parsed
            }
        };

        let amount = match &self.amount {
            None => None,
            Some(amount) if amount.is_blank() => None,
            Some(amount) => {
                let parsed = amount.parse();

                if parsed.is_none() {
                    errors.push(RecordField::Amount, ValidationError::InvalidAmount);
                }

                parsed
            }
        };

        if self.amount.as_ref().is_none_or(SubmittedAmount::is_blank) {
            errors.push(RecordField::Amount, ValidationError::Missing);
        }

        let comment = self
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
            .map(str::to_owned);

        let draft = RecordDraft {
            custom_date,
            status,
            record_type,
            category,
            subcategory,
            amount,
            comment,
        };

        for field_error in validate_record(&draft, today).iter() {
            errors.push(field_error.field, field_error.error.clone());
        }

        match draft {
            RecordDraft {
                custom_date,
                status,
                record_type: Some(record_type),
                category: Some(category),
                subcategory: Some(subcategory),
                amount: Some(mut amount),
                comment,
            } if errors.is_empty() => {
                amount.rescale(MAX_AMOUNT_DECIMAL_PLACES);

                Ok(NewRecord {
                    custom_date,
                    status_id: status.map(|status| status.id),
                    type_id: record_type.id,
                    category_id: category.id,
                    subcategory_id: subcategory.id,
                    amount,
                    comment,
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// Look up an optional ID, recording a field error if it is required but
/// missing or does not exist.
fn resolve<T>(
    id: Option<DatabaseId>,
    field: RecordField,
    kind: TaxonomyKind,
    required: bool,
    errors: &mut ValidationErrors,
    lookup: impl FnOnce(DatabaseId) -> Result<T, Error>,
) -> Result<Option<T>, Error> {
    let Some(id) = id else {
        if required {
            errors.push(field, ValidationError::Missing);
        }

        return Ok(None);
    };

    match lookup(id) {
        Ok(entry) => Ok(Some(entry)),
        Err(Error::NotFound) => {
            errors.push(field, ValidationError::NotFound(kind));
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
