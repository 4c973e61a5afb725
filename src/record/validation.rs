//! Rules every record must satisfy, checked on each create and update.
//!
//! The individual checks take resolved entities rather than raw IDs so they
//! do not depend on storage. [validate_record] runs all of them and collects
//! every failure, so a user can fix all problems in one go.

use std::fmt::Display;

use rust_decimal::Decimal;
use time::Date;

use crate::taxonomy::{Category, RecordType, Status, SubCategory, TaxonomyKind};

/// The most digits allowed before the decimal point of an amount.
pub const MAX_AMOUNT_INTEGER_DIGITS: u32 = 10;
/// The most digits allowed after the decimal point of an amount.
pub const MAX_AMOUNT_DECIMAL_PLACES: u32 = 2;

/// A problem with a single field of a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A category that belongs to another type, or a subcategory that
    /// belongs to another category.
    #[error("the selected {child} does not belong to the selected {parent}")]
    InconsistentTaxonomy {
        child: TaxonomyKind,
        parent: TaxonomyKind,
    },

    /// The custom date is after today.
    #[error("{0} is in the future")]
    FutureDate(Date),

    /// The custom date is not a valid date.
    #[error("the date must be a valid date in the format YYYY-MM-DD")]
    InvalidDate,

    #[error("the amount cannot be negative")]
    NegativeAmount,

    /// The amount is not a number, or has too many digits.
    #[error(
        "the amount must be a number with at most {MAX_AMOUNT_INTEGER_DIGITS} digits before \
        and {MAX_AMOUNT_DECIMAL_PLACES} digits after the decimal point"
    )]
    InvalidAmount,

    /// A required field was left empty.
    #[error("this field is required")]
    Missing,

    /// The submitted ID does not name an existing entry.
    #[error("the selected {0} does not exist")]
    NotFound(TaxonomyKind),
}

/// The fields of a record, named as in forms and JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    CustomDate,
    Status,
    Type,
    Category,
    SubCategory,
    Amount,
    Comment,
}

impl RecordField {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordField::CustomDate => "custom_date",
            RecordField::Status => "status_id",
            RecordField::Type => "type_id",
            RecordField::Category => "category_id",
            RecordField::SubCategory => "subcategory_id",
            RecordField::Amount => "amount",
            RecordField::Comment => "comment",
        }
    }
}

/// A validation error attributed to the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: RecordField,
    pub error: ValidationError,
}

/// Every validation error found in a submitted record, in the order found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: RecordField, error: ValidationError) {
        self.0.push(FieldError { field, error });
    }

    /// Record the error of a check, if it failed.
    pub fn check(&mut self, field: RecordField, result: Result<(), ValidationError>) {
        if let Err(error) = result {
            self.push(field, error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// The first error for `field`, if any.
    pub fn get(&self, field: RecordField) -> Option<&ValidationError> {
        self.0
            .iter()
            .find(|field_error| field_error.field == field)
            .map(|field_error| &field_error.error)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, field_error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }

            write!(f, "{}: {}", field_error.field.as_str(), field_error.error)?;
        }

        Ok(())
    }
}

/// A submitted record with its IDs resolved to entries.
///
/// Fields that were left empty, or whose IDs did not resolve, are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub custom_date: Option<Date>,
    pub status: Option<Status>,
    pub record_type: Option<RecordType>,
    pub category: Option<Category>,
    pub subcategory: Option<SubCategory>,
    pub amount: Option<Decimal>,
    pub comment: Option<String>,
}

/// Check that `category` belongs to `record_type`.
///
/// Passes if either is missing, since that is reported separately.
pub fn validate_category_type_match(
    category: Option<&Category>,
    record_type: Option<&RecordType>,
) -> Result<(), ValidationError> {
    match (category, record_type) {
        (Some(category), Some(record_type)) if category.type_id != record_type.id => {
            Err(ValidationError::InconsistentTaxonomy {
                child: TaxonomyKind::Category,
                parent: TaxonomyKind::Type,
            })
        }
        _ => Ok(()),
    }
}

/// Check that `subcategory` belongs to `category`.
///
/// Passes if either is missing, since that is reported separately.
pub fn validate_subcategory_category_match(
    subcategory: Option<&SubCategory>,
    category: Option<&Category>,
) -> Result<(), ValidationError> {
    match (subcategory, category) {
        (Some(subcategory), Some(category)) if subcategory.category_id != category.id => {
            Err(ValidationError::InconsistentTaxonomy {
                child: TaxonomyKind::SubCategory,
                parent: TaxonomyKind::Category,
            })
        }
        _ => Ok(()),
    }
}

/// Check that `custom_date` is not after `today`. No date is fine.
pub fn validate_custom_date(custom_date: Option<Date>, today: Date) -> Result<(), ValidationError> {
    match custom_date {
        Some(custom_date) if custom_date > today => Err(ValidationError::FutureDate(custom_date)),
        _ => Ok(()),
    }
}

/// Check that `amount` is not negative and fits the stored precision.
///
/// Trailing zeros do not count towards the decimal places, so "10.500" is accepted.
pub fn validate_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::NegativeAmount);
    }

    let integer_limit = Decimal::from(10_i64.pow(MAX_AMOUNT_INTEGER_DIGITS));

    if amount.normalize().scale() > MAX_AMOUNT_DECIMAL_PLACES || amount.trunc() >= integer_limit {
        return Err(ValidationError::InvalidAmount);
    }

    Ok(())
}

/// Run every check on `draft` and collect all failures.
///
/// A mismatched category is reported on the category field and a mismatched
/// subcategory on the subcategory field.
pub fn validate_record(draft: &RecordDraft, today: Date) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    errors.check(
        RecordField::CustomDate,
        validate_custom_date(draft.custom_date, today),
    );
    errors.check(
        RecordField::Category,
        validate_category_type_match(draft.category.as_ref(), draft.record_type.as_ref()),
    );
    errors.check(
        RecordField::SubCategory,
        validate_subcategory_category_match(draft.subcategory.as_ref(), draft.category.as_ref()),
    );

    if let Some(amount) = draft.amount {
        errors.check(RecordField::Amount, validate_amount(amount));
    }

    errors
}
