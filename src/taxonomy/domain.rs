//! Core taxonomy domain types: statuses, types, categories and subcategories.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize, ser::SerializeStruct};

use crate::{Error, database_id::DatabaseId};

/// The maximum number of characters in the name of a directory entry.
pub const MAX_NAME_LENGTH: usize = 100;

/// A validated, non-empty name for a status, type, category or subcategory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Create a name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is blank
    /// and [Error::NameTooLong] if it is longer than [MAX_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Err(Error::NameTooLong(MAX_NAME_LENGTH))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a name without validation.
    ///
    /// The caller should ensure that the string is trimmed, not empty and
    /// at most [MAX_NAME_LENGTH] characters long.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityName::new(s)
    }
}

impl Display for EntityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a status.
pub type StatusId = DatabaseId;
/// Database identifier for a record type.
pub type RecordTypeId = DatabaseId;
/// Database identifier for a category.
pub type CategoryId = DatabaseId;
/// Database identifier for a subcategory.
pub type SubCategoryId = DatabaseId;

/// The four kinds of directory entry used to classify records.
///
/// In URLs each kind is written in the plural, e.g. `/api/categories`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxonomyKind {
    /// An administrative state, e.g. "Business" or "Personal".
    #[serde(rename = "statuses")]
    Status,
    /// The direction of the money, e.g. "Income" or "Expense".
    #[serde(rename = "types")]
    Type,
    /// A category, which belongs to exactly one type.
    #[serde(rename = "categories")]
    Category,
    /// A subcategory, which belongs to exactly one category.
    #[serde(rename = "subcategories")]
    SubCategory,
}

impl TaxonomyKind {
    /// Every kind, in the order they are shown in the directories page.
    pub const ALL: [TaxonomyKind; 4] = [
        TaxonomyKind::Status,
        TaxonomyKind::Type,
        TaxonomyKind::Category,
        TaxonomyKind::SubCategory,
    ];

    /// The plural name used in URLs.
    pub fn path_segment(self) -> &'static str {
        match self {
            TaxonomyKind::Status => "statuses",
            TaxonomyKind::Type => "types",
            TaxonomyKind::Category => "categories",
            TaxonomyKind::SubCategory => "subcategories",
        }
    }

    /// The capitalized singular name, e.g. "Subcategory".
    pub fn title(self) -> &'static str {
        match self {
            TaxonomyKind::Status => "Status",
            TaxonomyKind::Type => "Type",
            TaxonomyKind::Category => "Category",
            TaxonomyKind::SubCategory => "Subcategory",
        }
    }

    /// The capitalized plural name, e.g. "Subcategories".
    pub fn plural_title(self) -> &'static str {
        match self {
            TaxonomyKind::Status => "Statuses",
            TaxonomyKind::Type => "Types",
            TaxonomyKind::Category => "Categories",
            TaxonomyKind::SubCategory => "Subcategories",
        }
    }

    /// The kind an entry of this kind must belong to, if any.
    pub fn parent(self) -> Option<TaxonomyKind> {
        match self {
            TaxonomyKind::Status | TaxonomyKind::Type => None,
            TaxonomyKind::Category => Some(TaxonomyKind::Type),
            TaxonomyKind::SubCategory => Some(TaxonomyKind::Category),
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            TaxonomyKind::Status => "status",
            TaxonomyKind::Type => "record_type",
            TaxonomyKind::Category => "category",
            TaxonomyKind::SubCategory => "subcategory",
        }
    }

    /// The column holding the parent's id, also used as the JSON key.
    pub(crate) fn parent_column(self) -> Option<&'static str> {
        match self {
            TaxonomyKind::Status | TaxonomyKind::Type => None,
            TaxonomyKind::Category => Some("type_id"),
            TaxonomyKind::SubCategory => Some("category_id"),
        }
    }
}

impl Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaxonomyKind::Status => "status",
            TaxonomyKind::Type => "type",
            TaxonomyKind::Category => "category",
            TaxonomyKind::SubCategory => "subcategory",
        };

        write!(f, "{name}")
    }
}

/// An administrative state a record can be in, e.g. "Business".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Status {
    pub id: StatusId,
    pub name: EntityName,
}

/// The direction of a cash flow, e.g. "Income" or "Expense".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct RecordType {
    pub id: RecordTypeId,
    pub name: EntityName,
}

/// A category, e.g. "Salary", that belongs to one [RecordType].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: EntityName,
    pub type_id: RecordTypeId,
}

/// A subcategory, e.g. "Bonus", that belongs to one [Category].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub name: EntityName,
    pub category_id: CategoryId,
}

/// A directory entry of any kind.
///
/// Used where the four kinds are managed the same way, e.g. the directories
/// page and the JSON API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    /// Which of the four kinds this entry is.
    pub kind: TaxonomyKind,
    /// The entry's ID, unique within its kind.
    pub id: DatabaseId,
    /// The entry's display name.
    pub name: EntityName,
    /// The id of the type (for categories) or category (for subcategories).
    pub parent_id: Option<DatabaseId>,
}

/// Serialized with the parent under its kind specific key, e.g.
/// `{"id": 1, "name": "Salary", "type_id": 1}` for a category.
impl Serialize for TaxonomyEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let parent_column = self.kind.parent_column();
        let field_count = if parent_column.is_some() { 3 } else { 2 };

        let mut state = serializer.serialize_struct("TaxonomyEntry", field_count)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;

        if let Some(parent_column) = parent_column {
            state.serialize_field(parent_column, &self.parent_id)?;
        }

        state.end()
    }
}

/// Form and JSON data for creating and editing a directory entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryInput {
    pub name: String,
    /// The type of a category or the category of a subcategory.
    ///
    /// Ignored for statuses and types.
    #[serde(default, alias = "type_id", alias = "category_id")]
    pub parent_id: Option<DatabaseId>,
}


#[cfg(test)]
mod taxonomy_entry_tests {
    use serde_json::json;

    use crate::taxonomy::{EntityName, EntryInput, TaxonomyEntry, TaxonomyKind};

    #[test]
    fn category_serializes_type_id() {
        let entry = TaxonomyEntry {
            kind: TaxonomyKind::Category,
            id: 3,
            name: EntityName::new_unchecked("Salary"),
            parent_id: Some(1),
        };

        let got = serde_json::to_value(&entry).unwrap();

        assert_eq!(got, json!({"id": 3, "name": "Salary", "type_id": 1}));
    }

    #[test]
    fn status_has_no_parent_key() {
        let entry = TaxonomyEntry {
            kind: TaxonomyKind::Status,
            id: 1,
            name: EntityName::new_unchecked("Business"),
            parent_id: None,
        };

        let got = serde_json::to_value(&entry).unwrap();

        assert_eq!(got, json!({"id": 1, "name": "Business"}));
    }

    #[test]
    fn input_accepts_kind_specific_parent_key() {
        let input: EntryInput =
            serde_json::from_value(json!({"name": "Bonus", "category_id": 4})).unwrap();

        assert_eq!(input.parent_id, Some(4));
    }

    #[test]
    fn kind_parses_from_path_segment() {
        let kind: TaxonomyKind = serde_json::from_value(json!("subcategories")).unwrap();

        assert_eq!(kind, TaxonomyKind::SubCategory);
    }
}
