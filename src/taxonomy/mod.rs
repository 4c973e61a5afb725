//! Statuses, types, categories and subcategories used to classify records.
//!
//! Types, categories and subcategories form a tree: every category belongs
//! to one type and every subcategory to one category. Statuses stand alone.

mod api;
mod cascade;
mod db;
mod delete;
mod directory_page;
mod domain;
mod form;
mod guard;

pub use api::{
    create_entry_api, delete_entry_api, get_entry_api, list_entries_api, update_entry_api,
};
pub use cascade::{categories_for, load_categories, load_subcategories, subcategories_for};
pub use db::{
    create_entry, create_taxonomy_tables, get_all_entries, get_category, get_entry,
    get_record_type, get_status, get_subcategory, update_entry,
};
pub use delete::delete_entry_endpoint;
pub use directory_page::get_directories_page;
pub use domain::{
    Category, CategoryId, EntityName, EntryInput, RecordType, RecordTypeId, Status, StatusId,
    SubCategory, SubCategoryId, TaxonomyEntry, TaxonomyKind,
};
pub use form::{
    create_entry_endpoint, get_edit_entry_page, get_new_entry_page, update_entry_endpoint,
};
