//! Cash flow records: storage, validation, filtering, pages and the JSON API.

mod api;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod filter;
mod form;
mod input;
mod list_page;
pub mod validation;

pub use api::{
    create_record_api, delete_record_api, get_record_api, list_records_api, update_record_api,
};
pub use create::{create_record_endpoint, get_new_record_page};
pub use db::{create_record, create_record_table, delete_record, get_record, update_record};
pub use delete::delete_record_endpoint;
pub use domain::{CashFlowRecord, NewRecord, RecordId, RecordJson};
pub use edit::{get_edit_record_page, update_record_endpoint};
pub use filter::{RecordFilter, query_records};
pub use input::{RecordInput, SubmittedAmount};
pub use list_page::get_records_page;
pub use validation::{RecordField, ValidationError, ValidationErrors};
