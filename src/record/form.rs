//! The record form shared by the new and edit record pages.

use std::sync::{Arc, Mutex};

use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, base,
    },
    navigation::NavBar,
    record::{
        CashFlowRecord, RecordId, RecordInput, SubmittedAmount,
        validation::{RecordField, ValidationErrors},
    },
    taxonomy::{TaxonomyKind, categories_for, get_all_entries, subcategories_for},
};

/// The state needed for the new and edit record pages and endpoints.
#[derive(Debug, Clone)]
pub struct RecordFormState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormAction {
    Create,
    Edit(RecordId),
}

/// The values shown in the form fields.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordFormValues {
    pub custom_date: String,
    pub status_id: Option<DatabaseId>,
    pub type_id: Option<DatabaseId>,
    pub category_id: Option<DatabaseId>,
    pub subcategory_id: Option<DatabaseId>,
    pub amount: String,
    pub comment: String,
}

impl From<&RecordInput> for RecordFormValues {
    fn from(input: &RecordInput) -> Self {
        let amount = match &input.amount {
            Some(SubmittedAmount::Text(text)) => text.clone(),
            Some(SubmittedAmount::Number(number)) => number.to_string(),
            None => String::new(),
        };

        Self {
            custom_date: input.custom_date.clone().unwrap_or_default(),
            status_id: input.status_id,
            type_id: input.type_id,
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            amount,
            comment: input.comment.clone().unwrap_or_default(),
        }
    }
}

impl From<&CashFlowRecord> for RecordFormValues {
    fn from(record: &CashFlowRecord) -> Self {
        Self {
            custom_date: record
                .custom_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            status_id: record.status_id,
            type_id: Some(record.type_id),
            category_id: Some(record.category_id),
            subcategory_id: Some(record.subcategory_id),
            amount: record.amount.to_string(),
            comment: record.comment.clone().unwrap_or_default(),
        }
    }
}

/// The options for each select in the form.
///
/// Categories and subcategories are limited to the children of the
/// selected type and category.
#[derive(Debug, Default)]
pub(crate) struct RecordChoices {
    statuses: Vec<(DatabaseId, String)>,
    types: Vec<(DatabaseId, String)>,
    categories: Vec<(DatabaseId, String)>,
    subcategories: Vec<(DatabaseId, String)>,
}

impl RecordChoices {
    pub(crate) fn load(values: &RecordFormValues, connection: &Connection) -> Result<Self, Error> {
        let named = |kind| -> Result<Vec<(DatabaseId, String)>, Error> {
            Ok(get_all_entries(kind, connection)?
                .into_iter()
                .map(|entry| (entry.id, entry.name.to_string()))
                .collect())
        };

        Ok(Self {
            statuses: named(TaxonomyKind::Status)?,
            types: named(TaxonomyKind::Type)?,
            categories: categories_for(values.type_id, connection)?
                .into_iter()
                .map(|category| (category.id, category.name.to_string()))
                .collect(),
            subcategories: subcategories_for(values.category_id, connection)?
                .into_iter()
                .map(|subcategory| (subcategory.id, subcategory.name.to_string()))
                .collect(),
        })
    }
}

pub(crate) struct RecordForm<'a> {
    pub action: FormAction,
    pub values: &'a RecordFormValues,
    pub choices: &'a RecordChoices,
    pub errors: &'a ValidationErrors,
    pub max_date: Date,
}

/// A select for one level of the taxonomy.
struct SelectField<'a> {
    field: RecordField,
    label: &'a str,
    placeholder: &'a str,
    choices: &'a [(DatabaseId, String)],
    selected: Option<DatabaseId>,
    required: bool,
}

fn field_error(errors: &ValidationErrors, field: RecordField) -> Markup {
    html! {
        @if let Some(error) = errors.get(field) {
            p class=(FORM_ERROR_STYLE) data-field-error=(field.as_str()) { (error.to_string()) }
        }
    }
}

fn select_field(select: SelectField<'_>, errors: &ValidationErrors) -> Markup {
    let name = select.field.as_str();

    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (select.label) }

            select
                id=(name)
                name=(name)
                required[select.required]
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[select.selected.is_none()] { (select.placeholder) }

                @for (id, label) in select.choices {
                    option value=(id) selected[select.selected == Some(*id)] { (label) }
                }
            }

            (field_error(errors, select.field))
        }
    }
}

impl RecordForm<'_> {
    pub(crate) fn into_markup(self) -> Markup {
        let (hx_post, hx_put, button_text) = match self.action {
            FormAction::Create => (
                Some(endpoints::RECORDS_VIEW.to_owned()),
                None,
                "Create Record",
            ),
            FormAction::Edit(id) => (
                None,
                Some(format_endpoint(endpoints::RECORD, id)),
                "Update Record",
            ),
        };
        let values = self.values;
        let choices = self.choices;
        let errors = self.errors;

        html! {
            form
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-target="this"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                data-record-form
                data-categories-url=(endpoints::LOAD_CATEGORIES)
                data-subcategories-url=(endpoints::LOAD_SUBCATEGORIES)
                class="w-full space-y-4 md:space-y-6"
            {
                @if !errors.is_empty() {
                    p class=(FORM_ERROR_STYLE) {
                        "Error: the record could not be saved, fix the problems below"
                    }
                }

                (select_field(SelectField {
                    field: RecordField::Type,
                    label: "Type",
                    placeholder: "Select a type",
                    choices: &choices.types,
                    selected: values.type_id,
                    required: true,
                }, errors))

                (select_field(SelectField {
                    field: RecordField::Category,
                    label: "Category",
                    placeholder: "Select a category",
                    choices: &choices.categories,
                    selected: values.category_id,
                    required: true,
                }, errors))

                (select_field(SelectField {
                    field: RecordField::SubCategory,
                    label: "Subcategory",
                    placeholder: "Select a subcategory",
                    choices: &choices.subcategories,
                    selected: values.subcategory_id,
                    required: true,
                }, errors))

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        id="amount"
                        name="amount"
                        type="text"
                        inputmode="decimal"
                        placeholder="0.00"
                        value=(values.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    (field_error(errors, RecordField::Amount))
                }

                (select_field(SelectField {
                    field: RecordField::Status,
                    label: "Status",
                    placeholder: "No status",
                    choices: &choices.statuses,
                    selected: values.status_id,
                    required: false,
                }, errors))

                div
                {
                    label for="custom_date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="custom_date"
                        name="custom_date"
                        type="date"
                        max=(self.max_date.to_string())
                        value=(values.custom_date)
                        class=(FORM_TEXT_INPUT_STYLE);

                    p class="mt-1 text-xs text-gray-500 dark:text-gray-400" {
                        "Leave empty to use the date the record was created."
                    }

                    (field_error(errors, RecordField::CustomDate))
                }

                div
                {
                    label for="comment" class=(FORM_LABEL_STYLE) { "Comment" }

                    textarea
                        id="comment"
                        name="comment"
                        rows="3"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (values.comment)
                    }

                    (field_error(errors, RecordField::Comment))
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (button_text) }
            }
        }
    }
}

/// Wrap the form in a full page that loads the category cascade script.
pub(crate) fn record_page(title: &str, form: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_RECORD_VIEW).into_html();
    let head_elements = [HeadElement::ScriptSource(PreEscaped(
        include_str!("record_form.js").to_owned(),
    ))];

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-bold" { (title) }
            (form)
        }
    };

    base(title, &head_elements, &content)
}

/// Redirect to the records page on success. Validation errors re-render the
/// form with every problem, anything else raises an alert.
pub(crate) fn submission_response(
    action: FormAction,
    input: &RecordInput,
    result: Result<CashFlowRecord, Error>,
    today: Date,
    connection: &Connection,
) -> Response {
    let errors = match result {
        Ok(_) => {
            return (
                HxRedirect(endpoints::RECORDS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response();
        }
        Err(Error::Validation(errors)) => errors,
        Err(error) => {
            tracing::error!("Could not save record: {error}");
            return error.into_alert_response();
        }
    };

    let values = RecordFormValues::from(input);
    let choices = match RecordChoices::load(&values, connection) {
        Ok(choices) => choices,
        Err(error) => return error.into_alert_response(),
    };

    RecordForm {
        action,
        values: &values,
        choices: &choices,
        errors: &errors,
        max_date: today,
    }
    .into_markup()
    .into_response()
}
