//! Pages and htmx endpoints for creating and editing directory entries.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    endpoints::{self, format_entry_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    taxonomy::{
        EntityName, EntryInput, TaxonomyEntry, TaxonomyKind, create_entry, get_all_entries,
        get_entry, update_entry,
    },
};

/// The state needed for the directory entry pages and endpoints.
#[derive(Debug, Clone)]
pub struct EntryFormState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EntryFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Whether the form creates a new entry or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormAction {
    Create,
    Edit(DatabaseId),
}

/// The values and messages to render in the entry form.
struct EntryFormView<'a> {
    kind: TaxonomyKind,
    action: FormAction,
    name: &'a str,
    parent_id: Option<DatabaseId>,
    parent_choices: &'a [(DatabaseId, String)],
    error_message: Option<String>,
}

/// Render the page for creating a directory entry.
pub async fn get_new_entry_page(
    State(state): State<EntryFormState>,
    Path(kind): Path<TaxonomyKind>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let parent_choices = match parent_choices(kind, &connection) {
        Ok(choices) => choices,
        Err(error) => return error.into_response(),
    };

    let form = EntryFormView {
        kind,
        action: FormAction::Create,
        name: "",
        parent_id: None,
        parent_choices: &parent_choices,
        error_message: None,
    };

    entry_page(&format!("New {}", kind.title()), form).into_response()
}

/// Render the page for editing a directory entry.
pub async fn get_edit_entry_page(
    State(state): State<EntryFormState>,
    Path((kind, entry_id)): Path<(TaxonomyKind, DatabaseId)>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let entry = match get_entry(kind, entry_id, &connection) {
        Ok(entry) => entry,
        Err(error) => return error.into_response(),
    };

    let parent_choices = match parent_choices(kind, &connection) {
        Ok(choices) => choices,
        Err(error) => return error.into_response(),
    };

    let form = EntryFormView {
        kind,
        action: FormAction::Edit(entry.id),
        name: entry.name.as_ref(),
        parent_id: entry.parent_id,
        parent_choices: &parent_choices,
        error_message: None,
    };

    entry_page(&format!("Edit {}", kind.title()), form).into_response()
}

/// Handle the form for creating a directory entry.
pub async fn create_entry_endpoint(
    State(state): State<EntryFormState>,
    Path(kind): Path<TaxonomyKind>,
    Form(input): Form<EntryInput>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = EntityName::new(&input.name)
        .and_then(|name| create_entry(kind, name, input.parent_id, &connection));

    submission_response(kind, FormAction::Create, &input, result, &connection)
}

/// Handle the form for editing a directory entry.
pub async fn update_entry_endpoint(
    State(state): State<EntryFormState>,
    Path((kind, entry_id)): Path<(TaxonomyKind, DatabaseId)>,
    Form(input): Form<EntryInput>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = EntityName::new(&input.name)
        .and_then(|name| update_entry(kind, entry_id, name, input.parent_id, &connection));

    submission_response(kind, FormAction::Edit(entry_id), &input, result, &connection)
}

/// Redirect to the directories page on success, otherwise show the form
/// again with the problem or raise an alert.
fn submission_response(
    kind: TaxonomyKind,
    action: FormAction,
    input: &EntryInput,
    result: Result<TaxonomyEntry, Error>,
    connection: &Connection,
) -> Response {
    let error_message = match result {
        Ok(_) => {
            return (
                HxRedirect(endpoints::DIRECTORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response();
        }
        Err(error) => match form_error_message(kind, &error) {
            Some(message) => message,
            None => return error.into_alert_response(),
        },
    };

    let parent_choices = match parent_choices(kind, connection) {
        Ok(choices) => choices,
        Err(error) => return error.into_alert_response(),
    };

    EntryFormView {
        kind,
        action,
        name: &input.name,
        parent_id: input.parent_id,
        parent_choices: &parent_choices,
        error_message: Some(error_message),
    }
    .into_markup()
    .into_response()
}

/// The message to show in the form for errors the user can fix.
fn form_error_message(kind: TaxonomyKind, error: &Error) -> Option<String> {
    match (error, kind.parent()) {
        (Error::EmptyName | Error::NameTooLong(_) | Error::MissingParent(_), _) => {
            Some(format!("Error: {error}"))
        }
        (Error::DuplicateName, Some(parent)) => Some(format!(
            "Error: this {parent} already has a {kind} with this name"
        )),
        (Error::DuplicateName, None) => Some(format!("Error: a {kind} with this name already exists")),
        (Error::NotFound, Some(parent)) => {
            Some(format!("Error: the selected {parent} does not exist"))
        }
        (Error::EntityInUse(_), Some(parent)) => Some(format!(
            "Error: this {kind} is used by records, so it cannot be moved to a different {parent}"
        )),
        _ => None,
    }
}

/// The options for the parent select, labelled with the grandparent for
/// subcategories, e.g. "Salary (Income)".
pub(crate) fn parent_choices(
    kind: TaxonomyKind,
    connection: &Connection,
) -> Result<Vec<(DatabaseId, String)>, Error> {
    let Some(parent_kind) = kind.parent() else {
        return Ok(Vec::new());
    };

    let parents = get_all_entries(parent_kind, connection)?;

    let grandparent_names: HashMap<DatabaseId, String> = match parent_kind.parent() {
        Some(grandparent_kind) => get_all_entries(grandparent_kind, connection)?
            .into_iter()
            .map(|entry| (entry.id, entry.name.to_string()))
            .collect(),
        None => HashMap::new(),
    };

    Ok(parents
        .into_iter()
        .map(|parent| {
            let label = match parent
                .parent_id
                .and_then(|grandparent_id| grandparent_names.get(&grandparent_id))
            {
                Some(grandparent_name) => format!("{} ({grandparent_name})", parent.name),
                None => parent.name.to_string(),
            };

            (parent.id, label)
        })
        .collect())
}

fn entry_page(title: &str, form: EntryFormView) -> Markup {
    let nav_bar = NavBar::new(endpoints::DIRECTORIES_VIEW).into_html();
    let form = form.into_markup();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-bold" { (title) }
            (form)
        }
    };

    base(title, &[], &content)
}

impl EntryFormView<'_> {
    fn into_markup(self) -> Markup {
        let kind = self.kind;
        let (hx_post, hx_put, button_text) = match self.action {
            FormAction::Create => (
                Some(format_entry_endpoint(endpoints::ENTRIES, kind, 0)),
                None,
                format!("Create {}", kind.title()),
            ),
            FormAction::Edit(id) => (
                None,
                Some(format_entry_endpoint(endpoints::ENTRY, kind, id)),
                format!("Update {}", kind.title()),
            ),
        };

        html! {
            form
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-target="this"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                @if let Some(error_message) = &self.error_message {
                    p class=(FORM_ERROR_STYLE) { (error_message) }
                }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder=(format!("{} name", kind.title()))
                        value=(self.name)
                        maxlength="100"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if let Some(parent_kind) = kind.parent() {
                    div
                    {
                        label for="parent_id" class=(FORM_LABEL_STYLE) { (parent_kind.title()) }

                        select
                            id="parent_id"
                            name="parent_id"
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="" selected[self.parent_id.is_none()] {
                                "Select a " (parent_kind.to_string())
                            }

                            @for (id, label) in self.parent_choices {
                                option value=(id) selected[self.parent_id == Some(*id)] { (label) }
                            }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (button_text) }
            }
        }
    }
}

#[cfg(test)]
mod entry_form_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        db::initialize,
        endpoints,
        taxonomy::{
            EntityName, EntryInput, TaxonomyKind, create_entry, get_all_entries, get_entry,
        },
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_input_with_value,
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        EntryFormState, create_entry_endpoint, get_edit_entry_page, get_new_entry_page,
        update_entry_endpoint,
    };

    fn get_state() -> EntryFormState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        EntryFormState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn create(state: &EntryFormState, kind: TaxonomyKind, name: &str, parent: Option<i64>) -> i64 {
        create_entry(
            kind,
            EntityName::new_unchecked(name),
            parent,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create entry")
        .id
    }

    #[tokio::test]
    async fn new_category_page_lists_types() {
        let state = get_state();
        create(&state, TaxonomyKind::Type, "Income", None);
        create(&state, TaxonomyKind::Type, "Expense", None);

        let response = get_new_entry_page(State(state), Path(TaxonomyKind::Category)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/directories/categories", "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_submit_button_with_text(&form, "Create Category");

        let options: Vec<String> = form
            .select(&Selector::parse("select[name=parent_id] option").unwrap())
            .map(|option| option.text().collect())
            .collect();
        assert_eq!(options, ["Select a type", "Expense", "Income"]);
    }

    #[tokio::test]
    async fn new_subcategory_page_labels_categories_with_type() {
        let state = get_state();
        let income = create(&state, TaxonomyKind::Type, "Income", None);
        create(&state, TaxonomyKind::Category, "Salary", Some(income));

        let response = get_new_entry_page(State(state), Path(TaxonomyKind::SubCategory)).await;

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        let labels: Vec<String> = form
            .select(&Selector::parse("select[name=parent_id] option").unwrap())
            .skip(1)
            .map(|option| option.text().collect())
            .collect();
        assert_eq!(labels, ["Salary (Income)"]);
    }

    #[tokio::test]
    async fn new_status_page_has_no_parent_select() {
        let response = get_new_entry_page(State(get_state()), Path(TaxonomyKind::Status)).await;

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert!(form.select(&Selector::parse("select").unwrap()).next().is_none());
    }

    #[tokio::test]
    async fn can_create_entry() {
        let state = get_state();
        let income = create(&state, TaxonomyKind::Type, "Income", None);
        let input = EntryInput {
            name: " Salary ".to_owned(),
            parent_id: Some(income),
        };

        let response = create_entry_endpoint(
            State(state.clone()),
            Path(TaxonomyKind::Category),
            Form(input),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DIRECTORIES_VIEW);
        let categories =
            get_all_entries(TaxonomyKind::Category, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Salary");
        assert_eq!(categories[0].parent_id, Some(income));
    }

    #[tokio::test]
    async fn create_fails_on_empty_name() {
        let input = EntryInput {
            name: "  ".to_owned(),
            parent_id: None,
        };

        let response =
            create_entry_endpoint(State(get_state()), Path(TaxonomyKind::Status), Form(input))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Name cannot be empty");
    }

    #[tokio::test]
    async fn create_fails_on_duplicate_name() {
        let state = get_state();
        create(&state, TaxonomyKind::Type, "Income", None);
        let input = EntryInput {
            name: "Income".to_owned(),
            parent_id: None,
        };

        let response =
            create_entry_endpoint(State(state), Path(TaxonomyKind::Type), Form(input)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: a type with this name already exists");
        assert_form_input_with_value(&form, "name", "text", "Income");
    }

    #[tokio::test]
    async fn create_subcategory_without_category_fails() {
        let input = EntryInput {
            name: "Bonus".to_owned(),
            parent_id: None,
        };

        let response = create_entry_endpoint(
            State(get_state()),
            Path(TaxonomyKind::SubCategory),
            Form(input),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Choose a category");
    }

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let state = get_state();
        let income = create(&state, TaxonomyKind::Type, "Income", None);
        let salary = create(&state, TaxonomyKind::Category, "Salary", Some(income));

        let response = get_edit_entry_page(
            State(state),
            Path((TaxonomyKind::Category, salary)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format!("/directories/categories/{salary}"),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Salary");
        let selected = form
            .select(&Selector::parse("option[selected]").unwrap())
            .next()
            .expect("No selected option");
        assert_eq!(selected.value().attr("value"), Some(income.to_string().as_str()));
    }

    #[tokio::test]
    async fn edit_page_for_missing_entry_is_not_found() {
        let response =
            get_edit_entry_page(State(get_state()), Path((TaxonomyKind::Status, 42))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn can_update_entry() {
        let state = get_state();
        let status = create(&state, TaxonomyKind::Status, "Personl", None);
        let input = EntryInput {
            name: "Personal".to_owned(),
            parent_id: None,
        };

        let response = update_entry_endpoint(
            State(state.clone()),
            Path((TaxonomyKind::Status, status)),
            Form(input),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DIRECTORIES_VIEW);
        let got = get_entry(
            TaxonomyKind::Status,
            status,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(got.name.as_ref(), "Personal");
    }

    #[tokio::test]
    async fn update_missing_entry_raises_alert() {
        let input = EntryInput {
            name: "Personal".to_owned(),
            parent_id: None,
        };

        let response = update_entry_endpoint(
            State(get_state()),
            Path((TaxonomyKind::Status, 42)),
            Form(input),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        let message: String = html
            .select(&Selector::parse("#alert-container p").unwrap())
            .next()
            .expect("No alert message")
            .text()
            .collect();
        assert_eq!(message, "Could not update status");
    }
}
