//! The page and htmx endpoint for editing a record.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;

use crate::{
    Error,
    record::{
        RecordId, RecordInput, ValidationErrors, get_record, update_record,
        form::{
            FormAction, RecordChoices, RecordForm, RecordFormState, RecordFormValues, record_page,
            submission_response,
        },
    },
    timezone::current_local_date,
};

/// Render the form for editing a record, filled in with its current values.
pub async fn get_edit_record_page(
    State(state): State<RecordFormState>,
    Path(record_id): Path<RecordId>,
) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let record = match get_record(record_id, &connection) {
        Ok(record) => record,
        Err(error) => return error.into_response(),
    };

    let values = RecordFormValues::from(&record);
    let choices = match RecordChoices::load(&values, &connection) {
        Ok(choices) => choices,
        Err(error) => return error.into_response(),
    };

    let form = RecordForm {
        action: FormAction::Edit(record.id),
        values: &values,
        choices: &choices,
        errors: &ValidationErrors::default(),
        max_date: today,
    }
    .into_markup();

    record_page("Edit Record", form).into_response()
}

/// Re-validate and overwrite a record. The creation date is left as is.
pub async fn update_record_endpoint(
    State(state): State<RecordFormState>,
    Path(record_id): Path<RecordId>,
    Form(input): Form<RecordInput>,
) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = input
        .validate(today, &connection)
        .and_then(|record| update_record(record_id, &record, &connection));

    submission_response(
        FormAction::Edit(record_id),
        &input,
        result,
        today,
        &connection,
    )
}

#[cfg(test)]
mod edit_record_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints::{self, format_endpoint},
        record::{
            CashFlowRecord, NewRecord, RecordInput, SubmittedAmount, create_record, get_record,
        },
        test_utils::{
            SampleTaxonomy, assert_field_error, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, create_sample_taxonomy, must_get_form,
            parse_html_document, parse_html_fragment, selected_option,
        },
    };

    use super::{RecordFormState, get_edit_record_page, update_record_endpoint};

    fn get_state() -> (RecordFormState, SampleTaxonomy, CashFlowRecord) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let taxonomy = create_sample_taxonomy(&connection);
        let record = create_record(
            &NewRecord {
                custom_date: Some(date!(2025 - 01 - 31)),
                status_id: Some(taxonomy.business),
                type_id: taxonomy.expense,
                category_id: taxonomy.food,
                subcategory_id: taxonomy.groceries,
                amount: Decimal::new(4250, 2),
                comment: Some("Weekly shop".to_owned()),
            },
            date!(2025 - 02 - 01),
            &connection,
        )
        .expect("Could not create record");

        let state = RecordFormState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, taxonomy, record)
    }

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let (state, taxonomy, record) = get_state();

        let response = get_edit_record_page(State(state), Path(record.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::RECORD, record.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "text", "42.50");
        assert_eq!(
            selected_option(&form, "category_id"),
            Some(taxonomy.food.to_string())
        );
        assert_eq!(
            selected_option(&form, "status_id"),
            Some(taxonomy.business.to_string())
        );
        let comment: String = form
            .select(&Selector::parse("textarea[name=comment]").unwrap())
            .next()
            .expect("No comment field")
            .text()
            .collect();
        assert_eq!(comment, "Weekly shop");
    }

    #[tokio::test]
    async fn edit_page_only_offers_categories_of_the_type() {
        let (state, _, record) = get_state();

        let response = get_edit_record_page(State(state), Path(record.id)).await;

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        let categories: Vec<String> = form
            .select(&Selector::parse("select[name=category_id] option").unwrap())
            .skip(1)
            .map(|option| option.text().collect())
            .collect();
        assert_eq!(categories, ["Food"]);
    }

    #[tokio::test]
    async fn edit_page_for_missing_record_is_not_found() {
        let (state, _, _) = get_state();

        let response = get_edit_record_page(State(state), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let (state, taxonomy, record) = get_state();
        let input = RecordInput {
            custom_date: None,
            status_id: None,
            type_id: Some(taxonomy.income),
            category_id: Some(taxonomy.salary),
            subcategory_id: Some(taxonomy.bonus),
            amount: Some(SubmittedAmount::Text("0".to_owned())),
            comment: None,
        };

        let response =
            update_record_endpoint(State(state.clone()), Path(record.id), Form(input)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::RECORDS_VIEW);
        let updated = get_record(record.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.created_at, record.created_at);
        assert_eq!(updated.type_id, taxonomy.income);
        assert_eq!(updated.amount, Decimal::ZERO);
        assert_eq!(updated.status_id, None);
        assert_eq!(updated.effective_date(), date!(2025 - 02 - 01));
    }

    #[tokio::test]
    async fn invalid_update_changes_nothing() {
        let (state, taxonomy, record) = get_state();
        let input = RecordInput {
            type_id: Some(taxonomy.income),
            category_id: Some(taxonomy.food),
            subcategory_id: Some(taxonomy.groceries),
            amount: Some(SubmittedAmount::Text("12.345".to_owned())),
            ..Default::default()
        };

        let response =
            update_record_endpoint(State(state.clone()), Path(record.id), Form(input)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_field_error(
            &form,
            "category_id",
            "the selected category does not belong to the selected type",
        );
        assert_field_error(
            &form,
            "amount",
            "the amount must be a number with at most 10 digits before and 2 digits after \
            the decimal point",
        );
        assert_eq!(
            get_record(record.id, &state.db_connection.lock().unwrap()),
            Ok(record)
        );
    }

    #[tokio::test]
    async fn update_missing_record_raises_alert() {
        let (state, taxonomy, _) = get_state();
        let input = RecordInput {
            type_id: Some(taxonomy.income),
            category_id: Some(taxonomy.salary),
            subcategory_id: Some(taxonomy.bonus),
            amount: Some(SubmittedAmount::Text("10".to_owned())),
            ..Default::default()
        };

        let response = update_record_endpoint(State(state), Path(999), Form(input)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        let message: String = html
            .select(&Selector::parse("#alert-container p").unwrap())
            .next()
            .expect("No alert message")
            .text()
            .collect();
        assert_eq!(message, "Could not update record");
    }
}
