//! The page listing records, with a form for filtering them.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// axum_extra's Query treats `?status_id=` as no filter rather than a rejection.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links, format_amount,
    },
    navigation::NavBar,
    record::{CashFlowRecord, RecordFilter, query_records},
    taxonomy::{TaxonomyKind, get_all_entries},
};

/// The state needed for the records page.
#[derive(Debug, Clone)]
pub struct RecordsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecordsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The names of every entry of one kind, keyed by ID, in display order.
struct EntryNames {
    ordered: Vec<(DatabaseId, String)>,
    by_id: HashMap<DatabaseId, String>,
}

impl EntryNames {
    fn load(kind: TaxonomyKind, connection: &Connection) -> Result<Self, Error> {
        let ordered: Vec<(DatabaseId, String)> = get_all_entries(kind, connection)?
            .into_iter()
            .map(|entry| (entry.id, entry.name.to_string()))
            .collect();
        let by_id = ordered.iter().cloned().collect();

        Ok(Self { ordered, by_id })
    }

    fn name(&self, id: DatabaseId) -> &str {
        self.by_id.get(&id).map(String::as_str).unwrap_or_default()
    }
}

struct TaxonomyNames {
    statuses: EntryNames,
    types: EntryNames,
    categories: EntryNames,
    subcategories: EntryNames,
}

impl TaxonomyNames {
    fn load(connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            statuses: EntryNames::load(TaxonomyKind::Status, connection)?,
            types: EntryNames::load(TaxonomyKind::Type, connection)?,
            categories: EntryNames::load(TaxonomyKind::Category, connection)?,
            subcategories: EntryNames::load(TaxonomyKind::SubCategory, connection)?,
        })
    }
}

/// Render the records matching the filter in the query string, newest first.
pub async fn get_records_page(
    State(state): State<RecordsPageState>,
    Query(filter): Query<RecordFilter>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let names = match TaxonomyNames::load(&connection) {
        Ok(names) => names,
        Err(error) => return error.into_response(),
    };

    let (records, notice) = match query_records(&filter, &connection) {
        Ok(records) => (records, None),
        Err(Error::NotFound) => (
            Vec::new(),
            Some("One of the selected filters no longer exists. Clear the filters and try again."),
        ),
        Err(error) => return error.into_response(),
    };

    records_view(&records, &filter, &names, notice).into_response()
}

fn records_view(
    records: &[CashFlowRecord],
    filter: &RecordFilter,
    names: &TaxonomyNames,
    notice: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::RECORDS_VIEW).into_html();
    let filter_form = filter_form(filter, names);
    let empty_message = if filter.is_empty() {
        "No records yet."
    } else {
        "No records match the filters."
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Records" }
                a href=(endpoints::NEW_RECORD_VIEW) class=(LINK_STYLE) { "New Record" }
            }

            (filter_form)

            @if let Some(notice) = notice {
                p id="filter-notice" class="my-4 text-sm text-yellow-700 dark:text-yellow-400" {
                    (notice)
                }
            }

            div class="overflow-x-auto"
            {
                table id="records" class="w-full text-sm text-left"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Subcategory" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Comment" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for record in records {
                            (record_row(record, names))
                        }

                        @if records.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="8" class={(TABLE_CELL_STYLE) " text-center"} {
                                    (empty_message)
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Records", &[], &content)
}

fn record_row(record: &CashFlowRecord, names: &TaxonomyNames) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_RECORD_VIEW, record.id);
    let delete_url = format_endpoint(endpoints::RECORD, record.id);
    let status = record
        .status_id
        .map(|status_id| names.statuses.name(status_id))
        .unwrap_or_default();

    html! {
        tr class=(TABLE_ROW_STYLE) data-record-id=(record.id)
        {
            td class=(TABLE_CELL_STYLE) { (record.effective_date().to_string()) }
            td class=(TABLE_CELL_STYLE) { (status) }
            td class=(TABLE_CELL_STYLE) { (names.types.name(record.type_id)) }
            td class=(TABLE_CELL_STYLE) { (names.categories.name(record.category_id)) }
            td class=(TABLE_CELL_STYLE) { (names.subcategories.name(record.subcategory_id)) }
            td class={(TABLE_CELL_STYLE) " text-right"} { (format_amount(record.amount)) }
            td class=(TABLE_CELL_STYLE) { (record.comment.as_deref().unwrap_or_default()) }
            td class=(TABLE_CELL_STYLE)
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    "Are you sure you want to delete this record? This cannot be undone.",
                    "closest tr",
                    "delete",
                ))
            }
        }
    }
}

fn filter_select(
    name: &str,
    label: &str,
    entries: &EntryNames,
    selected: Option<DatabaseId>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select id=(name) name=(name) class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { "Any" }

                @for (id, entry_name) in &entries.ordered {
                    option value=(id) selected[selected == Some(*id)] { (entry_name) }
                }
            }
        }
    }
}

fn filter_form(filter: &RecordFilter, names: &TaxonomyNames) -> Markup {
    let date_from = filter.date_from.map(|date| date.to_string());
    let date_to = filter.date_to.map(|date| date.to_string());

    html! {
        form
            method="get"
            action=(endpoints::RECORDS_VIEW)
            class="grid gap-4 mb-6 sm:grid-cols-2 lg:grid-cols-3"
        {
            div
            {
                label for="date_from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    id="date_from"
                    name="date_from"
                    type="date"
                    value=[date_from]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date_to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    id="date_to"
                    name="date_to"
                    type="date"
                    value=[date_to]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (filter_select("status_id", "Status", &names.statuses, filter.status_id))
            (filter_select("type_id", "Type", &names.types, filter.type_id))
            (filter_select("category_id", "Category", &names.categories, filter.category_id))
            (filter_select(
                "subcategory_id",
                "Subcategory",
                &names.subcategories,
                filter.subcategory_id,
            ))

            div class="flex items-end gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
                a href=(endpoints::RECORDS_VIEW) class=(LINK_STYLE) { "Clear" }
            }
        }
    }
}

#[cfg(test)]
mod records_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use scraper::{ElementRef, Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        record::{NewRecord, RecordFilter, create_record},
        test_utils::{
            SampleTaxonomy, assert_valid_html, create_sample_taxonomy, parse_html_document,
        },
    };

    use super::{RecordsPageState, get_records_page};

    fn get_state() -> (RecordsPageState, SampleTaxonomy) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let taxonomy = create_sample_taxonomy(&connection);

        let records = [
            (date!(2024 - 01 - 05), None, taxonomy.income, taxonomy.salary, taxonomy.bonus, 1000),
            (date!(2024 - 01 - 20), None, taxonomy.expense, taxonomy.food, taxonomy.groceries, 75),
            (
                date!(2024 - 02 - 02),
                Some(date!(2024 - 01 - 31)),
                taxonomy.income,
                taxonomy.salary,
                taxonomy.bonus,
                500,
            ),
            (date!(2024 - 02 - 10), None, taxonomy.income, taxonomy.salary, taxonomy.bonus, 200),
        ];

        for (created_at, custom_date, type_id, category_id, subcategory_id, amount) in records {
            create_record(
                &NewRecord {
                    custom_date,
                    status_id: Some(taxonomy.business),
                    type_id,
                    category_id,
                    subcategory_id,
                    amount: Decimal::new(amount, 0),
                    comment: None,
                },
                created_at,
                &connection,
            )
            .expect("Could not create record");
        }

        let state = RecordsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, taxonomy)
    }

    fn rows(html: &Html) -> Vec<ElementRef<'_>> {
        html.select(&Selector::parse("#records tbody tr[data-record-id]").unwrap())
            .collect()
    }

    fn cells(row: &ElementRef<'_>) -> Vec<String> {
        row.select(&Selector::parse("td").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn lists_records_newest_first() {
        let (state, _) = get_state();

        let response = get_records_page(State(state), Query(RecordFilter::default())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = rows(&html);
        assert_eq!(rows.len(), 4);
        let first = cells(&rows[0]);
        assert_eq!(
            first[..7],
            ["2024-02-10", "Business", "Income", "Salary", "Bonus", "200.00", ""]
        );
        assert_eq!(cells(&rows[1])[0], "2024-01-31");
    }

    #[tokio::test]
    async fn january_income_filter() {
        let (state, taxonomy) = get_state();
        let filter = RecordFilter {
            date_from: Some(date!(2024 - 01 - 01)),
            date_to: Some(date!(2024 - 01 - 31)),
            type_id: Some(taxonomy.income),
            ..Default::default()
        };

        let response = get_records_page(State(state), Query(filter)).await;

        let html = parse_html_document(response).await;
        let amounts: Vec<String> = rows(&html).iter().map(|row| cells(row)[5].clone()).collect();
        assert_eq!(amounts, ["500.00", "1000.00"]);
        let selected_type = html
            .select(&Selector::parse("select[name=type_id] option[selected]").unwrap())
            .next()
            .and_then(|option| option.value().attr("value"))
            .map(str::to_owned);
        assert_eq!(selected_type, Some(taxonomy.income.to_string()));
    }

    #[tokio::test]
    async fn unknown_filter_shows_notice() {
        let (state, _) = get_state();
        let filter = RecordFilter {
            category_id: Some(999),
            ..Default::default()
        };

        let response = get_records_page(State(state), Query(filter)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert!(rows(&html).is_empty());
        assert!(
            html.select(&Selector::parse("#filter-notice").unwrap())
                .next()
                .is_some()
        );
    }
}
