//! The directories page, which lists every status, type, category and subcategory.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    endpoints::{self, format_entry_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, PARENT_BADGE_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
    taxonomy::{TaxonomyEntry, TaxonomyKind, get_all_entries, guard::count_dependent_records},
};

/// The state needed for the directories page.
#[derive(Debug, Clone)]
pub struct DirectoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DirectoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// An entry with its parent's name and how many records depend on it.
struct DirectoryRow {
    entry: TaxonomyEntry,
    parent_name: Option<String>,
    record_count: u32,
}

struct DirectorySection {
    kind: TaxonomyKind,
    rows: Vec<DirectoryRow>,
}

/// Render the overview of all directory entries.
pub async fn get_directories_page(State(state): State<DirectoriesPageState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let sections: Result<Vec<DirectorySection>, Error> = TaxonomyKind::ALL
        .into_iter()
        .map(|kind| load_section(kind, &connection))
        .collect();

    match sections {
        Ok(sections) => directories_view(&sections).into_response(),
        Err(error) => {
            tracing::error!("Could not load directories: {error}");
            error.into_response()
        }
    }
}

fn load_section(kind: TaxonomyKind, connection: &Connection) -> Result<DirectorySection, Error> {
    let parent_names: HashMap<DatabaseId, String> = match kind.parent() {
        Some(parent_kind) => get_all_entries(parent_kind, connection)?
            .into_iter()
            .map(|parent| (parent.id, parent.name.to_string()))
            .collect(),
        None => HashMap::new(),
    };

    let rows = get_all_entries(kind, connection)?
        .into_iter()
        .map(|entry| {
            let record_count = count_dependent_records(kind, entry.id, connection)?;
            let parent_name = entry
                .parent_id
                .and_then(|parent_id| parent_names.get(&parent_id).cloned());

            Ok(DirectoryRow {
                entry,
                parent_name,
                record_count,
            })
        })
        .collect::<Result<_, Error>>()?;

    Ok(DirectorySection { kind, rows })
}

fn directories_view(sections: &[DirectorySection]) -> Markup {
    let nav_bar = NavBar::new(endpoints::DIRECTORIES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-2xl font-bold" { "Directories" }

            div class="w-full max-w-4xl space-y-10"
            {
                @for section in sections {
                    (section_view(section))
                }
            }
        }
    };

    base("Directories", &[], &content)
}

fn section_view(section: &DirectorySection) -> Markup {
    let kind = section.kind;
    let new_entry_url = format_entry_endpoint(endpoints::NEW_ENTRY_VIEW, kind, 0);

    html! {
        section id=(kind.path_segment())
        {
            div class="flex items-center justify-between mb-2"
            {
                h2 class="text-xl font-semibold" { (kind.plural_title()) }
                a href=(new_entry_url) class=(LINK_STYLE) { "New " (kind.title()) }
            }

            @if section.rows.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No " (kind.plural_title().to_lowercase()) " yet."
                }
            } @else {
                div class="overflow-x-auto rounded shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Records" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in &section.rows {
                                (row_view(kind, row))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn row_view(kind: TaxonomyKind, row: &DirectoryRow) -> Markup {
    let edit_url = format_entry_endpoint(endpoints::EDIT_ENTRY_VIEW, kind, row.entry.id);
    let delete_url = format_entry_endpoint(endpoints::ENTRY, kind, row.entry.id);
    let confirm_message = match kind {
        TaxonomyKind::Type => format!(
            "Delete the type \"{}\" with its categories and subcategories?",
            row.entry.name
        ),
        TaxonomyKind::Category => format!(
            "Delete the category \"{}\" and its subcategories?",
            row.entry.name
        ),
        _ => format!("Delete the {kind} \"{}\"?", row.entry.name),
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-entry-id=(row.entry.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class="font-medium text-gray-900 dark:text-white" { (row.entry.name.as_ref()) }

                @if let Some(parent_name) = &row.parent_name {
                    " "
                    span class=(PARENT_BADGE_STYLE) { (parent_name) }
                }
            }

            td class=(TABLE_CELL_STYLE) { (row.record_count) }

            td class=(TABLE_CELL_STYLE)
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    &confirm_message,
                    "closest tr",
                    "delete",
                ))
            }
        }
    }
}
