//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};

use crate::{
    AppState, endpoints,
    not_found::get_404_not_found,
    record::{
        create_record_api, create_record_endpoint, delete_record_api, delete_record_endpoint,
        get_edit_record_page, get_new_record_page, get_record_api, get_records_page,
        list_records_api, update_record_api, update_record_endpoint,
    },
    taxonomy::{
        create_entry_api, create_entry_endpoint, delete_entry_api, delete_entry_endpoint,
        get_directories_page, get_edit_entry_page, get_entry_api, get_new_entry_page,
        list_entries_api, load_categories, load_subcategories, update_entry_api,
        update_entry_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::RECORDS_VIEW,
            get(get_records_page).post(create_record_endpoint),
        )
        .route(endpoints::NEW_RECORD_VIEW, get(get_new_record_page))
        .route(endpoints::EDIT_RECORD_VIEW, get(get_edit_record_page))
        .route(
            endpoints::RECORD,
            put(update_record_endpoint).delete(delete_record_endpoint),
        )
        .route(endpoints::DIRECTORIES_VIEW, get(get_directories_page))
        .route(endpoints::NEW_ENTRY_VIEW, get(get_new_entry_page))
        .route(endpoints::EDIT_ENTRY_VIEW, get(get_edit_entry_page))
        .route(endpoints::ENTRIES, post(create_entry_endpoint))
        .route(
            endpoints::ENTRY,
            put(update_entry_endpoint).delete(delete_entry_endpoint),
        )
        .route(endpoints::LOAD_CATEGORIES, get(load_categories))
        .route(endpoints::LOAD_SUBCATEGORIES, get(load_subcategories));

    let api_routes = Router::new()
        .route(
            endpoints::RECORDS_API,
            get(list_records_api).post(create_record_api),
        )
        .route(
            endpoints::RECORD_API,
            get(get_record_api)
                .put(update_record_api)
                .delete(delete_record_api),
        )
        .route(
            endpoints::ENTRIES_API,
            get(list_entries_api).post(create_entry_api),
        )
        .route(
            endpoints::ENTRY_API,
            get(get_entry_api)
                .put(update_entry_api)
                .delete(delete_entry_api),
        );

    page_routes
        .merge(api_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the records page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::RECORDS_VIEW)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, endpoints};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "Etc/UTC").expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_records() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::RECORDS_VIEW);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_page() {
        let server = get_test_server();

        let response = server.get("/definitely/not/a/page").await;

        response.assert_status_not_found();
        assert_eq!(response.header("content-type"), "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn pages_render() {
        let server = get_test_server();

        for page in [
            endpoints::RECORDS_VIEW,
            endpoints::NEW_RECORD_VIEW,
            endpoints::DIRECTORIES_VIEW,
            "/directories/categories/new",
        ] {
            server.get(page).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn api_and_cascade_share_the_taxonomy() {
        let server = get_test_server();
        let income: Value = server
            .post("/api/types")
            .json(&json!({"name": "Income"}))
            .await
            .json();
        let salary: Value = server
            .post("/api/categories")
            .json(&json!({"name": "Salary", "type_id": income["id"]}))
            .await
            .json();

        let response = server
            .get(&format!(
                "{}?type_id={}",
                endpoints::LOAD_CATEGORIES,
                income["id"]
            ))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "categories": [{"id": salary["id"], "name": "Salary"}]
        }));
    }

    #[tokio::test]
    async fn records_path_is_not_taken_for_a_taxonomy_kind() {
        let server = get_test_server();

        let response = server.get(endpoints::RECORDS_API).await;

        response.assert_status_ok();
        response.assert_json(&json!([]));
    }
}
