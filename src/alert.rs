//! Alert messages that are swapped into the page's alert container.
//!
//! Alerts are rendered with `hx-swap-oob` so they replace the
//! `#alert-container` element regardless of where htmx puts the rest of the
//! response.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// An action completed.
    SuccessSimple { message: String },
    /// An action was refused, but nothing went wrong.
    Warning { message: String, details: String },
    /// An action failed.
    Error { message: String, details: String },
}

impl Alert {
    fn view(&self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, None),
            Alert::Warning { message, details } => (WARNING_STYLE, message, Some(details)),
            Alert::Error { message, details } => (ERROR_STYLE, message, Some(details)),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-medium" { (message) }

                        @if let Some(details) = details {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="ms-3 text-sm font-semibold"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.view().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

const SUCCESS_STYLE: &str = "flex items-start p-4 rounded-lg shadow text-green-800 \
    bg-green-50 dark:bg-gray-800 dark:text-green-400";

const WARNING_STYLE: &str = "flex items-start p-4 rounded-lg shadow text-yellow-800 \
    bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300";

const ERROR_STYLE: &str = "flex items-start p-4 rounded-lg shadow text-red-800 \
    bg-red-50 dark:bg-gray-800 dark:text-red-400";

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::alert::Alert;

    #[test]
    fn alert_replaces_container_out_of_band() {
        let html = Alert::Warning {
            message: "Could not delete type".to_owned(),
            details: "Still in use".to_owned(),
        }
        .into_html();

        let fragment = Html::parse_fragment(&html.0);
        let container = fragment
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .expect("Could not find alert container");
        assert_eq!(container.value().attr("hx-swap-oob"), Some("true"));

        let paragraphs: Vec<String> = container
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect())
            .collect();
        assert_eq!(paragraphs, ["Could not delete type", "Still in use"]);
    }

    #[test]
    fn simple_alert_has_no_details() {
        let html = Alert::SuccessSimple {
            message: "Record deleted".to_owned(),
        }
        .into_html();

        let fragment = Html::parse_fragment(&html.0);
        let paragraph_count = fragment.select(&Selector::parse("p").unwrap()).count();
        assert_eq!(paragraph_count, 1);
    }
}
