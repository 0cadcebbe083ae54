//! Admin console page shells.
//!
//! The console itself is a client-side app; these documents only give it a
//! mount point and a title. Everything under `/admin` but the login page sits
//! behind the gate, including paths that have no page.

use axum::{
    Router,
    extract::Path,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse},
    routing::get,
};

use super::auth::gate::{LOGIN_PAGE, admin_gate};

const SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Marquee Admin</title>
</head>
<body>
<div id="app" data-page="{page}"{extra}></div>
</body>
</html>
"#;

fn shell(title: &str, page: &str) -> Html<String> {
    render(title, page, "")
}

fn render(title: &str, page: &str, extra: &str) -> Html<String> {
    Html(
        SHELL
            .replace("{title}", title)
            .replace("{page}", page)
            .replace("{extra}", extra),
    )
}

pub async fn login() -> Html<String> {
    shell("Sign in", "login")
}

pub async fn dashboard() -> Html<String> {
    shell("Dashboard", "dashboard")
}

pub async fn events() -> Html<String> {
    shell("Events", "events")
}

/// The console loads the event itself; the id is only handed through.
pub async fn edit_event(Path(id): Path<String>) -> Html<String> {
    let id: String = id
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
        .collect();
    render("Edit event", "event-edit", &format!(r#" data-event-id="{id}""#))
}

pub async fn enquiries() -> Html<String> {
    shell("Enquiries", "enquiries")
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, shell("Not found", "not-found"))
}

/// Page routes for the whole `/admin` subtree, gated as one.
///
/// The catch-all routes make unknown admin paths match too, so `route_layer`
/// still runs the gate for them before the 404 page.
pub(crate) fn router() -> Router {
    Router::new()
        .route(LOGIN_PAGE, get(login))
        .route("/admin", get(dashboard))
        .route("/admin/", get(dashboard))
        .route("/admin/events", get(events))
        .route("/admin/events/{id}/edit", get(edit_event))
        .route("/admin/enquiries", get(enquiries))
        .route("/admin/{*rest}", get(not_found))
        .route_layer(middleware::from_fn(admin_gate))
}
