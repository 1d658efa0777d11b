//! Server-side HTML. Pages are assembled from small `format!` fragments;
//! every user supplied string goes through [`escape`].

mod dashboard;
mod detail;
mod types;

pub use dashboard::dashboard_page;
pub use detail::detail_page;
pub use types::types_page;

use axum::{http::StatusCode, response::Html};
use chrono::NaiveDateTime;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub(crate) fn timestamp(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Wraps page content in the shared document shell.
pub(crate) fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Gas Gauge</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
<header class="topbar">
  <a class="brand" href="/">Gas Gauge</a>
  <nav><a href="/">Canisters</a> <a href="/types">Types</a></nav>
</header>
<main>
{body}
</main>
<div id="cheatsheet-modal" class="modal" hidden></div>
<script src="/static/gauge.js" defer></script>
</body>
</html>"#,
        title = escape(title),
        body = body,
    ))
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<section class="error">
  <h1>{code} {reason}</h1>
  <p>{message}</p>
  <p><a href="/">Back to the dashboard</a></p>
</section>"#,
        code = status.as_u16(),
        reason = escape(reason),
        message = escape(message),
    );
    layout(reason, &body)
}
