//! UI Routes - HTML form for tunematch-web
//!
//! One page: the query form, plus the result of the last submission
//! (track summary and advisory, the not-found message, or an error).

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::error::PipelineError;
use crate::pipeline::QueryOutcome;
use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/home", get(home_page))
        .route("/search", post(search))
}

/// Form fields posted by the home page
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    pub song_name: Option<String>,
    pub album_name: Option<String>,
}

/// Result panel contents
enum Panel<'a> {
    Empty,
    Outcome(&'a QueryOutcome),
    Failure(&'a PipelineError),
}

/// GET / and GET /home
async fn home_page() -> impl IntoResponse {
    Html(render_page(&SearchForm::default(), Panel::Empty))
}

/// POST /search
async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> impl IntoResponse {
    let result = state
        .pipeline
        .submit_query(form.song_name.as_deref(), form.album_name.as_deref())
        .await;

    match result {
        Ok(outcome) => (StatusCode::OK, Html(render_page(&form, Panel::Outcome(&outcome)))),
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "Search failed");
            (err.status(), Html(render_page(&form, Panel::Failure(&err))))
        }
    }
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>tunematch - Would they like this song?</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 700px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #1db954;
            padding-bottom: 10px;
        }
        label { display: block; margin-top: 12px; }
        input[type=text] { width: 100%; padding: 8px; box-sizing: border-box; }
        button {
            margin-top: 16px;
            padding: 10px 20px;
            background: #1db954;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        .result { background: #f5f5f5; padding: 16px 20px; border-radius: 4px; margin-top: 24px; }
        .advisory { font-weight: bold; margin-top: 12px; }
        .error { background: #fdecea; color: #8a1c1c; }
    </style>
</head>
<body>
    <h1>Would they like this song?</h1>
"#;

const PAGE_TAIL: &str = r#"</body>
</html>
"#;

fn render_page(form: &SearchForm, panel: Panel<'_>) -> String {
    let mut html = String::from(PAGE_HEAD);

    html.push_str(&format!(
        r#"    <form method="post" action="/search">
        <label for="song_name">Song name</label>
        <input type="text" id="song_name" name="song_name" value="{}" required>
        <label for="album_name">Album name</label>
        <input type="text" id="album_name" name="album_name" value="{}" required>
        <button type="submit">Check</button>
    </form>
"#,
        escape_html(form.song_name.as_deref().unwrap_or("")),
        escape_html(form.album_name.as_deref().unwrap_or("")),
    ));

    match panel {
        Panel::Empty => {}
        Panel::Outcome(outcome) => {
            html.push_str("    <div class=\"result\">\n");
            for (key, value) in outcome.summary_lines() {
                html.push_str(&format!(
                    "        <div><strong>{}</strong>: {}</div>\n",
                    escape_html(key),
                    escape_html(value)
                ));
            }
            if let Some(advisory) = outcome.advisory() {
                html.push_str(&format!(
                    "        <p class=\"advisory\">{}</p>\n",
                    escape_html(advisory)
                ));
            }
            html.push_str("    </div>\n");
        }
        Panel::Failure(err) => {
            html.push_str(&format!(
                "    <div class=\"result error\">{}</div>\n",
                escape_html(err.user_message())
            ));
        }
    }

    html.push_str(PAGE_TAIL);
    html
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
