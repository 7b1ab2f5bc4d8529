//! Error responder
//!
//! Every failed request ends here. API paths get a JSON body, everything
//! else a small HTML page. Blog paths get their own copy for missing posts
//! and server failures.

use crate::error::Error;
use axum::{
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

const API_PREFIX: &str = "/api/";
const BLOG_PREFIX: &str = "/blog";
const DEFAULT_MESSAGE: &str = "An unexpected error occurred";

/// JSON error body served under `/api/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
}

/// Title and message shown on an error page
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPage {
    pub title: String,
    pub message: String,
}

impl ErrorPage {
    /// Pick the copy for a failed request
    pub fn for_path(path: &str, status: StatusCode, message: Option<&str>) -> Self {
        if path.starts_with(BLOG_PREFIX) {
            match status {
                StatusCode::NOT_FOUND => {
                    return Self::new(
                        "Blog Post Not Found",
                        "The requested blog post could not be found",
                    )
                }
                StatusCode::INTERNAL_SERVER_ERROR => {
                    return Self::new(
                        "Blog Error",
                        "There was an error loading the blog content. Please try again later.",
                    )
                }
                _ => {}
            }
        }

        let title = status.canonical_reason().unwrap_or("Error");
        let message = match message {
            Some(m) if !m.is_empty() => m,
            _ if status == StatusCode::NOT_FOUND => "The requested page could not be found",
            _ => DEFAULT_MESSAGE,
        };
        Self::new(title, message)
    }

    fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    fn render(&self, status: StatusCode) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>\n\
             <h1>{code}</h1>\n<h2>{title}</h2>\n<p>{message}</p>\n\
             <p><a href=\"/\">Go back home</a></p>\n</body>\n</html>\n",
            code = status.as_u16(),
            title = escape_html(&self.title),
            message = escape_html(&self.message),
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn json_response(status: StatusCode, message: String) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        message,
    };
    (status, Json(body)).into_response()
}

/// Log the failure and build the response for `path`
pub fn respond(path: &str, status: StatusCode, message: Option<&str>) -> Response {
    let page = ErrorPage::for_path(path, status, message);
    error!(path, status = status.as_u16(), message = %page.message, "request failed");

    if path.starts_with(API_PREFIX) {
        json_response(status, page.message)
    } else {
        (status, Html(page.render(status))).into_response()
    }
}

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> Response {
    respond(uri.path(), StatusCode::NOT_FOUND, None)
}

/// Failure raised inside an API handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(status = self.status.as_u16(), message = %self.message, "API request failed");
        json_response(self.status, self.message)
    }
}
