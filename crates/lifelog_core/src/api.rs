//! Remote lifelog API client.
//!
//! # Responsibility
//! - Issue authenticated `GET /v1/lifelogs` calls with query filters.
//! - Surface non-2xx responses and malformed payloads as typed errors.
//!
//! # Invariants
//! - Exactly one outbound request per `get_lifelogs` call; no retries.
//! - Every request carries the `X-API-Key` credential header.
//! - Successful bodies are validated before they are returned.

use log::{error, info};
use reqwest::blocking::Client;
use std::time::{Duration, Instant};

use crate::model::lifelog::LifelogsResponse;
use crate::model::validation::{parse_lifelogs_body, ValidationError};

pub const DEFAULT_BASE_URL: &str = "https://api.limitless.ai";
pub const LIFELOGS_ENDPOINT: &str = "/v1/lifelogs";
pub const API_KEY_HEADER: &str = "X-API-Key";

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API request failed: {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("API transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// HTTP status of a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::Validation(_) => None,
        }
    }

    /// Raw response body of a non-2xx response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

/// Sort order accepted by the `direction` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Query filters for one lifelogs request. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetLifelogsParams {
    pub timezone: Option<String>,
    /// Calendar day in `YYYY-MM-DD` form.
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub cursor: Option<String>,
    pub direction: Option<SortDirection>,
    pub include_markdown: Option<bool>,
    pub include_headings: Option<bool>,
    pub limit: Option<usize>,
    pub is_starred: Option<bool>,
}

impl GetLifelogsParams {
    /// Renders set fields as wire-named query pairs, in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "timezone", self.timezone.clone());
        push_opt(&mut query, "date", self.date.clone());
        push_opt(&mut query, "start", self.start.clone());
        push_opt(&mut query, "end", self.end.clone());
        push_opt(&mut query, "cursor", self.cursor.clone());
        push_opt(
            &mut query,
            "direction",
            self.direction.map(|direction| direction.as_str().to_string()),
        );
        push_opt(
            &mut query,
            "includeMarkdown",
            self.include_markdown.map(|value| value.to_string()),
        );
        push_opt(
            &mut query,
            "includeHeadings",
            self.include_headings.map(|value| value.to_string()),
        );
        push_opt(&mut query, "limit", self.limit.map(|value| value.to_string()));
        push_opt(
            &mut query,
            "isStarred",
            self.is_starred.map(|value| value.to_string()),
        );
        query
    }
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        query.push((key, value));
    }
}

/// Source of lifelog pages.
///
/// The pagination walker depends on this trait so it can be exercised
/// without network access.
pub trait LifelogSource {
    fn get_lifelogs(&self, params: &GetLifelogsParams) -> ApiResult<LifelogsResponse>;
}

impl<T: LifelogSource + ?Sized> LifelogSource for &T {
    fn get_lifelogs(&self, params: &GetLifelogsParams) -> ApiResult<LifelogsResponse> {
        (**self).get_lifelogs(params)
    }
}

/// Blocking HTTP client for the Limitless lifelogs API.
pub struct LimitlessClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl LimitlessClient {
    /// Builds a client for `base_url` authenticating with `api_key`.
    ///
    /// No request timeout is configured.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> ApiResult<Self> {
        let http = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self::with_http_client(http, base_url, api_key))
    }

    /// Uses a caller-configured reqwest client (proxies, timeouts, TLS roots).
    pub fn with_http_client(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl LifelogSource for LimitlessClient {
    fn get_lifelogs(&self, params: &GetLifelogsParams) -> ApiResult<LifelogsResponse> {
        let started_at = Instant::now();
        let url = format!("{}{LIFELOGS_ENDPOINT}", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&params.to_query())
            .send()
            .map_err(|err| {
                error!(
                    "event=api_request module=api status=error duration_ms={} error_code=transport error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                ApiError::Transport(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            // A body read failure still reports the status.
            let body = response.text().unwrap_or_default();
            error!(
                "event=api_request module=api status=error duration_ms={} http_status={}",
                started_at.elapsed().as_millis(),
                status.as_u16()
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let body = response.text()?;
        let parsed = parse_lifelogs_body(&body).map_err(|err| {
            error!(
                "event=api_request module=api status=error duration_ms={} error_code=validation",
                started_at.elapsed().as_millis()
            );
            ApiError::Validation(err)
        })?;

        info!(
            "event=api_request module=api status=ok duration_ms={} http_status={} items={}",
            started_at.elapsed().as_millis(),
            status.as_u16(),
            parsed.data.lifelogs.len()
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::{GetLifelogsParams, LimitlessClient, SortDirection};

    #[test]
    fn to_query_skips_unset_fields_and_uses_wire_names() {
        let params = GetLifelogsParams {
            cursor: Some("abc".to_string()),
            direction: Some(SortDirection::Asc),
            include_markdown: Some(true),
            limit: Some(10),
            is_starred: Some(false),
            ..GetLifelogsParams::default()
        };

        assert_eq!(
            params.to_query(),
            vec![
                ("cursor", "abc".to_string()),
                ("direction", "asc".to_string()),
                ("includeMarkdown", "true".to_string()),
                ("limit", "10".to_string()),
                ("isStarred", "false".to_string()),
            ]
        );
    }

    #[test]
    fn empty_params_render_no_query() {
        assert!(GetLifelogsParams::default().to_query().is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = LimitlessClient::new("http://localhost:9000/", "key").expect("client");
        assert_eq!(client.base_url(), "http://localhost:9000");
    }
}
