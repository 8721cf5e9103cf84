//! Lifelog fetch service with cursor pagination.
//!
//! # Responsibility
//! - Walk API pages by cursor until a total-item cap or the last page.
//! - Expose a single-page primitive for callers that paginate manually.
//!
//! # Invariants
//! - Never requests more than `API_MAX_PAGE_SIZE` items per call.
//! - Returned order is page order, pages in cursor order; nothing is re-sorted.
//! - Never returns more than the cap.

use crate::api::{ApiResult, GetLifelogsParams, LifelogSource, SortDirection};
use crate::model::lifelog::{Lifelog, LifelogPage};
use log::info;
use std::time::Instant;

/// Largest page the API serves per request.
pub const API_MAX_PAGE_SIZE: usize = 10;
/// Total items fetched by `fetch_all` when no cap is given.
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Filters and caps for [`LifelogService::fetch_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub timezone: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub direction: SortDirection,
    pub include_markdown: bool,
    pub include_headings: bool,
    pub is_starred: Option<bool>,
    /// Total item cap across all pages.
    pub max_items: usize,
    /// Per-request cap; clamped to [`API_MAX_PAGE_SIZE`].
    pub page_size: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timezone: None,
            date: None,
            start: None,
            end: None,
            direction: SortDirection::Desc,
            include_markdown: true,
            include_headings: true,
            is_starred: None,
            max_items: DEFAULT_MAX_ITEMS,
            page_size: None,
        }
    }
}

impl FetchOptions {
    fn page_limit(&self) -> usize {
        self.page_size
            .map_or(API_MAX_PAGE_SIZE, |size| size.min(API_MAX_PAGE_SIZE))
    }

    fn request(&self, cursor: Option<String>, limit: usize) -> GetLifelogsParams {
        GetLifelogsParams {
            timezone: self.timezone.clone(),
            date: self.date.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            cursor,
            direction: Some(self.direction),
            include_markdown: Some(self.include_markdown),
            include_headings: Some(self.include_headings),
            limit: Some(limit),
            is_starred: self.is_starred,
        }
    }
}

/// Fetch use-case service over a [`LifelogSource`].
pub struct LifelogService<S: LifelogSource> {
    source: S,
}

impl<S: LifelogSource> LifelogService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches pages until `options.max_items` records or the last page.
    ///
    /// # Errors
    /// - The first API or validation failure aborts the walk; records from
    ///   earlier pages are discarded.
    pub fn fetch_all(&self, options: &FetchOptions) -> ApiResult<Vec<Lifelog>> {
        let started_at = Instant::now();
        let cap = options.max_items;
        let mut lifelogs: Vec<Lifelog> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0_usize;

        loop {
            let remaining = cap.saturating_sub(lifelogs.len());
            let limit = options.page_limit().min(remaining);
            if limit == 0 {
                break;
            }

            let page = LifelogPage::from(
                self.source
                    .get_lifelogs(&options.request(cursor.take(), limit))?,
            );
            pages += 1;
            lifelogs.extend(page.lifelogs);
            cursor = page.next_cursor;

            if lifelogs.len() >= cap || cursor.is_none() {
                break;
            }
        }

        lifelogs.truncate(cap);
        info!(
            "event=lifelog_fetch module=service status=ok duration_ms={} pages={} items={}",
            started_at.elapsed().as_millis(),
            pages,
            lifelogs.len()
        );
        Ok(lifelogs)
    }

    /// Fetches exactly one page starting at `cursor`.
    pub fn fetch_page(&self, cursor: Option<&str>) -> ApiResult<LifelogPage> {
        let params = GetLifelogsParams {
            cursor: cursor.map(str::to_string),
            include_markdown: Some(true),
            include_headings: Some(true),
            ..GetLifelogsParams::default()
        };
        let page = LifelogPage::from(self.source.get_lifelogs(&params)?);
        info!(
            "event=lifelog_fetch_page module=service status=ok items={} has_more={}",
            page.lifelogs.len(),
            page.next_cursor.is_some()
        );
        Ok(page)
    }
}
