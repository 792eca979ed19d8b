use tracing::debug;

use shared::types::{Page, SearchLogEntry};

use crate::api;
use crate::http::{ApiClient, ApiResult};

/// Walks the search audit log one page at a time. Pages are zero-based.
#[derive(Debug, Clone)]
pub struct SearchLogPager {
    api: ApiClient,
    size: u32,
    page: u32,
    current: Option<Page<SearchLogEntry>>,
}

impl SearchLogPager {
    pub fn new(api: ApiClient, size: u32) -> Self {
        Self {
            api,
            size: size.max(1),
            page: 0,
            current: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn current(&self) -> Option<&Page<SearchLogEntry>> {
        self.current.as_ref()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Unknown until a page has been fetched.
    pub fn has_next(&self) -> bool {
        self.current.as_ref().is_some_and(|p| !p.last)
    }

    /// Fetch the current page. On failure the previously shown page stays.
    pub async fn fetch(&mut self) -> ApiResult<Page<SearchLogEntry>> {
        debug!("Fetching search logs page {} (size {})", self.page, self.size);
        let result = api::admin::search_logs(&self.api, self.page, self.size).await;
        if let Some(page) = &result.data {
            self.page = page.number;
            self.current = Some(page.clone());
        }
        result
    }

    /// Jump to `page` and fetch it.
    pub async fn goto(&mut self, page: u32) -> ApiResult<Page<SearchLogEntry>> {
        let previous = self.page;
        self.page = page;
        let result = self.fetch().await;
        if result.data.is_none() {
            self.page = previous;
        }
        result
    }

    /// `None` when already on the last page.
    pub async fn next(&mut self) -> Option<ApiResult<Page<SearchLogEntry>>> {
        if !self.has_next() {
            return None;
        }
        Some(self.goto(self.page + 1).await)
    }

    /// `None` when already on the first page.
    pub async fn previous(&mut self) -> Option<ApiResult<Page<SearchLogEntry>>> {
        if !self.has_previous() {
            return None;
        }
        Some(self.goto(self.page - 1).await)
    }
}
