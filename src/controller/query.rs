use std::sync::{Arc, Mutex};

use crate::config::{DEFAULT_MAX_PAGE_LIMIT, DEFAULT_PAGE_LIMIT};

/// Page selection as it appears in a bookmarkable location (`?page=N&limit=M`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageQuery {
    /// Clamps `page >= 1` and `1 <= limit <= 200`.
    pub fn new(page: u32, limit: u32) -> Self {
        Self::bounded(page, limit, DEFAULT_MAX_PAGE_LIMIT)
    }

    pub fn bounded(page: u32, limit: u32, max_limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, max_limit.max(1)),
        }
    }

    /// Reads `page`/`limit` from a location such as `/admin/x?page=2&limit=30` or a bare
    /// query string. Missing or garbage values fall back to the defaults.
    pub fn parse(location: &str, default_limit: u32, max_limit: u32) -> Self {
        let query = match location.split_once('?') {
            Some((_, q)) => q,
            None if location.contains('=') => location,
            None => "",
        };

        let mut page = 1;
        let mut limit = default_limit;

        // A dummy base lets the url crate do the percent-decoding
        if let Ok(url) = reqwest::Url::parse(&format!("http://local/?{}", query)) {
            for (key, value) in url.query_pairs() {
                let parsed = value.trim().parse::<i64>().ok();
                match (key.as_ref(), parsed) {
                    ("page", Some(p)) => page = p.clamp(1, i64::from(u32::MAX)) as u32,
                    ("limit", Some(l)) => limit = l.clamp(1, i64::from(u32::MAX)) as u32,
                    _ => {}
                }
            }
        }

        Self::bounded(page, limit, max_limit)
    }

    pub fn to_query_string(&self) -> String {
        format!("page={}&limit={}", self.page, self.limit)
    }

    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

/// Receives every applied page/limit so the host can keep its location in sync.
pub trait QueryMirror: Send + Sync {
    fn replace(&self, query: &PageQuery);
}

pub struct NoMirror;

impl QueryMirror for NoMirror {
    fn replace(&self, _query: &PageQuery) {}
}

/// Keeps the current query string in a shared cell.
#[derive(Clone, Default)]
pub struct SharedLocation(Arc<Mutex<String>>);

impl SharedLocation {
    pub fn new(initial: &str) -> Self {
        Self(Arc::new(Mutex::new(initial.to_string())))
    }

    pub fn current(&self) -> String {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl QueryMirror for SharedLocation {
    fn replace(&self, query: &PageQuery) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = query.to_query_string();
    }
}
