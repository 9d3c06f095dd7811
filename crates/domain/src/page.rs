//! Pagination — which slice of a result set to fetch, and the slice itself.

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Largest page size a caller may ask for.
pub const MAX_PER_PAGE: u32 = 100;

/// Bounds applied when turning raw caller input into a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

impl PageLimits {
    /// Resolve raw, possibly absent or out-of-range input into a request.
    ///
    /// A missing or non-positive `per_page` falls back to the default, a
    /// too-large one is clamped to the maximum. A missing or non-positive
    /// `page` means the first page.
    #[must_use]
    pub fn resolve(self, page: Option<i64>, per_page: Option<i64>) -> PageRequest {
        let per_page = match per_page {
            Some(value) if value > 0 => {
                u32::try_from(value).map_or(self.max_per_page, |v| v.min(self.max_per_page))
            }
            _ => self.default_per_page,
        };
        let page = match page {
            Some(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
            _ => 1,
        };
        PageRequest::new(page, per_page)
    }
}

/// A 1-based page number and a page size, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

impl PageRequest {
    /// Build a request; zero values are raised to 1.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    #[must_use]
    pub fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn per_page(self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

/// One page of results plus the numbers needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    /// Number of matching rows across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            current_page: request.page(),
            per_page: request.per_page(),
            total,
        }
    }

    /// Number of the last non-empty page; 1 when there are no results.
    #[must_use]
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page)).max(1)
    }

    /// 1-based position of the first item on this page, if any.
    #[must_use]
    pub fn from(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        Some(u64::from(self.current_page - 1) * u64::from(self.per_page) + 1)
    }

    /// 1-based position of the last item on this page, if any.
    #[must_use]
    pub fn to(&self) -> Option<u64> {
        self.from().map(|from| from + self.items.len() as u64 - 1)
    }

    /// Transform every item, keeping the pagination numbers.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}
