//! Page-number pagination primitives shared by listing endpoints.
//!
//! A [`PageRequest`] is built from untrusted query values and is always
//! clamped into range, so adapters can translate it straight into
//! `LIMIT`/`OFFSET` clauses. A [`Page`] is the serialised envelope returned
//! to clients.

use serde::Serialize;

/// Page size used when the client does not supply one.
pub const DEFAULT_PER_PAGE: u32 = 15;
/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Validated page selection.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::from_query(Some(3), Some(500));
/// assert_eq!(request.page(), 3);
/// assert_eq!(request.per_page(), 100);
/// assert_eq!(request.offset(), 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a request from raw query values, clamping out-of-range input.
    ///
    /// Missing values fall back to the first page and [`DEFAULT_PER_PAGE`].
    /// Pages below one become one; page sizes are clamped to
    /// `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn from_query(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.map_or(1, |raw| clamp_to_u32(raw, 1, u32::MAX));
        let per_page = per_page.map_or(DEFAULT_PER_PAGE, |raw| {
            clamp_to_u32(raw, 1, MAX_PER_PAGE)
        });
        Self { page, per_page }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

fn clamp_to_u32(raw: i64, min: u32, max: u32) -> u32 {
    u32::try_from(raw.clamp(i64::from(min), i64::from(max))).unwrap_or(min)
}

/// Serialised page envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Total number of rows across all pages.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Page size used for this response.
    pub per_page: u32,
    /// Last page holding data; one when the collection is empty.
    pub last_page: u64,
}

impl<T> Page<T> {
    /// Assemble an envelope for `request` given its rows and the total count.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let last_page = total.div_ceil(u64::from(request.per_page)).max(1);
        Self {
            data,
            total,
            page: request.page,
            per_page: request.per_page,
            last_page,
        }
    }

    /// Convert every row while keeping the paging metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            last_page: self.last_page,
        }
    }
}
