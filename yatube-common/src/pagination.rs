//! Page-number pagination shared by every post listing.
//!
//! Requested page numbers come straight from the query string and are never
//! an error: anything unreadable selects the first page, anything past the
//! end selects the last one.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// Number of items per page.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    #[must_use]
    pub fn new(size: NonZeroUsize) -> Self {
        Self(size)
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

/// A page number as read from a request, before it is clamped to the
/// pages that actually exist.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub enum RequestedPage {
    /// Missing or not a number.
    #[default]
    Unspecified,
    /// Zero or negative.
    BeforeFirst,
    Number(NonZeroUsize),
    /// Positive, but too large to represent.
    Overflow,
}

impl RequestedPage {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::Unspecified;
        };

        let (negative, digits) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Self::Unspecified;
        }

        if negative {
            return Self::BeforeFirst;
        }

        match digits.parse::<usize>() {
            Ok(number) => NonZeroUsize::new(number).map_or(Self::BeforeFirst, Self::Number),
            Err(_) => Self::Overflow,
        }
    }
}

/// The `LIMIT`/`OFFSET` pair selecting one page of rows.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct PageInfo {
    pub number: usize,
    pub total_pages: usize,
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<usize>,
    pub previous_page_number: Option<usize>,
    #[serde(skip)]
    pub window: PageWindow,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Page<T> {
    #[serde(flatten)]
    pub info: PageInfo,
    pub items: Vec<T>,
}

/// Splits `count` ordered items into pages of `page_size`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Paginator {
    count: usize,
    page_size: PageSize,
}

impl Paginator {
    #[must_use]
    pub fn new(count: usize, page_size: PageSize) -> Self {
        Self { count, page_size }
    }

    /// Always at least one, even with nothing to show.
    #[must_use]
    pub fn total_pages(self) -> usize {
        self.count.div_ceil(self.page_size.get()).max(1)
    }

    #[must_use]
    pub fn page(self, requested: RequestedPage) -> PageInfo {
        let total_pages = self.total_pages();
        let number = match requested {
            RequestedPage::Unspecified | RequestedPage::BeforeFirst => 1,
            RequestedPage::Number(number) => number.get().min(total_pages),
            RequestedPage::Overflow => total_pages,
        };

        let offset = (number - 1) * self.page_size.get();
        let limit = self.page_size.get().min(self.count - offset.min(self.count));

        PageInfo {
            number,
            total_pages,
            count: self.count,
            has_next: number < total_pages,
            has_previous: number > 1,
            next_page_number: (number < total_pages).then_some(number + 1),
            previous_page_number: (number > 1).then(|| number - 1),
            window: PageWindow { offset, limit },
        }
    }
}

/// Selects one page of an already ordered, fully loaded collection.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page_size: PageSize, requested: RequestedPage) -> Page<T> {
    let info = Paginator::new(items.len(), page_size).page(requested);
    let items = items
        .into_iter()
        .skip(info.window.offset)
        .take(info.window.limit)
        .collect();

    Page { info, items }
}
