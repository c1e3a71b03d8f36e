//! Free-text filtering and pagination over view rows
//!
//! Both steps borrow from the source list and never reorder or copy rows, so
//! the same inputs always produce the same page regardless of cache state.

use std::borrow::Cow;

use crate::domain::address::format_address;
use crate::domain::catalog::decimal_token_id;
use crate::domain::models::{HolderSummary, OwnedToken, TokenItem, TokenOwner};

/// Page sizes offered by the list views
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

/// Rows that can be matched by a free-text query
pub trait Searchable {
    /// Text fields a query may match, in any case
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

impl Searchable for TokenItem {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.topic.as_str()),
            Cow::Borrowed(self.token_id.as_str()),
        ];
        if let Some(decimal) = decimal_token_id(&self.token_id) {
            fields.push(Cow::Owned(decimal));
        }
        fields
    }
}

impl Searchable for OwnedToken {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.topic.as_str()),
            Cow::Borrowed(self.token_id.as_str()),
        ];
        if let Some(decimal) = decimal_token_id(&self.token_id) {
            fields.push(Cow::Owned(decimal));
        }
        fields
    }
}

impl Searchable for HolderSummary {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Owned(format_address(&self.holder))];
        if let Some(name) = &self.name {
            fields.push(Cow::Borrowed(name.as_str()));
        }
        fields
    }
}

impl Searchable for TokenOwner {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Owned(format_address(&self.holder))];
        if let Some(name) = &self.name {
            fields.push(Cow::Borrowed(name.as_str()));
        }
        fields
    }
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Case-insensitive substring match of an already normalized needle.
pub fn matches<T: Searchable + ?Sized>(item: &T, needle: &str) -> bool {
    needle.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

/// Rows matching `query`, in source order. A blank query keeps every row.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = normalize_query(query);
    items.iter().filter(|item| matches(*item, &needle)).collect()
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// One page of a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page after clamping
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<'_, T> {
    /// Zero-based index of the first row of this page in the full list
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// 1-based number of the first shown row, 0 when nothing is shown
    pub fn first_row(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based number of the last shown row, 0 when nothing is shown
    pub fn last_row(&self) -> usize {
        self.offset() + self.items.len()
    }

    /// 1-based rank of the row at `index` within this page
    pub fn position(&self, index: usize) -> usize {
        self.offset() + index + 1
    }
}

/// Slice out page `page` (1-based, clamped) of `page_size` rows.
///
/// A page size of 0 is treated as 1.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page = clamp_page(page, total_pages);
    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        page,
        total_pages,
        total_items: items.len(),
        page_size,
    }
}

/// Filtered page with owned row references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a, T> {
    pub rows: Vec<&'a T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub first_row: usize,
    pub last_row: usize,
}

/// Search text plus page position for one list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    page: usize,
    page_size: usize,
}

impl Query {
    pub fn new(page_size: usize) -> Self {
        Self {
            text: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// New search text always starts from the first page.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.page = 1;
    }

    /// Store the requested page; it is clamped when applied to rows.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Change rows per page, keeping the first visible row on screen.
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        let first_row = (self.page - 1).saturating_mul(self.page_size);
        self.page = first_row / page_size + 1;
        self.page_size = page_size;
    }

    /// Filter then paginate `items`.
    pub fn view<'a, T: Searchable>(&self, items: &'a [T]) -> PageView<'a, T> {
        let matched = filter(items, &self.text);
        let page = paginate(&matched, self.page_size, self.page);
        PageView {
            rows: page.items.to_vec(),
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            page_size: page.page_size,
            first_row: page.first_row(),
            last_row: page.last_row(),
        }
    }
}
