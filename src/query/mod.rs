//! Search, sort and pagination over a record snapshot.
//!
//! The visible rows are always recomputed as
//! `paginate(sort(filter(records, query), key, direction), page, page_size)`;
//! nothing derived is cached between renders.

pub mod filter;
pub mod paginate;
pub mod sort;

use serde::Serialize;

pub use filter::{filter, FuzzyMatcher, ScoredEmployee, DEFAULT_THRESHOLD, SEARCH_FIELDS};
pub use paginate::{paginate, total_pages, PageState, DEFAULT_PAGE_SIZE};
pub use sort::{natural_cmp, sort, SortDirection, SortState};

use crate::model::{Employee, Field};

/// Search, sort and page state. Transitions return a new value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub search: String,
    pub sort: SortState,
    pub page: PageState,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort: SortState::default(),
            page: PageState::new(page_size),
        }
    }

    /// A new query always starts again from page one.
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            search: query.into(),
            sort: self.sort,
            page: self.page.first(),
        }
    }

    pub fn with_sort(&self, key: Field) -> Self {
        Self {
            sort: self.sort.toggle(key),
            ..self.clone()
        }
    }

    pub fn with_sort_direction(&self, direction: SortDirection) -> Self {
        Self {
            sort: SortState {
                key: self.sort.key,
                direction,
            },
            ..self.clone()
        }
    }

    pub fn next_page(&self, matched: usize) -> Self {
        Self {
            page: self.page.next(matched),
            ..self.clone()
        }
    }

    pub fn previous_page(&self, matched: usize) -> Self {
        Self {
            page: self.page.previous(matched),
            ..self.clone()
        }
    }

    pub fn go_to_page(&self, page: usize, matched: usize) -> Self {
        Self {
            page: self.page.go_to(page, matched),
            ..self.clone()
        }
    }

    /// Filtered and sorted rows, before windowing.
    pub fn ordered(&self, records: &[Employee], matcher: &FuzzyMatcher) -> Vec<Employee> {
        let filtered = matcher.filter(records, &self.search);
        sort(&filtered, self.sort.key, self.sort.direction)
    }

    /// Number of records the current query admits.
    pub fn matched(&self, records: &[Employee], matcher: &FuzzyMatcher) -> usize {
        if self.search.trim().is_empty() {
            records.len()
        } else {
            matcher.rank(records, &self.search).len()
        }
    }

    pub fn render(&self, records: &[Employee], matcher: &FuzzyMatcher) -> PageView {
        let ordered = self.ordered(records, matcher);
        let page = self.page.clamp(ordered.len());
        let rows = paginate(&ordered, page.page, page.page_size).to_vec();
        PageView {
            query: self.search.clone(),
            sort: self.sort,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages(ordered.len()),
            matched: ordered.len(),
            total: records.len(),
            rows,
        }
    }
}

/// One rendered window of the table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageView {
    pub query: String,
    pub sort: SortState,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub matched: usize,
    pub total: usize,
    pub rows: Vec<Employee>,
}

impl PageView {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
