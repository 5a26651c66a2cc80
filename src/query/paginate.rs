use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Number of pages needed for `count` items; never less than one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

/// Window `[(page-1)*size, page*size)` of `records`, cut to the input length.
///
/// Page 0 is read as page 1; a page past the end yields an empty window.
pub fn paginate<T>(records: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

/// Current 1-based page plus the fixed page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self, count: usize) -> usize {
        total_pages(count, self.page_size)
    }

    pub fn first(self) -> Self {
        Self { page: 1, ..self }
    }

    pub fn next(self, count: usize) -> Self {
        let last = self.total_pages(count);
        Self {
            page: (self.page + 1).min(last),
            ..self
        }
    }

    /// Steps back from the current page, or from the last page when the
    /// current one is past the end.
    pub fn previous(self, count: usize) -> Self {
        let last = self.total_pages(count);
        Self {
            page: self.page.min(last).saturating_sub(1).max(1),
            ..self
        }
    }

    pub fn go_to(self, page: usize, count: usize) -> Self {
        Self { page, ..self }.clamp(count)
    }

    pub fn clamp(self, count: usize) -> Self {
        let last = self.total_pages(count);
        Self {
            page: self.page.clamp(1, last),
            ..self
        }
    }

    pub fn has_next(&self, count: usize) -> bool {
        self.page < self.total_pages(count)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(0, 20), 1);
    }

    #[test]
    fn window_is_cut_to_length() {
        let items: Vec<u32> = (0..45).collect();
        assert_eq!(paginate(&items, 1, 20), &items[0..20]);
        assert_eq!(paginate(&items, 3, 20), &items[40..45]);
        assert!(paginate(&items, 4, 20).is_empty());
        assert_eq!(paginate(&items, 0, 20), &items[0..20]);
        let none: Vec<u32> = Vec::new();
        assert!(paginate(&none, 1, 20).is_empty());
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let items = [1, 2, 3];
        assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn next_and_previous_stay_in_range() {
        let s = PageState::new(20);
        let s = s.previous(45);
        assert_eq!(s.page, 1);
        let s = s.next(45).next(45).next(45).next(45);
        assert_eq!(s.page, 3);
        assert!(!s.has_next(45));
        let s = s.clamp(10);
        assert_eq!(s.page, 1);
        assert!(!s.has_previous());
        assert_eq!(s.next(0).page, 1);
    }

    #[test]
    fn previous_from_past_the_end_lands_inside() {
        let s = PageState {
            page: 10,
            page_size: 20,
        };
        assert_eq!(s.previous(45).page, 2);
        assert_eq!(s.previous(45).previous(45).page, 1);
        assert_eq!(s.previous(0).page, 1);
    }

    #[test]
    fn go_to_clamps() {
        let s = PageState::new(10);
        assert_eq!(s.go_to(7, 25).page, 3);
        assert_eq!(s.go_to(0, 25).page, 1);
        assert_eq!(s.go_to(2, 25).page, 2);
    }

    #[test]
    fn zero_page_size_is_bumped() {
        assert_eq!(PageState::new(0).page_size, 1);
    }
}
