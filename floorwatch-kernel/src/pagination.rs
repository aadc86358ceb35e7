//! Page slicing for the machine list and the alert feed.

use serde::Serialize;
use std::num::NonZeroUsize;

pub const DEFAULT_ALERTS_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

pub const DEFAULT_MACHINES_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

/// One page of a slice. `page` is 1-based and already clamped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Slice `items` to the requested page, clamped to `[1, max(total_pages, 1)]`.
pub fn paginate<T>(items: &[T], page_size: NonZeroUsize, page: usize) -> Page<'_, T> {
    let total_pages = total_pages(items.len(), page_size);
    let page = page.clamp(1, total_pages.max(1));
    let start = ((page - 1) * page_size.get()).min(items.len());
    let end = (start + page_size.get()).min(items.len());

    Page {
        items: &items[start..end],
        page,
        total_pages,
        has_previous: page > 1,
        has_next: page < total_pages,
    }
}

/// Previous/next stepper over a list of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    page_size: NonZeroUsize,
    total_pages: usize,
}

impl PageCursor {
    pub fn new(len: usize, page_size: NonZeroUsize) -> Self {
        Self {
            page: 1,
            page_size,
            total_pages: total_pages(len, page_size),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn go_to(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages.max(1));
        self.page
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.page + 1)
    }

    pub fn previous(&mut self) -> usize {
        self.go_to(self.page.saturating_sub(1))
    }

    /// Current page of `items`; `items` should have the length the cursor was built with.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> Page<'a, T> {
        paginate(items, self.page_size, self.page)
    }
}

/// Infinite-scroll view: the first `pages_loaded` pages as one prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedPrefix<'a, T> {
    pub items: &'a [T],
    pub has_more: bool,
}

pub fn load_more_prefix<T>(
    items: &[T],
    page_size: NonZeroUsize,
    pages_loaded: usize,
) -> LoadedPrefix<'_, T> {
    let end = pages_loaded.saturating_mul(page_size.get()).min(items.len());
    LoadedPrefix {
        items: &items[..end],
        has_more: end < items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_twelve_items_by_five() {
        let items: Vec<u32> = (1..=12).collect();

        let first = paginate(&items, size(5), 1);
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_previous);
        assert!(first.has_next);
        assert_eq!(first.items, &[1, 2, 3, 4, 5]);

        let last = paginate(&items, size(5), 3);
        assert_eq!(last.items, &[11, 12]);
        assert!(last.has_previous);
        assert!(!last.has_next);
    }

    #[test]
    fn test_page_is_clamped() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(paginate(&items, size(5), 0).page, 1);
        assert_eq!(paginate(&items, size(5), 99).page, 3);
        assert_eq!(paginate(&items, size(5), 99).items, &[11, 12]);
    }

    #[test]
    fn test_empty_list() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, size(5), 4);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn test_cursor_steps_and_clamps() {
        let items: Vec<u32> = (1..=12).collect();
        let mut cursor = PageCursor::new(items.len(), DEFAULT_MACHINES_PAGE_SIZE);

        assert_eq!(cursor.previous(), 1);
        assert_eq!(cursor.next(), 2);
        assert_eq!(cursor.next(), 3);
        assert_eq!(cursor.next(), 3);
        assert_eq!(cursor.slice(&items).items, &[11, 12]);
        assert_eq!(cursor.go_to(0), 1);
    }

    #[test]
    fn test_load_more_prefix() {
        let items: Vec<u32> = (1..=23).collect();

        let view = load_more_prefix(&items, DEFAULT_ALERTS_PAGE_SIZE, 1);
        assert_eq!(view.items.len(), 10);
        assert!(view.has_more);

        let view = load_more_prefix(&items, DEFAULT_ALERTS_PAGE_SIZE, 3);
        assert_eq!(view.items.len(), 23);
        assert!(!view.has_more);

        assert!(load_more_prefix(&items, DEFAULT_ALERTS_PAGE_SIZE, 0).items.is_empty());
    }
}
