use std::ops::Range;

/// 1-based page cursor over a list of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    page: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 1,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// `ceil(count / page_size)`; zero for an empty list.
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size)
    }

    /// Moves to `page`, clamped into `[1, max(total_pages, 1)]`.
    pub fn set_page(&mut self, page: usize, count: usize) -> usize {
        let last = self.total_pages(count).max(1);
        self.page = page.clamp(1, last);
        self.page
    }

    /// Index range of the current page within a list of `count` items.
    pub fn window(&self, count: usize) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(count);
        let end = (start + self.page_size).min(count);
        start..end
    }
}
