//! Page parameter defaults for learner listings

/// Page size used when the request gives none
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a request may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// Raw `page`/`page_size` request values
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageParams {
    pub fn new(page: Option<usize>, page_size: Option<usize>) -> Self {
        Self { page, page_size }
    }

    /// Resolve to a concrete `(page, page_size)`
    ///
    /// Page defaults to 1. Page size defaults to [`DEFAULT_PAGE_SIZE`] and is
    /// clamped to `1..=MAX_PAGE_SIZE`. A page past the last one is left for
    /// the listing to reject.
    ///
    /// # Examples
    /// ```
    /// use forum_svc::pagination::PageParams;
    ///
    /// assert_eq!(PageParams::new(None, None).resolve(), (1, 10));
    /// assert_eq!(PageParams::new(Some(3), Some(500)).resolve(), (3, 100));
    /// ```
    pub fn resolve(self) -> (usize, usize) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, page_size)
    }
}
