use super::criteria::FilterCriteria;

/// Default page size, matching the backend's default.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Pagination position. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    per_page: u32,
}

impl PageCursor {
    /// Zero values are raised to 1.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// First page with the given size.
    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::first(DEFAULT_PER_PAGE)
    }
}

/// Everything needed to fetch one page of devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: PageCursor,
    pub criteria: FilterCriteria,
}

impl PageRequest {
    pub fn new(cursor: PageCursor, criteria: FilterCriteria) -> Self {
        Self { cursor, criteria }
    }

    /// `page` and `per_page` followed by the set filter fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.cursor.page().to_string()),
            ("per_page", self.cursor.per_page().to_string()),
        ];
        pairs.extend(self.criteria.query_pairs());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_never_zero() {
        let cursor = PageCursor::new(0, 0);
        assert_eq!(cursor.page(), 1);
        assert_eq!(cursor.per_page(), 1);
    }

    #[test]
    fn test_reset_keeps_page_size() {
        let mut cursor = PageCursor::new(4, 25);
        cursor.reset();
        assert_eq!(cursor, PageCursor::new(1, 25));
    }

    #[test]
    fn test_query_pairs_without_filters() {
        let request = PageRequest::default();
        assert_eq!(
            request.query_pairs(),
            vec![("page", "1".to_string()), ("per_page", "15".to_string())]
        );
    }
}
