/// Page size used when the caller gives none or a non-positive one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Normalized `LIMIT`/`OFFSET` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Number of rows, always positive
    pub size: u64,
    /// Rows skipped before the window
    pub offset: u64,
}

impl Page {
    /// Build a window from raw caller input: `size <= 0` becomes
    /// [`DEFAULT_PAGE_SIZE`] and a negative offset becomes `0`.
    pub fn new(size: i64, offset: i64) -> Self {
        let size = u64::try_from(size).ok().filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = u64::try_from(offset).unwrap_or(0);
        Self { size, offset }
    }

    /// Build a window from a zero-based page number.
    pub fn from_page_number(size: i64, page: i64) -> Self {
        let Self { size, .. } = Self::new(size, 0);
        let page = u64::try_from(page).unwrap_or(0);
        Self { size, offset: page.saturating_mul(size) }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { size: DEFAULT_PAGE_SIZE, offset: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_raw_input() {
        assert_eq!(Page::new(0, 0), Page { size: 10, offset: 0 });
        assert_eq!(Page::new(-5, -1), Page { size: 10, offset: 0 });
        assert_eq!(Page::new(25, 40), Page { size: 25, offset: 40 });
    }

    #[test]
    fn page_numbers_scale_by_size() {
        assert_eq!(Page::from_page_number(20, 3), Page { size: 20, offset: 60 });
        assert_eq!(Page::from_page_number(0, 2), Page { size: 10, offset: 20 });
        assert_eq!(Page::from_page_number(10, -4), Page { size: 10, offset: 0 });
        assert_eq!(Page::from_page_number(i64::MAX, i64::MAX).offset, u64::MAX);
    }

    #[test]
    fn consecutive_pages_are_contiguous() {
        let pages: Vec<_> = (0..4).map(|p| Page::from_page_number(10, p)).collect();
        for pair in pages.windows(2) {
            assert_eq!(pair[0].offset + pair[0].size, pair[1].offset);
        }
    }
}
