use serde::{Deserialize, Serialize};

/// Listing page size.
pub const PAGE_SIZE: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was served.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// ceil(len / page_size)
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slices `items` for a 1-based `page`; page 0 is treated as 1. Pages past
/// the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_items: items.len(),
        total_pages: total_pages(items.len(), page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_three_of_sixty_five_holds_last_five() {
        let items: Vec<usize> = (0..65).collect();
        let page = paginate(&items, 3, PAGE_SIZE);
        assert_eq!(page.items, vec![60, 61, 62, 63, 64]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 65);
    }

    #[test]
    fn test_first_page_is_full() {
        let items: Vec<usize> = (0..65).collect();
        let page = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(page.items.len(), 30);
        assert_eq!(page.items[0], 0);
    }

    #[test]
    fn test_page_zero_treated_as_first() {
        let items: Vec<usize> = (0..10).collect();
        let page = paginate(&items, 0, PAGE_SIZE);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items: Vec<usize> = (0..10).collect();
        let page = paginate(&items, 4, PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_empty_list_has_zero_pages() {
        let page = paginate::<usize>(&[], 1, PAGE_SIZE);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(total_pages(60, 30), 2);
        assert_eq!(total_pages(61, 30), 3);
    }

    #[test]
    fn test_map_preserves_metadata() {
        let items: Vec<usize> = (0..40).collect();
        let page = paginate(&items, 2, PAGE_SIZE).map(|n| n * 2);
        assert_eq!(page.items, vec![60, 62, 64, 66, 68, 70, 72, 74, 76, 78]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
    }
}
