//! Pagination utilities for OnApp collection endpoints.
//!
//! OnApp accepts `page` and `per_page` query parameters but does not report
//! a total, so a page is considered to have a successor when it is full.

use serde::{Deserialize, Serialize};

/// A page of results from the OnApp API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Requested number of items per page.
    pub per_page: u32,
    /// Whether there are more pages.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    #[must_use]
    pub fn new(items: Vec<T>, page: u32, per_page: u32) -> Self {
        let has_more = per_page > 0 && items.len() >= per_page as usize;
        Self {
            items,
            page,
            per_page,
            has_more,
        }
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Query parameters for paginated requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Page number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Number of items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl ListOptions {
    /// Create pagination params for a specific page.
    #[must_use]
    pub fn for_page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// The requested page, defaulting to the first.
    pub fn page_or_first(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more_when_full() {
        let page: Page<i32> = Page::new(vec![1; 100], 1, 100);
        assert!(page.has_more);

        let page: Page<i32> = Page::new(vec![1; 50], 3, 100);
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_zero_per_page_never_has_more() {
        let page: Page<i32> = Page::new(vec![], 1, 0);
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 1, 100);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.page, 1);
    }

    #[test]
    fn test_list_options_query_string() {
        let opts = ListOptions::for_page(2, 25);
        assert_eq!(serde_qs::to_string(&opts).unwrap(), "page=2&per_page=25");
        assert_eq!(serde_qs::to_string(&ListOptions::default()).unwrap(), "");
    }

    #[test]
    fn test_page_or_first() {
        assert_eq!(ListOptions::default().page_or_first(), 1);
        assert_eq!(ListOptions::for_page(0, 10).page_or_first(), 1);
        assert_eq!(ListOptions::for_page(4, 10).page_or_first(), 4);
    }
}
