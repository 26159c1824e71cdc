//! Page-number pagination.
//!
//! `?page=N` selects a window of `page_size` rows; `?page=last` selects the
//! final one. Page 1 always exists, even for an empty collection. Any other
//! page outside `1..=num_pages`, or a value that is neither a positive
//! integer nor `last`, is [`CatalogError::InvalidPage`].

use axum::extract::{Query, rejection::QueryRejection};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{CatalogError, CatalogResult};

const LAST_PAGE: &str = "last";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number starting at 1, or `last`
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page_number(&self) -> CatalogResult<PageNumber> {
        PageNumber::parse(self.page.as_deref())
    }

    /// Resolves an extracted query; a query string that does not decode
    /// (e.g. `?page=1&page=2`) is an invalid page as well.
    pub fn requested(query: Result<Query<Self>, QueryRejection>) -> CatalogResult<PageNumber> {
        match query {
            Ok(Query(query)) => query.page_number(),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected page query");
                Err(CatalogError::InvalidPage)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    Number(u64),
    Last,
}

impl PageNumber {
    /// A missing value means the first page.
    pub fn parse(raw: Option<&str>) -> CatalogResult<Self> {
        match raw.map(str::trim) {
            None => Ok(Self::Number(1)),
            Some(LAST_PAGE) => Ok(Self::Last),
            Some(value) => match value.parse::<u64>() {
                Ok(n) if n >= 1 => Ok(Self::Number(n)),
                _ => Err(CatalogError::InvalidPage),
            },
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::Number(1)
    }
}

/// The resolved slice of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn resolve(page: PageNumber, count: u64, page_size: u64) -> CatalogResult<Self> {
        let page_size = page_size.max(1);
        let num_pages = count.div_ceil(page_size).max(1);

        let number = match page {
            PageNumber::Number(n) => n,
            PageNumber::Last => num_pages,
        };

        if number == 0 || number > num_pages {
            return Err(CatalogError::InvalidPage);
        }

        Ok(Self {
            number,
            num_pages,
            offset: (number - 1) * page_size,
            limit: page_size,
        })
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// One page of rows plus the total they were cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub window: PageWindow,
}

impl<T> Paginated<T> {
    /// Build the response envelope with links relative to `path`
    /// (the request path, e.g. `/api/tags`).
    pub fn into_page(self, path: &str) -> Page<T> {
        let next = self
            .window
            .has_next()
            .then(|| page_link(path, self.window.number + 1));
        let previous = self
            .window
            .has_previous()
            .then(|| page_link(path, self.window.number - 1));

        Page {
            count: self.count,
            next,
            previous,
            results: self.items,
        }
    }
}

// The first page is addressed without a query string.
fn page_link(path: &str, number: u64) -> String {
    if number == 1 {
        path.to_string()
    } else {
        format!("{}?page={}", path, number)
    }
}

/// Paginated response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    /// Total number of rows in the collection
    pub count: u64,
    #[schema(example = "/api/tags?page=3")]
    pub next: Option<String>,
    #[schema(example = "/api/tags")]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_number() {
        assert_eq!(PageNumber::parse(None).unwrap(), PageNumber::Number(1));
        assert_eq!(PageNumber::parse(Some("3")).unwrap(), PageNumber::Number(3));
        assert_eq!(PageNumber::parse(Some("last")).unwrap(), PageNumber::Last);

        for raw in ["0", "-1", "two", "", "1.5"] {
            assert!(
                matches!(PageNumber::parse(Some(raw)), Err(CatalogError::InvalidPage)),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_first_page_of_empty_collection() {
        let window = PageWindow::resolve(PageNumber::Number(1), 0, 10).unwrap();
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.offset, 0);
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_second_page_of_empty_collection_is_invalid() {
        assert!(matches!(
            PageWindow::resolve(PageNumber::Number(2), 0, 10),
            Err(CatalogError::InvalidPage)
        ));
    }

    #[test]
    fn test_window_bounds() {
        let second = PageWindow::resolve(PageNumber::Number(2), 12, 10).unwrap();
        assert_eq!(second.offset, 10);
        assert_eq!(second.limit, 10);
        assert_eq!(second.num_pages, 2);
        assert!(second.has_previous());
        assert!(!second.has_next());

        assert!(PageWindow::resolve(PageNumber::Number(3), 12, 10).is_err());
    }

    #[test]
    fn test_last_page() {
        let last = PageWindow::resolve(PageNumber::Last, 25, 10).unwrap();
        assert_eq!(last.number, 3);
        assert_eq!(last.offset, 20);

        let exact = PageWindow::resolve(PageNumber::Last, 20, 10).unwrap();
        assert_eq!(exact.number, 2);
    }

    #[test]
    fn test_envelope_links() {
        let middle = Paginated {
            items: vec![11, 12],
            count: 25,
            window: PageWindow::resolve(PageNumber::Number(2), 25, 10).unwrap(),
        }
        .into_page("/api/tags");

        assert_eq!(middle.next.as_deref(), Some("/api/tags?page=3"));
        assert_eq!(middle.previous.as_deref(), Some("/api/tags"));
        assert_eq!(middle.results, vec![11, 12]);

        let first = Paginated {
            items: Vec::<i32>::new(),
            count: 0,
            window: PageWindow::resolve(PageNumber::Number(1), 0, 10).unwrap(),
        }
        .into_page("/api/tags");

        assert_eq!(first.count, 0);
        assert_eq!(first.next, None);
        assert_eq!(first.previous, None);
    }

    #[test]
    fn test_envelope_serializes_null_links() {
        let page = Page::<i32> {
            count: 0,
            next: None,
            previous: None,
            results: vec![],
        };

        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({"count": 0, "next": null, "previous": null, "results": []})
        );
    }
}
