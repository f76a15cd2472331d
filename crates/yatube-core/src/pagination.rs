//! Fixed-size pagination over an ordered collection.
//!
//! The requested page comes straight from the query string and is never
//! trusted: anything that does not name an existing page resolves to the
//! last page instead of failing.

use serde::Serialize;

/// Number of posts shown on one page of every listing.
pub const PAGE_SIZE: usize = 10;

/// One page of an ordered collection plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    /// 1-based number of this page.
    pub number: usize,
    pub num_pages: usize,
    /// Size of the whole collection.
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<usize>,
    pub previous_page_number: Option<usize>,
    /// 1-based position of the first item on this page, 0 when empty.
    pub start_index: usize,
    /// 1-based position of the last item on this page, 0 when empty.
    pub end_index: usize,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.object_list.iter()
    }

    /// Convert the items while keeping the navigation metadata.
    pub fn map<U>(mut self, f: impl FnMut(T) -> U) -> Page<U> {
        let items = std::mem::take(&mut self.object_list);
        self.with_items(items.into_iter().map(f).collect())
    }

    /// Like [`Page::map`], stopping at the first failed conversion.
    pub fn try_map<U, E>(mut self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let items = std::mem::take(&mut self.object_list);
        let object_list = items.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(self.with_items(object_list))
    }

    fn with_items<U>(&self, object_list: Vec<U>) -> Page<U> {
        Page {
            object_list,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }
}

/// Paginate with the default [`PAGE_SIZE`].
pub fn paginate<T>(items: Vec<T>, requested: Option<&str>) -> Page<T> {
    paginate_by(items, requested, PAGE_SIZE)
}

/// Slice `items` into pages of `per_page` and return the requested one.
pub fn paginate_by<T>(items: Vec<T>, requested: Option<&str>, per_page: usize) -> Page<T> {
    let window = PageWindow::resolve(items.len(), requested, per_page);
    let object_list = items
        .into_iter()
        .skip(window.offset())
        .take(window.per_page)
        .collect();
    window.page(object_list)
}

/// The page a request resolves to, computed from the collection size alone
/// so that only that page has to be loaded.
///
/// An absent or blank `requested` value selects page 1. A value that is not a
/// number, or that is outside `1..=num_pages`, selects the last page. An empty
/// collection still has one (empty) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub per_page: usize,
}

impl PageWindow {
    pub fn resolve(count: usize, requested: Option<&str>, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let num_pages = count.div_ceil(per_page).max(1);

        Self {
            number: resolve_page_number(requested, num_pages),
            num_pages,
            count,
            per_page,
        }
    }

    /// 0-based index of the page.
    pub fn index(&self) -> usize {
        self.number - 1
    }

    /// Position of the first item of the page in the whole collection.
    pub fn offset(&self) -> usize {
        self.index() * self.per_page
    }

    /// Wrap the loaded items of this page with its navigation metadata.
    pub fn page<T>(&self, object_list: Vec<T>) -> Page<T> {
        let number = self.number;
        let num_pages = self.num_pages;
        let offset = self.offset();

        let (start_index, end_index) = if object_list.is_empty() {
            (0, 0)
        } else {
            (offset + 1, offset + object_list.len())
        };

        Page {
            object_list,
            number,
            num_pages,
            count: self.count,
            has_next: number < num_pages,
            has_previous: number > 1,
            next_page_number: (number < num_pages).then_some(number + 1),
            previous_page_number: (number > 1).then_some(number - 1),
            start_index,
            end_index,
        }
    }
}

fn resolve_page_number(requested: Option<&str>, num_pages: usize) -> usize {
    let raw = match requested.map(str::trim) {
        None | Some("") => return 1,
        Some(raw) => raw,
    };

    match raw.parse::<i64>() {
        Ok(n) if n >= 1 && (n as u64) <= num_pages as u64 => n as usize,
        _ => num_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thirteen() -> Vec<u32> {
        (1..=13).collect()
    }

    #[test]
    fn test_first_page_holds_ten() {
        let page = paginate(thirteen(), None);

        assert_eq!(page.len(), 10);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.count, 13);
        assert!(page.has_next);
        assert!(!page.has_previous);
        assert_eq!(page.next_page_number, Some(2));
        assert_eq!(page.previous_page_number, None);
        assert_eq!((page.start_index, page.end_index), (1, 10));
    }

    #[test]
    fn test_second_page_holds_remainder() {
        let page = paginate(thirteen(), Some("2"));

        assert_eq!(page.object_list, vec![11, 12, 13]);
        assert!(!page.has_next);
        assert!(page.has_previous);
        assert_eq!(page.previous_page_number, Some(1));
        assert_eq!((page.start_index, page.end_index), (11, 13));
    }

    #[test]
    fn test_blank_page_is_first() {
        assert_eq!(paginate(thirteen(), Some("")).number, 1);
        assert_eq!(paginate(thirteen(), Some("  ")).number, 1);
    }

    #[test]
    fn test_invalid_requests_fall_back_to_last_page() {
        for requested in ["abc", "0", "-1", "3", "999999999999999999999", "1.5"] {
            let page = paginate(thirteen(), Some(requested));
            assert_eq!(page.number, 2, "requested {requested:?}");
            assert_eq!(page.len(), 3, "requested {requested:?}");
        }
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), Some("5"));

        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
        assert_eq!((page.start_index, page.end_index), (0, 0));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let page = paginate((1..=20).collect::<Vec<u32>>(), Some("3"));

        assert_eq!(page.num_pages, 2);
        assert_eq!(page.number, 2);
        assert_eq!(page.len(), 10);
    }

    #[test]
    fn test_window_points_at_requested_page() {
        let window = PageWindow::resolve(13, Some("2"), PAGE_SIZE);

        assert_eq!(window.number, 2);
        assert_eq!(window.index(), 1);
        assert_eq!(window.offset(), 10);

        let page = window.page(vec![11, 12, 13]);
        assert_eq!((page.start_index, page.end_index), (11, 13));
        assert_eq!(page.count, 13);
        assert!(page.has_previous);
    }

    #[test]
    fn test_window_falls_back_to_last_page() {
        let window = PageWindow::resolve(25, Some("abc"), PAGE_SIZE);

        assert_eq!(window.number, 3);
        assert_eq!(window.offset(), 20);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = paginate(thirteen(), Some("2")).map(|n| n.to_string());

        assert_eq!(page.object_list, vec!["11", "12", "13"]);
        assert_eq!(page.number, 2);
        assert_eq!(page.count, 13);
    }

    #[test]
    fn test_try_map_stops_at_first_error() {
        let ok: Result<Page<u32>, String> = paginate(thirteen(), None).try_map(|n| Ok(n * 2));
        assert_eq!(ok.unwrap().object_list[0], 2);

        let err = paginate(thirteen(), None)
            .try_map(|n| if n == 4 { Err(n) } else { Ok(n) })
            .unwrap_err();
        assert_eq!(err, 4);
    }

    #[test]
    fn test_serializes_navigation() {
        let page = paginate(thirteen(), None);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["number"], 1);
        assert_eq!(json["has_next"], true);
        assert_eq!(json["object_list"].as_array().unwrap().len(), 10);
    }
}
