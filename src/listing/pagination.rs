use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Metadata of one resolved page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page {
    pub number: u64,
    pub per_page: u64,
    /// Matching rows across all pages
    pub total: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
    /// 1-based index of the first row on this page, 0 when empty
    pub start_index: u64,
    /// 1-based index of the last row on this page, 0 when empty
    pub end_index: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requested {
    Number(u64),
    OutOfRange,
}

/// Non-numeric input falls back to the first page, numbers below 1
/// or past the end fall back to the last page.
fn requested(raw: Option<&str>) -> Requested {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Requested::Number(1);
    };

    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => Requested::Number(n as u64),
        Ok(_) => Requested::OutOfRange,
        Err(_) => {
            let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                // An integer too large to represent is still past the end
                Requested::OutOfRange
            } else {
                Requested::Number(1)
            }
        }
    }
}

impl Page {
    /// Resolves the raw `page` query value against `total` rows.
    ///
    /// An empty result set still has one (empty) page.
    pub fn resolve(raw: Option<&str>, total: u64, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = if total == 0 {
            1
        } else {
            total.div_ceil(per_page)
        };

        let number = match requested(raw) {
            Requested::Number(n) if n <= num_pages => n,
            _ => num_pages,
        };

        let (start_index, end_index) = if total == 0 {
            (0, 0)
        } else {
            let start = (number - 1) * per_page + 1;
            let end = if number == num_pages {
                total
            } else {
                number * per_page
            };
            (start, end)
        };

        Self {
            number,
            per_page,
            total,
            num_pages,
            has_previous: number > 1,
            has_next: number < num_pages,
            previous_page_number: (number > 1).then(|| number - 1),
            next_page_number: (number < num_pages).then(|| number + 1),
            start_index,
            end_index,
        }
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 1)]
    #[case(Some(""), 1)]
    #[case(Some("2"), 2)]
    #[case(Some(" 3 "), 3)]
    #[case(Some("abc"), 1)]
    #[case(Some("2.5"), 1)]
    #[case(Some("0"), 3)]
    #[case(Some("-4"), 3)]
    #[case(Some("99"), 3)]
    #[case(Some("99999999999999999999999"), 3)]
    fn resolves_requested_page(#[case] raw: Option<&str>, #[case] expected: u64) {
        assert_eq!(Page::resolve(raw, 25, 10).number, expected);
    }

    #[test]
    fn empty_result_has_one_empty_page() {
        let page = Page::resolve(Some("5"), 0, 10);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert_eq!((page.start_index, page.end_index), (0, 0));
        assert!(!page.has_previous && !page.has_next);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = Page::resolve(Some("2"), 25, 10);
        assert_eq!(page.previous_page_number, Some(1));
        assert_eq!(page.next_page_number, Some(3));
        assert_eq!((page.start_index, page.end_index), (11, 20));
        assert_eq!(page.offset(), 10);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn last_page_is_partial() {
        let page = Page::resolve(Some("3"), 25, 10);
        assert!(page.has_previous);
        assert!(!page.has_next);
        assert_eq!(page.next_page_number, None);
        assert_eq!((page.start_index, page.end_index), (21, 25));
    }

    proptest! {
        #[test]
        fn page_always_in_range(total in 0u64..500, per_page in 1u64..50, raw in any::<i64>()) {
            let raw = raw.to_string();
            let page = Page::resolve(Some(&raw), total, per_page);

            prop_assert!(page.number >= 1 && page.number <= page.num_pages);
            prop_assert!(page.end_index <= total);
            if total > 0 {
                let rows_on_page = page.end_index - page.start_index + 1;
                prop_assert!(rows_on_page >= 1 && rows_on_page <= per_page);
                prop_assert_eq!(page.offset() + 1, page.start_index);
            }
        }
    }
}
