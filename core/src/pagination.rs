//! Pagination controls derived from list metadata.
//!
//! The window shows at most `WINDOW` page numbers centred on the current
//! page and slides to stay inside `[1, total_pages]`.

use crate::types::Pagination;

pub const WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButton {
    pub target: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub number: u32,
    pub current: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub first: NavButton,
    pub prev: NavButton,
    pub pages: Vec<PageButton>,
    pub next: NavButton,
    pub last: NavButton,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl PageControls {
    /// `None` when everything fits on one page. Every button is disabled
    /// while a list request is loading.
    pub fn derive(pagination: &Pagination, loading: bool) -> Option<Self> {
        let total_pages = pagination.total_pages;
        if total_pages <= 1 {
            return None;
        }
        let page = pagination.page.clamp(1, total_pages);
        let at_start = page == 1;
        let at_end = page == total_pages;

        let pages = window(page, total_pages)
            .map(|number| PageButton {
                number,
                current: number == page,
                enabled: !loading,
            })
            .collect();

        Some(Self {
            first: NavButton {
                target: 1,
                enabled: !at_start && !loading,
            },
            prev: NavButton {
                target: page.saturating_sub(1).max(1),
                enabled: !at_start && !loading,
            },
            pages,
            next: NavButton {
                target: page.saturating_add(1).min(total_pages),
                enabled: !at_end && !loading,
            },
            last: NavButton {
                target: total_pages,
                enabled: !at_end && !loading,
            },
            page,
            total_pages,
            total: pagination.total,
        })
    }

    pub fn numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.number).collect()
    }
}

/// Inclusive range of page numbers to show.
fn window(page: u32, total_pages: u32) -> std::ops::RangeInclusive<u32> {
    let mut start = page.saturating_sub(WINDOW / 2).max(1);
    let end = start.saturating_add(WINDOW - 1).min(total_pages);
    if end - start + 1 < WINDOW {
        start = end.saturating_sub(WINDOW - 1).max(1);
    }
    start..=end
}

/// 1-based positions of the first and last item shown, for
/// "Showing A to B of N". `None` for an empty result.
pub fn item_range(pagination: &Pagination) -> Option<(u64, u64)> {
    if pagination.total == 0 {
        return None;
    }
    let limit = u64::from(pagination.limit.max(1));
    let first = u64::from(pagination.page.max(1) - 1) * limit + 1;
    if first > pagination.total {
        return None;
    }
    let last = (first + limit - 1).min(pagination.total);
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls(page: u32, total_pages: u32) -> PageControls {
        let pagination = Pagination::new(page, 10, u64::from(total_pages) * 10);
        PageControls::derive(&pagination, false).unwrap()
    }

    #[test]
    fn window_is_centred_on_current_page() {
        let c = controls(10, 20);
        assert_eq!(c.numbers(), vec![8, 9, 10, 11, 12]);
        assert!(c.first.enabled && c.prev.enabled && c.next.enabled && c.last.enabled);
        assert_eq!(c.prev.target, 9);
        assert_eq!(c.next.target, 11);
        assert!(c.pages.iter().filter(|p| p.current).all(|p| p.number == 10));
    }

    #[test]
    fn window_slides_at_the_edges() {
        let c = controls(1, 20);
        assert_eq!(c.numbers(), vec![1, 2, 3, 4, 5]);
        assert!(!c.first.enabled && !c.prev.enabled);
        assert!(c.next.enabled && c.last.enabled);

        let c = controls(20, 20);
        assert_eq!(c.numbers(), vec![16, 17, 18, 19, 20]);
        assert!(c.first.enabled && c.prev.enabled);
        assert!(!c.next.enabled && !c.last.enabled);

        assert_eq!(controls(2, 3).numbers(), vec![1, 2, 3]);
    }

    #[test]
    fn single_page_has_no_controls() {
        assert!(PageControls::derive(&Pagination::new(1, 10, 7), false).is_none());
        assert!(PageControls::derive(&Pagination::new(1, 10, 0), false).is_none());
    }

    #[test]
    fn loading_disables_everything() {
        let c = PageControls::derive(&Pagination::new(3, 10, 100), true).unwrap();
        assert!(!c.first.enabled && !c.prev.enabled && !c.next.enabled && !c.last.enabled);
        assert!(c.pages.iter().all(|p| !p.enabled));
    }

    #[test]
    fn item_range_covers_partial_last_page() {
        assert_eq!(item_range(&Pagination::new(1, 10, 45)), Some((1, 10)));
        assert_eq!(item_range(&Pagination::new(5, 10, 45)), Some((41, 45)));
        assert_eq!(item_range(&Pagination::new(1, 10, 0)), None);
        assert_eq!(item_range(&Pagination::new(9, 10, 45)), None);
    }

    #[test]
    fn huge_page_counts_do_not_overflow() {
        let pagination = Pagination {
            page: u32::MAX,
            limit: 1,
            total: u64::from(u32::MAX),
            total_pages: u32::MAX,
            has_next: None,
            has_previous: None,
        };
        let c = PageControls::derive(&pagination, false).unwrap();
        assert_eq!(c.numbers(), ((u32::MAX - 4)..=u32::MAX).collect::<Vec<_>>());
        assert_eq!(c.next.target, u32::MAX);
        assert!(!c.next.enabled);

        let second_last = Pagination {
            page: u32::MAX - 1,
            ..pagination
        };
        let c = PageControls::derive(&second_last, false).unwrap();
        assert_eq!(c.next.target, u32::MAX);
        assert_eq!(c.numbers().len(), WINDOW as usize);
    }
}
