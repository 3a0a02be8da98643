//! Page arithmetic for the pagination control.

/// One slot in the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Gap,
}

/// Number of pages needed for `total` records. Never less than one, so an
/// empty result still shows "page 1 of 1".
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(page_size)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamps a requested page into `1..=page_count`.
pub fn clamp_page(page: u32, total: u64, page_size: u32) -> u32 {
    page.clamp(1, page_count(total, page_size))
}

/// Pages to show around `current`: always the first and last page, `radius`
/// neighbours on each side, and gaps where pages are skipped.
pub fn page_window(current: u32, count: u32, radius: u32) -> Vec<PageItem> {
    let count = count.max(1);
    let current = current.clamp(1, count);
    let lo = current.saturating_sub(radius).max(1);
    let hi = current.saturating_add(radius).min(count);

    let mut items = Vec::new();
    if lo > 1 {
        items.push(PageItem::Page(1));
        if lo > 2 {
            items.push(PageItem::Gap);
        }
    }
    items.extend((lo..=hi).map(PageItem::Page));
    if hi < count {
        if hi < count - 1 {
            items.push(PageItem::Gap);
        }
        items.push(PageItem::Page(count));
    }
    items
}

/// One-based index range of records shown on a page, for "21–40 of 95".
pub fn record_range(page: u32, page_size: u32, total: u64) -> Option<(u64, u64)> {
    if total == 0 {
        return None;
    }
    let start = u64::from(page.saturating_sub(1)) * u64::from(page_size) + 1;
    if start > total {
        return None;
    }
    let end = (start + u64::from(page_size) - 1).min(total);
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Gap, Page};

    #[test]
    fn page_count_rounds_up_and_never_drops_below_one() {
        assert_eq!(page_count(0, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(clamp_page(9, 21, 20), 2);
        assert_eq!(clamp_page(0, 21, 20), 1);
    }

    #[test]
    fn window_inserts_gaps() {
        assert_eq!(
            page_window(5, 10, 1),
            vec![Page(1), Gap, Page(4), Page(5), Page(6), Gap, Page(10)]
        );
        assert_eq!(page_window(1, 3, 1), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(page_window(2, 4, 1), vec![Page(1), Page(2), Page(3), Page(4)]);
    }

    #[test]
    fn record_range_covers_last_partial_page() {
        assert_eq!(record_range(3, 20, 45), Some((41, 45)));
        assert_eq!(record_range(1, 20, 0), None);
    }
}
