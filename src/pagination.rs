// Incremental visible-window pager for the vehicle grid.
//
// The grid never renders the whole filtered list at once: it starts with one
// page and expands by whole pages as the user scrolls or asks for more. The
// window is a prefix of the filtered list, so its length is monotonically
// non-decreasing until a reset.

use tokio::time::{sleep, Duration};

use crate::models::VehicleRecord;

/// Cards per page.
pub const PAGE_SIZE: usize = 12;

/// Short fixed delay before expanding the window, to avoid layout thrashing
/// when the scroll trigger fires in quick succession.
const LOAD_MORE_DELAY: Duration = Duration::from_millis(300);

/// State machine over "pages loaded" for one filtered sequence.
#[derive(Debug)]
pub struct VehiclePager {
    page: usize,
    loading: bool,
}

impl Default for VehiclePager {
    fn default() -> Self {
        VehiclePager {
            page: 1,
            loading: false,
        }
    }
}

impl VehiclePager {
    pub fn new() -> Self {
        VehiclePager::default()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(total: usize) -> usize {
        total.div_ceil(PAGE_SIZE).max(1)
    }

    /// Length of the currently visible prefix for a filtered list of `total`
    /// records: `min(page * PAGE_SIZE, total)`.
    pub fn visible_len(&self, total: usize) -> usize {
        (self.page * PAGE_SIZE).min(total)
    }

    /// All filtered records are already visible.
    pub fn is_complete(&self, total: usize) -> bool {
        self.visible_len(total) >= total
    }

    /// Records not yet visible, for the "load more" affordance label.
    pub fn remaining(&self, total: usize) -> usize {
        total - self.visible_len(total)
    }

    /// The visible prefix of the filtered list.
    pub fn window<'a>(&self, records: &'a [VehicleRecord]) -> &'a [VehicleRecord] {
        &records[..self.visible_len(records.len())]
    }

    /// Expands the window by one page after a short fixed delay. A no-op
    /// when the window is already complete or a load is in flight; returns
    /// whether the page count advanced.
    pub async fn load_more(&mut self, total: usize) -> bool {
        if self.loading || self.is_complete(total) {
            return false;
        }
        self.loading = true;
        sleep(LOAD_MORE_DELAY).await;
        self.page += 1;
        self.loading = false;
        true
    }

    /// Back to a single page. Called whenever the filtered sequence identity
    /// changes (new criteria or a new snapshot).
    pub fn reset(&mut self) {
        self.page = 1;
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<VehicleRecord> {
        (0..n)
            .map(|i| VehicleRecord {
                id: i.to_string(),
                ..VehicleRecord::default()
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn window_grows_by_whole_pages_up_to_the_list_length() {
        let total = 30;
        let mut pager = VehiclePager::new();
        assert_eq!(pager.visible_len(total), 12);

        assert!(pager.load_more(total).await);
        assert_eq!(pager.visible_len(total), 24);

        assert!(pager.load_more(total).await);
        assert_eq!(pager.visible_len(total), 30);
        assert!(pager.is_complete(total));

        // Further transitions are no-ops.
        assert!(!pager.load_more(total).await);
        assert_eq!(pager.visible_len(total), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn visible_len_matches_min_formula_after_k_transitions() {
        let total = 50;
        let mut pager = VehiclePager::new();
        for k in 1..=10usize {
            pager.load_more(total).await;
            assert_eq!(pager.visible_len(total), (PAGE_SIZE * (1 + k)).min(total));
        }
    }

    #[test]
    fn short_lists_are_complete_from_the_start() {
        let pager = VehiclePager::new();
        assert!(pager.is_complete(5));
        assert!(pager.is_complete(0));
        assert_eq!(pager.visible_len(5), 5);
        assert_eq!(pager.remaining(5), 0);
    }

    #[test]
    fn total_pages_rounds_up_and_never_hits_zero() {
        assert_eq!(VehiclePager::total_pages(0), 1);
        assert_eq!(VehiclePager::total_pages(12), 1);
        assert_eq!(VehiclePager::total_pages(13), 2);
        assert_eq!(VehiclePager::total_pages(25), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_one_page() {
        let mut pager = VehiclePager::new();
        pager.load_more(100).await;
        pager.load_more(100).await;
        assert_eq!(pager.page(), 3);

        pager.reset();
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.visible_len(100), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn window_returns_the_visible_prefix() {
        let list = records(15);
        let mut pager = VehiclePager::new();
        assert_eq!(pager.window(&list).len(), 12);
        assert_eq!(pager.window(&list)[0].id, "0");

        pager.load_more(list.len()).await;
        assert_eq!(pager.window(&list).len(), 15);
    }
}
