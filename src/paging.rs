//! Pagination arithmetic for the episode grid.
//!
//! Episode numbers and page indices are both 1-based. All functions are
//! pure; out-of-range input yields an empty result instead of an error.

/// Episodes shown per grid page.
pub const EPISODES_PER_PAGE: usize = 30;

/// Number of page buttons shown at once.
pub const PAGE_BUTTON_WINDOW: usize = 5;

/// Page that contains `episode`.
///
/// Episode numbers below 1 are clamped to page 1, and a zero page size is
/// treated as 1.
///
/// ```
/// use drama_watcher::paging::page_of;
///
/// assert_eq!(page_of(1, 30), 1);
/// assert_eq!(page_of(30, 30), 1);
/// assert_eq!(page_of(31, 30), 2);
/// ```
pub fn page_of(episode: usize, page_size: usize) -> usize {
    episode.max(1).div_ceil(page_size.max(1))
}

/// Number of pages needed for `total_episodes`.
pub fn total_pages(total_episodes: usize, page_size: usize) -> usize {
    total_episodes.div_ceil(page_size.max(1))
}

/// Episode numbers on `page`, in ascending order.
///
/// Empty when the page starts at or past the last episode, or for page 0.
pub fn episodes_on_page(page: usize, page_size: usize, total_episodes: usize) -> Vec<usize> {
    if page == 0 {
        return Vec::new();
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= total_episodes {
        return Vec::new();
    }
    let count = page_size.min(total_episodes - start);
    (start + 1..=start + count).collect()
}

/// First and last episode number on `page`, for the "Episode X - Y" label.
pub fn page_range(page: usize, page_size: usize, total_episodes: usize) -> Option<(usize, usize)> {
    let episodes = episodes_on_page(page, page_size, total_episodes);
    Some((*episodes.first()?, *episodes.last()?))
}

/// Page buttons to show around `current_page`.
///
/// All pages are shown when they fit in `window`. Otherwise a window of
/// `window` pages slides with the current page, which stays centered except
/// near either end.
///
/// ```
/// use drama_watcher::paging::visible_page_buttons;
///
/// assert_eq!(visible_page_buttons(1, 10, 5), vec![1, 2, 3, 4, 5]);
/// assert_eq!(visible_page_buttons(5, 10, 5), vec![3, 4, 5, 6, 7]);
/// assert_eq!(visible_page_buttons(10, 10, 5), vec![6, 7, 8, 9, 10]);
/// assert_eq!(visible_page_buttons(3, 3, 5), vec![1, 2, 3]);
/// ```
pub fn visible_page_buttons(current_page: usize, total_pages: usize, window: usize) -> Vec<usize> {
    if total_pages == 0 || window == 0 {
        return Vec::new();
    }
    if total_pages <= window {
        return (1..=total_pages).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let half = window / 2;
    let start = if current <= half + 1 {
        1
    } else if current + half >= total_pages {
        total_pages - window + 1
    } else {
        current - half
    };

    (start..start + window).collect()
}

/// Page state of the episode grid on the watch screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodePager {
    total_episodes: usize,
    page_size: usize,
    page: usize,
}

impl EpisodePager {
    pub fn new(total_episodes: usize, page_size: usize) -> Self {
        Self {
            total_episodes,
            page_size: page_size.max(1),
            page: 1,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_episodes, self.page_size)
    }

    /// Update the episode count, keeping the current page in range.
    pub fn set_total_episodes(&mut self, total_episodes: usize) {
        self.total_episodes = total_episodes;
        self.set_page(self.page);
    }

    /// Jump to `page`, clamped to the available pages.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    /// Move to the page containing `episode`.
    pub fn show_episode(&mut self, episode: usize) {
        self.set_page(page_of(episode, self.page_size));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn episodes(&self) -> Vec<usize> {
        episodes_on_page(self.page, self.page_size, self.total_episodes)
    }

    pub fn range(&self) -> Option<(usize, usize)> {
        page_range(self.page, self.page_size, self.total_episodes)
    }

    pub fn buttons(&self, window: usize) -> Vec<usize> {
        visible_page_buttons(self.page, self.total_pages(), window)
    }

    /// Whether `episode` is a valid navigation target.
    pub fn can_go_to(&self, episode: usize) -> bool {
        (1..=self.total_episodes).contains(&episode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_of() {
        assert_eq!(page_of(1, 30), 1);
        assert_eq!(page_of(30, 30), 1);
        assert_eq!(page_of(31, 30), 2);
        assert_eq!(page_of(61, 30), 3);
    }

    #[test]
    fn test_page_of_clamps_below_one() {
        assert_eq!(page_of(0, 30), 1);
    }

    #[test]
    fn test_page_of_zero_page_size() {
        assert_eq!(page_of(4, 0), 4);
    }

    #[test]
    fn test_episodes_on_page() {
        assert_eq!(episodes_on_page(1, 30, 45), (1..=30).collect::<Vec<_>>());
        let second = episodes_on_page(2, 30, 45);
        assert_eq!(second, (31..=45).collect::<Vec<_>>());
        assert_eq!(second.len(), 15);
        assert!(episodes_on_page(3, 30, 45).is_empty());
    }

    #[test]
    fn test_episodes_on_page_edges() {
        assert!(episodes_on_page(0, 30, 45).is_empty());
        assert!(episodes_on_page(1, 30, 0).is_empty());
        assert_eq!(episodes_on_page(2, 30, 60), (31..=60).collect::<Vec<_>>());
        assert!(episodes_on_page(usize::MAX, 30, 45).is_empty());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 30), 0);
        assert_eq!(total_pages(30, 30), 1);
        assert_eq!(total_pages(31, 30), 2);
    }

    #[test]
    fn test_page_range() {
        assert_eq!(page_range(1, 30, 45), Some((1, 30)));
        assert_eq!(page_range(2, 30, 45), Some((31, 45)));
        assert_eq!(page_range(3, 30, 45), None);
    }

    #[test]
    fn test_visible_page_buttons() {
        assert_eq!(visible_page_buttons(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(visible_page_buttons(3, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(visible_page_buttons(4, 10, 5), vec![2, 3, 4, 5, 6]);
        assert_eq!(visible_page_buttons(5, 10, 5), vec![3, 4, 5, 6, 7]);
        assert_eq!(visible_page_buttons(8, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(visible_page_buttons(10, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(visible_page_buttons(3, 3, 5), vec![1, 2, 3]);
    }

    #[test]
    fn test_visible_page_buttons_empty_and_clamped() {
        assert!(visible_page_buttons(1, 0, 5).is_empty());
        assert!(visible_page_buttons(1, 10, 0).is_empty());
        assert_eq!(visible_page_buttons(99, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(visible_page_buttons(0, 10, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_visible_page_buttons_always_contains_current() {
        for total in 1..=20 {
            for current in 1..=total {
                let buttons = visible_page_buttons(current, total, 5);
                assert!(buttons.contains(&current), "{} of {}", current, total);
                assert_eq!(buttons.len(), total.min(5));
            }
        }
    }

    #[test]
    fn test_pager_navigation() {
        let mut pager = EpisodePager::new(95, 30);
        assert_eq!(pager.total_pages(), 4);
        assert_eq!(pager.page(), 1);

        pager.prev_page();
        assert_eq!(pager.page(), 1);

        pager.show_episode(61);
        assert_eq!(pager.page(), 3);
        assert_eq!(pager.range(), Some((61, 90)));

        pager.next_page();
        pager.next_page();
        assert_eq!(pager.page(), 4);
        assert_eq!(pager.episodes(), (91..=95).collect::<Vec<_>>());
    }

    #[test]
    fn test_pager_shrinking_total_clamps_page() {
        let mut pager = EpisodePager::new(95, 30);
        pager.set_page(4);
        pager.set_total_episodes(40);
        assert_eq!(pager.page(), 2);
        pager.set_total_episodes(0);
        assert_eq!(pager.page(), 1);
        assert!(pager.episodes().is_empty());
    }

    #[test]
    fn test_pager_can_go_to() {
        let pager = EpisodePager::new(10, 30);
        assert!(!pager.can_go_to(0));
        assert!(pager.can_go_to(1));
        assert!(pager.can_go_to(10));
        assert!(!pager.can_go_to(11));
    }
}
