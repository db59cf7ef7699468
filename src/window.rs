//! Leaderboard windowing.
//!
//! Two policies share one type: fixed pages (random access, prev/next) and
//! incremental growth ("load more"). The visible slice is always derived
//! from the current snapshot and the window state, never stored.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LOAD_STEP: usize = 25;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum WindowPolicy {
    Paged { page: usize, page_size: usize },
    Incremental { visible: usize, step: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavIntent {
    Prev,
    Next,
    LoadMore,
}

impl std::str::FromStr for NavIntent {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "prev" | "previous" => Ok(NavIntent::Prev),
            "next" => Ok(NavIntent::Next),
            "load_more" | "load-more" | "more" => Ok(NavIntent::LoadMore),
            _ => Err(anyhow::anyhow!("Invalid navigation intent '{s}'")),
        }
    }
}

/// Navigation affordances for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub label: String,
    pub paged: bool,
    pub can_prev: bool,
    pub can_next: bool,
    pub can_load_more: bool,
    pub controls_visible: bool,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        WindowPolicy::paged(DEFAULT_PAGE_SIZE)
    }
}

impl WindowPolicy {
    /// Page 0 of `page_size` rows. A zero size is bumped to 1.
    pub fn paged(page_size: usize) -> Self {
        WindowPolicy::Paged {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    /// First `step` rows, growing by `step`. A zero step is bumped to 1.
    pub fn incremental(step: usize) -> Self {
        let step = step.max(1);
        WindowPolicy::Incremental {
            visible: step,
            step,
        }
    }

    /// Page count for `len` rows; `None` for the incremental policy.
    pub fn total_pages(&self, len: usize) -> Option<usize> {
        match *self {
            WindowPolicy::Paged { page_size, .. } => Some(len.div_ceil(page_size.max(1))),
            WindowPolicy::Incremental { .. } => None,
        }
    }

    pub fn can_prev(&self) -> bool {
        matches!(*self, WindowPolicy::Paged { page, .. } if page > 0)
    }

    pub fn can_next(&self, len: usize) -> bool {
        match *self {
            WindowPolicy::Paged { page, .. } => self.total_pages(len).is_some_and(|n| page + 1 < n),
            WindowPolicy::Incremental { .. } => false,
        }
    }

    pub fn can_load_more(&self, len: usize) -> bool {
        matches!(*self, WindowPolicy::Incremental { visible, .. } if len > visible)
    }

    /// Apply a navigation intent for a snapshot of `len` rows. Intents that
    /// are disabled, or belong to the other policy, leave the state alone.
    pub fn apply(self, intent: NavIntent, len: usize) -> Self {
        match (self, intent) {
            (WindowPolicy::Paged { page, page_size }, NavIntent::Prev) if self.can_prev() => {
                WindowPolicy::Paged {
                    page: page - 1,
                    page_size,
                }
            }
            (WindowPolicy::Paged { page, page_size }, NavIntent::Next) if self.can_next(len) => {
                WindowPolicy::Paged {
                    page: page + 1,
                    page_size,
                }
            }
            (WindowPolicy::Incremental { visible, step }, NavIntent::LoadMore)
                if self.can_load_more(len) =>
            {
                WindowPolicy::Incremental {
                    visible: visible.saturating_add(step),
                    step,
                }
            }
            _ => self,
        }
    }

    /// Bounds of the visible slice, clamped to `len`.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        match *self {
            WindowPolicy::Paged { page, page_size } => {
                let start = page.saturating_mul(page_size).min(len);
                let end = start.saturating_add(page_size).min(len);
                start..end
            }
            WindowPolicy::Incremental { visible, .. } => 0..visible.min(len),
        }
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    pub fn info(&self, len: usize) -> WindowInfo {
        match *self {
            WindowPolicy::Paged { page, page_size } => WindowInfo {
                label: format!("Page {} of {}", page + 1, len.div_ceil(page_size.max(1))),
                paged: true,
                can_prev: self.can_prev(),
                can_next: self.can_next(len),
                can_load_more: false,
                controls_visible: len > page_size,
            },
            WindowPolicy::Incremental { .. } => {
                let shown = self.range(len).len();
                WindowInfo {
                    label: format!("Showing {shown} of {len}"),
                    paged: false,
                    can_prev: false,
                    can_next: false,
                    can_load_more: self.can_load_more(len),
                    controls_visible: self.can_load_more(len),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirty_rows_three_pages() {
        let w = WindowPolicy::paged(10);
        assert_eq!(w.total_pages(30), Some(3));
        assert_eq!(w.total_pages(31), Some(4));
        assert_eq!(w.total_pages(0), Some(0));
        assert_eq!(WindowPolicy::incremental(25).total_pages(30), None);
    }

    #[test]
    fn test_next_stalls_on_last_page() {
        let mut w = WindowPolicy::paged(10);
        for _ in 0..3 {
            w = w.apply(NavIntent::Next, 30);
        }
        assert_eq!(w, WindowPolicy::Paged { page: 2, page_size: 10 });
    }

    #[test]
    fn test_prev_at_zero_is_noop() {
        let w = WindowPolicy::paged(10).apply(NavIntent::Prev, 30);
        assert_eq!(w, WindowPolicy::Paged { page: 0, page_size: 10 });
    }

    #[test]
    fn test_page_slices_never_exceed_page_size() {
        let rows: Vec<u32> = (0..47).collect();
        let mut w = WindowPolicy::paged(10);
        let pages = w.total_pages(rows.len()).unwrap();
        for p in 0..pages {
            let slice = w.visible(&rows);
            assert!(slice.len() <= 10);
            assert_eq!(slice.first(), Some(&(p as u32 * 10)));
            w = w.apply(NavIntent::Next, rows.len());
        }
        assert_eq!(w.visible(&rows), &rows[40..47]);
    }

    #[test]
    fn test_page_past_end_after_shrink_is_empty() {
        let w = WindowPolicy::Paged { page: 4, page_size: 10 };
        let rows: Vec<u32> = (0..12).collect();
        assert!(w.visible(&rows).is_empty());
        assert!(!w.can_next(rows.len()));
    }

    #[test]
    fn test_empty_snapshot_has_no_navigation() {
        let w = WindowPolicy::paged(10);
        assert!(!w.can_prev());
        assert!(!w.can_next(0));
        assert_eq!(w.apply(NavIntent::Next, 0), w);
        let info = w.info(0);
        assert_eq!(info.label, "Page 1 of 0");
        assert!(!info.controls_visible);
    }

    #[test]
    fn test_load_more_grows_prefix() {
        let rows: Vec<u32> = (0..60).collect();
        let mut w = WindowPolicy::incremental(25);
        let mut last = 0;
        for _ in 0..6 {
            let slice = w.visible(&rows);
            assert!(slice.len() >= last);
            assert_eq!(slice, &rows[..slice.len()]);
            last = slice.len();
            w = w.apply(NavIntent::LoadMore, rows.len());
        }
        assert_eq!(w.visible(&rows).len(), 60);
        assert!(!w.can_load_more(rows.len()));
        assert_eq!(w, WindowPolicy::Incremental { visible: 75, step: 25 });
    }

    #[test]
    fn test_load_more_offered_only_while_rows_remain() {
        let w = WindowPolicy::incremental(25);
        assert!(!w.can_load_more(25));
        assert!(w.can_load_more(26));
        assert_eq!(w.apply(NavIntent::LoadMore, 10), w);
    }

    #[test]
    fn test_intents_of_other_policy_are_ignored() {
        let paged = WindowPolicy::paged(10);
        assert_eq!(paged.apply(NavIntent::LoadMore, 100), paged);

        let inc = WindowPolicy::incremental(25);
        assert_eq!(inc.apply(NavIntent::Next, 100), inc);
        assert_eq!(inc.apply(NavIntent::Prev, 100), inc);
    }

    #[test]
    fn test_intent_parse() {
        assert_eq!("Next".parse::<NavIntent>().unwrap(), NavIntent::Next);
        assert_eq!("load-more".parse::<NavIntent>().unwrap(), NavIntent::LoadMore);
        assert!("jump".parse::<NavIntent>().is_err());
    }

    #[test]
    fn test_controls_hidden_for_single_page() {
        let w = WindowPolicy::paged(10);
        assert!(!w.info(10).controls_visible);
        assert!(w.info(11).controls_visible);
        assert_eq!(w.info(11).label, "Page 1 of 2");
    }
}
