// src/frontend/router.rs
//! Page stack of one frontend

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEntry {
    pub page_id: i32,
    pub content: String,
    pub params: String,
}

impl PageEntry {
    pub fn new(page_id: i32, content: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            page_id,
            content: content.into(),
            params: params.into(),
        }
    }
}

/// Result of a back navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome {
    /// Top page removed, another page is now visible
    Popped(PageEntry),
    /// The last page was removed; the instance should finish
    Finish(PageEntry),
    /// Last page kept because popping it is disallowed
    Kept,
    /// No page loaded
    Empty,
}

#[derive(Debug, Default)]
pub struct PageRouter {
    stack: Vec<PageEntry>,
    disallow_pop_last: bool,
}

impl PageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole stack with `entry`
    pub fn run(&mut self, entry: PageEntry) {
        self.stack.clear();
        self.stack.push(entry);
    }

    pub fn push(&mut self, entry: PageEntry) {
        self.stack.push(entry);
    }

    /// Replace the content of the top page if its id is `page_id`
    pub fn update(&mut self, page_id: i32, content: impl Into<String>) -> Option<PageEntry> {
        let top = self.stack.last_mut()?;
        if top.page_id != page_id {
            return None;
        }
        top.content = content.into();
        Some(top.clone())
    }

    pub fn pop(&mut self) -> PopOutcome {
        match self.stack.len() {
            0 => PopOutcome::Empty,
            1 if self.disallow_pop_last => PopOutcome::Kept,
            1 => match self.stack.pop() {
                Some(entry) => PopOutcome::Finish(entry),
                None => PopOutcome::Empty,
            },
            _ => match self.stack.pop() {
                Some(entry) => PopOutcome::Popped(entry),
                None => PopOutcome::Empty,
            },
        }
    }

    pub fn disallow_pop_last_page(&mut self) {
        self.disallow_pop_last = true;
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> Option<&PageEntry> {
        self.stack.last()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_replaces_stack() {
        let mut router = PageRouter::new();
        router.push(PageEntry::new(1, "a", ""));
        router.push(PageEntry::new(2, "b", ""));
        router.run(PageEntry::new(3, "c", ""));
        assert_eq!(router.depth(), 1);
        assert_eq!(router.top().unwrap().page_id, 3);
    }

    #[test]
    fn test_pop_until_finish() {
        let mut router = PageRouter::new();
        router.run(PageEntry::new(1, "index", ""));
        router.push(PageEntry::new(2, "detail", ""));

        assert!(matches!(router.pop(), PopOutcome::Popped(e) if e.page_id == 2));
        assert!(matches!(router.pop(), PopOutcome::Finish(e) if e.page_id == 1));
        assert_eq!(router.pop(), PopOutcome::Empty);
    }

    #[test]
    fn test_launcher_keeps_last_page() {
        let mut router = PageRouter::new();
        router.disallow_pop_last_page();
        router.run(PageEntry::new(1, "home", ""));
        assert_eq!(router.pop(), PopOutcome::Kept);
        assert_eq!(router.depth(), 1);
    }

    #[test]
    fn test_update_only_matches_top() {
        let mut router = PageRouter::new();
        router.run(PageEntry::new(1, "v1", ""));
        router.push(PageEntry::new(2, "v1", ""));

        assert!(router.update(1, "v2").is_none());
        let updated = router.update(2, "v2").unwrap();
        assert_eq!(updated.content, "v2");
        assert_eq!(router.depth(), 2);
    }
}
