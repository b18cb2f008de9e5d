//! Tab collection: the live tab list and the user's selection

use std::collections::HashSet;

use serde::Serialize;

use crate::article::{Article, ArticleDraft, RawTab, TabHandle};
use crate::error::{AppError, TabSourceError};
use crate::notice::Notice;

/// Filter passed to the browser's tab query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_window: Option<bool>,
}

impl TabQuery {
    pub fn active_tab() -> TabQuery {
        TabQuery {
            active: Some(true),
            current_window: Some(true),
        }
    }

    pub fn current_window() -> TabQuery {
        TabQuery {
            active: None,
            current_window: Some(true),
        }
    }
}

/// The host browser's tab enumeration API.
#[allow(async_fn_in_trait)]
pub trait TabSource {
    async fn query(&self, query: TabQuery) -> Result<Vec<RawTab>, TabSourceError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabCollection {
    active: Option<TabHandle>,
    tabs: Vec<TabHandle>,
    selected: HashSet<i32>,
    busy: bool,
}

impl TabCollection {
    /// Query the active tab and every tab in the current window.
    pub async fn load(source: &impl TabSource) -> Result<TabCollection, TabSourceError> {
        let active = source
            .query(TabQuery::active_tab())
            .await?
            .into_iter()
            .next()
            .map(TabHandle::from);
        let tabs = source
            .query(TabQuery::current_window())
            .await?
            .into_iter()
            .map(TabHandle::from)
            .collect();

        let mut collection = TabCollection::default();
        collection.set_tabs(active, tabs);
        Ok(collection)
    }

    /// Replace the tab list, dropping selections for tabs that are gone.
    pub fn set_tabs(&mut self, active: Option<TabHandle>, tabs: Vec<TabHandle>) {
        let ids: HashSet<i32> = tabs.iter().map(|t| t.id).collect();
        self.selected.retain(|id| ids.contains(id));
        self.active = active;
        self.tabs = tabs;
    }

    pub fn active_tab(&self) -> Option<&TabHandle> {
        self.active.as_ref()
    }

    pub fn tabs(&self) -> &[TabHandle] {
        &self.tabs
    }

    pub fn is_selected(&self, id: i32) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected_count(&self) -> usize {
        self.tabs.iter().filter(|t| self.is_selected(t.id)).count()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn toggle(&mut self, id: i32) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Select every current tab, or clear the selection.
    pub fn select_all(&mut self, checked: bool) {
        self.selected = if checked {
            self.tabs.iter().map(|t| t.id).collect()
        } else {
            HashSet::new()
        };
    }

    /// Derived state of the "select all" checkbox.
    pub fn all_selected(&self) -> bool {
        !self.tabs.is_empty() && self.tabs.iter().all(|t| self.is_selected(t.id))
    }

    /// Drafts for the selected tabs, in tab order.
    pub fn selected_drafts(&self) -> Vec<ArticleDraft> {
        self.tabs
            .iter()
            .filter(|t| self.is_selected(t.id))
            .map(ArticleDraft::from)
            .collect()
    }

    /// Mark the collection busy and hand out the batch to save. Returns
    /// `None` while a save is already in flight or nothing is selected.
    pub fn begin_submit(&mut self) -> Option<Vec<ArticleDraft>> {
        if self.busy {
            return None;
        }
        let drafts = self.selected_drafts();
        if drafts.is_empty() {
            return None;
        }
        self.busy = true;
        Some(drafts)
    }

    /// Clear the selection on success; keep it for a retry on failure.
    pub fn finish_submit(&mut self, result: &Result<Vec<Article>, AppError>) -> Notice {
        self.busy = false;
        match result {
            Ok(saved) => {
                self.selected.clear();
                Notice::success(format!("Successfully saved {} tabs", saved.len()))
            }
            Err(err) => Notice::from(err),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    pub struct FakeTabs {
        pub tabs: Vec<RawTab>,
        pub active_index: Option<usize>,
        pub queries: RefCell<Vec<TabQuery>>,
    }

    impl FakeTabs {
        pub fn with_urls(urls: &[&str]) -> FakeTabs {
            FakeTabs {
                tabs: urls
                    .iter()
                    .enumerate()
                    .map(|(i, url)| RawTab {
                        id: Some(i as i32 + 1),
                        title: Some(format!("Tab {}", i + 1)),
                        url: Some(url.to_string()),
                    })
                    .collect(),
                active_index: Some(0),
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl TabSource for FakeTabs {
        async fn query(&self, query: TabQuery) -> Result<Vec<RawTab>, TabSourceError> {
            self.queries.borrow_mut().push(query);
            if query.active == Some(true) {
                Ok(self
                    .active_index
                    .and_then(|i| self.tabs.get(i).cloned())
                    .into_iter()
                    .collect())
            } else {
                Ok(self.tabs.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::testing::*;
    use super::*;
    use crate::error::StoreError;
    use crate::gateway::PersistenceGateway;
    use crate::gateway::testing::{FakeStore, fixed_now};
    use crate::session::testing::session_for;

    fn collection(n: i32) -> TabCollection {
        let tabs = (1..=n)
            .map(|i| TabHandle::new(i, format!("Tab {i}"), format!("https://example.com/{i}")))
            .collect();
        let mut c = TabCollection::default();
        c.set_tabs(None, tabs);
        c
    }

    #[tokio::test]
    async fn test_load_queries_active_and_window() {
        let source = FakeTabs::with_urls(&["https://github.com", "https://docs.rs"]);

        let c = TabCollection::load(&source).await.unwrap();

        assert_eq!(c.active_tab().map(|t| t.url.as_str()), Some("https://github.com"));
        assert_eq!(c.tabs().len(), 2);
        assert_eq!(
            *source.queries.borrow(),
            vec![TabQuery::active_tab(), TabQuery::current_window()]
        );
    }

    #[tokio::test]
    async fn test_load_defaults_missing_fields() {
        let source = FakeTabs {
            tabs: vec![RawTab::default()],
            active_index: None,
            ..FakeTabs::default()
        };

        let c = TabCollection::load(&source).await.unwrap();

        assert!(c.active_tab().is_none());
        assert_eq!(c.tabs()[0], TabHandle::new(0, "", ""));
    }

    #[test]
    fn test_toggle_twice_is_noop() {
        let mut c = collection(3);
        c.toggle(2);
        let after_one = c.clone();

        for id in [1, 2, 3, 42] {
            let before = c.clone();
            c.toggle(id);
            c.toggle(id);
            assert_eq!(c, before);
        }
        assert_eq!(c, after_one);
    }

    #[test]
    fn test_select_all_is_idempotent() {
        let mut c = collection(4);
        c.toggle(3);

        c.select_all(true);
        let once = c.clone();
        c.select_all(true);

        assert_eq!(c, once);
        assert!(c.all_selected());
        assert_eq!(c.selected_count(), 4);

        c.select_all(false);
        assert_eq!(c.selected_count(), 0);
        assert!(!c.all_selected());
    }

    #[test]
    fn test_select_all_follows_tab_list_changes() {
        let mut c = collection(2);
        c.select_all(true);

        let mut tabs = c.tabs().to_vec();
        tabs.push(TabHandle::new(9, "New", "https://new.example"));
        c.set_tabs(None, tabs);
        assert!(!c.all_selected());

        c.select_all(true);
        assert!(c.is_selected(9));

        c.set_tabs(None, vec![TabHandle::new(9, "New", "https://new.example")]);
        assert_eq!(c.selected_count(), 1);
        assert!(c.all_selected());
    }

    #[test]
    fn test_selected_drafts_in_tab_order() {
        let mut c = collection(4);
        c.toggle(4);
        c.toggle(2);

        let drafts = c.selected_drafts();
        let urls: Vec<&str> = drafts.iter().map(|d| d.url.as_str()).collect();

        assert_eq!(urls, vec!["https://example.com/2", "https://example.com/4"]);
        assert_eq!(drafts[0].title, "Tab 2");
    }

    #[test]
    fn test_begin_submit_guards() {
        let mut c = collection(2);
        assert!(c.begin_submit().is_none());

        c.toggle(1);
        assert_eq!(c.begin_submit().map(|d| d.len()), Some(1));
        assert!(c.is_busy());
        assert!(c.begin_submit().is_none());
    }

    #[tokio::test]
    async fn test_submit_success_clears_selection() {
        let store = Rc::new(FakeStore::default());
        let gateway = PersistenceGateway::new(store.clone()).with_clock(fixed_now);
        let session = session_for("u1");
        let mut c = collection(5);
        c.toggle(1);
        c.toggle(3);
        c.toggle(5);

        let drafts = c.begin_submit().unwrap();
        let result = gateway.save_articles(Some(&session), drafts).await;
        let notice = c.finish_submit(&result);

        assert_eq!(notice, Notice::success("Successfully saved 3 tabs"));
        assert_eq!(c.selected_count(), 0);
        assert!(!c.is_busy());
        let rows = store.rows.borrow();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|a| a.user_id == "u1"));
        assert_eq!(store.requests.get(), 1);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_selection() {
        let store = Rc::new(FakeStore::default());
        *store.fail_with.borrow_mut() = Some("network down".to_string());
        let gateway = PersistenceGateway::new(store.clone());
        let session = session_for("u1");
        let mut c = collection(3);
        c.toggle(2);
        let before = c.clone();

        let drafts = c.begin_submit().unwrap();
        let result = gateway.save_articles(Some(&session), drafts).await;
        let notice = c.finish_submit(&result);

        assert!(notice.is_error());
        assert_eq!(
            notice.message(),
            AppError::Persistence(StoreError::new("network down")).user_message()
        );
        assert_eq!(c, before);
    }

    #[tokio::test]
    async fn test_submit_signed_out_makes_no_request() {
        let store = Rc::new(FakeStore::default());
        let gateway = PersistenceGateway::new(store.clone());
        let mut c = collection(1);
        c.toggle(1);

        let drafts = c.begin_submit().unwrap();
        let result = gateway.save_articles(None, drafts).await;
        let notice = c.finish_submit(&result);

        assert_eq!(notice, Notice::Error("You must be logged in to save articles".to_string()));
        assert!(c.is_selected(1));
        assert_eq!(store.requests.get(), 0);
    }
}
