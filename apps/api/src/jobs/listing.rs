//! Listing page state: the active filter plus the current page, updated by a
//! pure reducer. Any filter change sends the listing back to page 1.

use serde::{Deserialize, Serialize};

use crate::jobs::filter::{JobFilter, RemoteFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingState {
    pub filter: JobFilter,
    /// 1-based.
    pub current_page: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            filter: JobFilter::default(),
            current_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingAction {
    SetTimeline(String),
    SetLocation(String),
    SetIndustry(String),
    SetHebrewLevel(String),
    SetRemote(RemoteFilter),
    SetSearch(String),
    ClearFilters,
    GoToPage(usize),
}

impl ListingAction {
    pub fn is_filter_change(&self) -> bool {
        !matches!(self, ListingAction::GoToPage(_))
    }
}

impl ListingState {
    pub fn reduce(self, action: ListingAction) -> ListingState {
        let mut filter = self.filter;

        match action {
            ListingAction::GoToPage(page) => {
                return ListingState {
                    filter,
                    current_page: page.max(1),
                }
            }
            ListingAction::SetTimeline(v) => filter.timeline = v,
            ListingAction::SetLocation(v) => filter.location = v,
            ListingAction::SetIndustry(v) => filter.industry = v,
            ListingAction::SetHebrewLevel(v) => filter.hebrew_level = v,
            ListingAction::SetRemote(v) => filter.remote = v,
            ListingAction::SetSearch(v) => filter.search = v,
            ListingAction::ClearFilters => filter = JobFilter::default(),
        }

        ListingState {
            filter,
            current_page: 1,
        }
    }
}

type PageResetHook = Box<dyn FnMut(&ListingState) + Send>;

/// Holds a `ListingState` and notifies an optional hook whenever a
/// dispatched action resets pagination.
#[derive(Default)]
pub struct ListingStore {
    state: ListingState,
    on_page_reset: Option<PageResetHook>,
}

impl ListingStore {
    pub fn new(state: ListingState) -> Self {
        Self {
            state,
            on_page_reset: None,
        }
    }

    pub fn on_page_reset<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ListingState) + Send + 'static,
    {
        self.on_page_reset = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn dispatch(&mut self, action: ListingAction) -> &ListingState {
        let resets = action.is_filter_change();
        self.state = std::mem::take(&mut self.state).reduce(action);
        if resets {
            if let Some(hook) = self.on_page_reset.as_mut() {
                hook(&self.state);
            }
        }
        &self.state
    }
}
