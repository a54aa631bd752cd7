//! Tabbed pages with a vetoable selection.
//!
//! Changing the selected tab runs the preview / commit / veto protocol
//! through [`TabPaneSelectionListener`]s. Inserting and removing tabs
//! shifts the selected index without asking anyone.

use std::cell::RefCell;
use std::fmt;

use vigil_core::{
    ChangeNotifier, Property, Result, TransitionOutcome, TransitionPhases,
    VetoableTransitionCoordinator, VigilError, Vote,
};

/// Receives structural changes from a [`TabPane`].
pub trait TabPaneListener {
    /// A tab was inserted at `index`.
    fn tab_inserted(&self, _pane: &TabPane, _index: usize) {}
    /// `removed` tabs were taken out starting at `index`.
    fn tabs_removed(&self, _pane: &TabPane, _index: usize, _removed: &[String]) {}
    /// The title of the tab at `index` changed.
    fn tab_title_changed(&self, _pane: &TabPane, _index: usize, _previous: &str) {}
}

/// Takes part in changing the selected tab of a [`TabPane`].
pub trait TabPaneSelectionListener {
    /// Vote on selecting `selected_index`.
    fn preview_selected_index_change(&self, _pane: &TabPane, _selected_index: Option<usize>) -> Vote {
        Vote::Approve
    }
    /// A listener denied the change.
    fn selected_index_change_vetoed(&self, _pane: &TabPane, _reason: Vote) {}
    /// The selection moved away from `previous`.
    fn selected_index_changed(&self, _pane: &TabPane, _previous: Option<usize>) {}
}

/// A set of titled tabs, at most one of which is selected.
pub struct TabPane {
    tabs: RefCell<Vec<String>>,
    selected_index: Property<Option<usize>>,
    pane_listeners: ChangeNotifier<dyn TabPaneListener>,
    selection_listeners: VetoableTransitionCoordinator<dyn TabPaneSelectionListener>,
}

impl TabPane {
    const SELECTED_INDEX: TransitionPhases<dyn TabPaneSelectionListener, TabPane, Option<usize>> =
        TransitionPhases {
            preview: |l, pane, index| l.preview_selected_index_change(pane, *index),
            changed: |l, pane, previous| l.selected_index_changed(pane, *previous),
            vetoed: |l, pane, reason| l.selected_index_change_vetoed(pane, reason),
        };

    /// Create an empty tab pane with nothing selected.
    pub fn new() -> Self {
        Self {
            tabs: RefCell::new(Vec::new()),
            selected_index: Property::new(None),
            pane_listeners: ChangeNotifier::new(),
            selection_listeners: VetoableTransitionCoordinator::new(),
        }
    }

    // =========================================================================
    // Tabs
    // =========================================================================

    /// Number of tabs.
    pub fn tab_count(&self) -> usize {
        self.tabs.borrow().len()
    }

    /// The title of the tab at `index`.
    pub fn tab(&self, index: usize) -> Option<String> {
        self.tabs.borrow().get(index).cloned()
    }

    /// All tab titles, in order.
    pub fn tabs(&self) -> Vec<String> {
        self.tabs.borrow().clone()
    }

    /// Append a tab and return its index.
    pub fn add_tab(&self, title: impl Into<String>) -> usize {
        let index = self.tab_count();
        self.insert_at(index, title.into());
        index
    }

    /// Insert a tab at `index`.
    ///
    /// A selection at or after `index` moves along with its tab.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if `index` is past the end.
    pub fn insert_tab(&self, index: usize, title: impl Into<String>) -> Result<()> {
        let count = self.tab_count();
        if index > count {
            return Err(VigilError::invalid_argument(format!(
                "tab index {index} out of range for {count} tabs"
            )));
        }
        self.insert_at(index, title.into());
        Ok(())
    }

    fn insert_at(&self, index: usize, title: String) {
        self.tabs.borrow_mut().insert(index, title);

        if let Some(selected) = self.selected_index()
            && selected >= index
        {
            self.selected_index.set_silent(Some(selected + 1));
        }

        self.pane_listeners.notify(|l| l.tab_inserted(self, index));
    }

    /// Remove `count` tabs starting at `index` and return their titles.
    ///
    /// If the selected tab is removed the selection is cleared; a selection
    /// after the removed range shifts down.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if the range runs past the end.
    pub fn remove_tabs(&self, index: usize, count: usize) -> Result<Vec<String>> {
        let removed: Vec<String> = {
            let mut tabs = self.tabs.borrow_mut();
            let end = index
                .checked_add(count)
                .filter(|end| *end <= tabs.len())
                .ok_or_else(|| {
                    VigilError::invalid_argument(format!(
                        "tab range {index}..{index}+{count} out of range for {} tabs",
                        tabs.len()
                    ))
                })?;
            tabs.drain(index..end).collect()
        };

        if let Some(selected) = self.selected_index()
            && selected >= index
        {
            let adjusted = if selected < index + count {
                None
            } else {
                Some(selected - count)
            };
            self.selected_index.set_silent(adjusted);
        }

        self.pane_listeners
            .notify(|l| l.tabs_removed(self, index, &removed));
        Ok(removed)
    }

    /// Retitle the tab at `index`.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if there is no such tab.
    pub fn set_tab_title(&self, index: usize, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        let previous = {
            let mut tabs = self.tabs.borrow_mut();
            let slot = tabs.get_mut(index).ok_or_else(|| {
                VigilError::invalid_argument(format!("no tab at index {index}"))
            })?;
            if *slot == title {
                return Ok(());
            }
            std::mem::replace(slot, title)
        };
        self.pane_listeners
            .notify(|l| l.tab_title_changed(self, index, &previous));
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The selected tab index.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index.get()
    }

    /// The selected tab's title.
    pub fn selected_tab(&self) -> Option<String> {
        self.selected_index().and_then(|index| self.tab(index))
    }

    /// Select the tab at `index`, or clear the selection, subject to veto.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if `index` is not a tab.
    pub fn set_selected_index(&self, index: Option<usize>) -> Result<TransitionOutcome> {
        if let Some(index) = index
            && index >= self.tab_count()
        {
            return Err(VigilError::invalid_argument(format!(
                "tab index {index} out of range for {} tabs",
                self.tab_count()
            )));
        }

        let outcome = self.selection_listeners.attempt_change(
            self,
            self.selected_index(),
            index,
            &Self::SELECTED_INDEX,
            |index| self.selected_index.set_silent(index),
        );
        tracing::debug!(target: "vigil::widget", ?index, ?outcome, "tab selection");
        Ok(outcome)
    }

    /// Listeners for tab insertion, removal and retitling.
    pub fn tab_pane_listeners(&self) -> &ChangeNotifier<dyn TabPaneListener> {
        &self.pane_listeners
    }

    /// Listeners that preview and observe selection changes.
    pub fn tab_pane_selection_listeners(
        &self,
    ) -> &VetoableTransitionCoordinator<dyn TabPaneSelectionListener> {
        &self.selection_listeners
    }
}

impl Default for TabPane {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TabPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabPane")
            .field("tabs", &self.tabs())
            .field("selected_index", &self.selected_index())
            .finish_non_exhaustive()
    }
}
