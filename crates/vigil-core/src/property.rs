//! Property storage for widget state.
//!
//! [`Property<T>`] is the value cell behind every observable widget
//! property. It only stores and compares; notification is the job of the
//! [`ChangeNotifier`](crate::ChangeNotifier) or
//! [`VetoableTransitionCoordinator`](crate::VetoableTransitionCoordinator)
//! that owns the property's listeners.
//!
//! # Example
//!
//! ```
//! use vigil_core::Property;
//!
//! let selected = Property::new(Some(0usize));
//! assert!(!selected.set(Some(0)));
//!
//! // Replacing hands back the previous value, or `None` if nothing changed.
//! assert_eq!(selected.replace(Some(2)), Some(Some(0)));
//! assert_eq!(selected.replace(Some(2)), None);
//! ```

use std::cell::RefCell;
use std::fmt;

/// A single-threaded property value with change detection.
///
/// Uses interior mutability so hosts can mutate through `&self` while
/// listeners hold shared references to the same host. No borrow is held
/// across calls, so a listener may read or write the property from inside
/// a notification.
pub struct Property<T> {
    value: RefCell<T>,
}

impl<T: Clone> Property<T> {
    /// Wrap an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
        }
    }

    /// A clone of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Borrow the value for the duration of `f`.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.borrow())
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.borrow_mut() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if it changed.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Store `value`, handing back the previous value if they differ.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.borrow_mut();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let expanded = Property::new(false);
        assert!(!expanded.set(false));
        assert!(expanded.set(true));
        assert!(expanded.get());
    }

    #[test]
    fn test_replace_hands_back_previous() {
        let heading = Property::new(Some("General".to_string()));

        assert_eq!(heading.replace(Some("General".to_string())), None);
        assert_eq!(
            heading.replace(None),
            Some(Some("General".to_string()))
        );
        assert_eq!(heading.get(), None);
    }

    #[test]
    fn test_silent_set_skips_comparison() {
        let tabs = Property::new(vec!["One".to_string(), "Two".to_string()]);
        assert_eq!(tabs.with(Vec::len), 2);

        tabs.set_silent(Vec::new());
        assert!(tabs.with(Vec::is_empty));
    }

    #[test]
    fn test_default_selection_is_none() {
        let selected: Property<Option<usize>> = Property::default();
        assert_eq!(selected.get(), None);
    }
}
