//! In-flight tracking for UI actions.
//!
//! Each action that must not be submitted twice while a request is
//! outstanding (adding a section, viewing a material, ...) is identified by
//! an [`ActionKey`]. A caller asks [`RequestControl::try_begin`] for a guard;
//! while the guard lives the action is in flight and further attempts are
//! refused. Dropping the guard, on success, error or unwind, clears it.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Identity of a UI action, e.g. `materials.addsection` or `news.delete:17`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionKey(String);

impl ActionKey {
    /// Key for an action that is single-flight across the whole page.
    pub fn new(block: &str, action: &str) -> Self {
        Self(format!("{block}.{action}"))
    }

    /// Key for an action that is single-flight per target item.
    pub fn for_item(block: &str, action: &str, item: impl fmt::Display) -> Self {
        Self(format!("{block}.{action}:{item}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared registry of actions with a request outstanding.
#[derive(Debug, Default, Clone)]
pub struct RequestControl {
    in_flight: Arc<Mutex<HashSet<ActionKey>>>,
}

impl RequestControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` in flight and returns a guard, or `None` if it already is.
    pub fn try_begin(&self, key: &ActionKey) -> Option<InFlightGuard> {
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            control: self.clone(),
            key: key.clone(),
        })
    }

    pub fn is_in_flight(&self, key: &ActionKey) -> bool {
        self.lock().contains(key)
    }

    /// Snapshot of all actions currently in flight, sorted.
    pub fn in_flight(&self) -> Vec<ActionKey> {
        let mut keys: Vec<ActionKey> = self.lock().iter().cloned().collect();
        keys.sort();
        keys
    }

    fn finish(&self, key: &ActionKey) {
        self.lock().remove(key);
    }

    // A poisoned set is still a valid set of keys.
    fn lock(&self) -> MutexGuard<'_, HashSet<ActionKey>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears the in-flight flag for its action when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    control: RequestControl,
    key: ActionKey,
}

impl InFlightGuard {
    pub fn key(&self) -> &ActionKey {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.control.finish(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_guard_drops() {
        let control = RequestControl::new();
        let key = ActionKey::new("materials", "addsection");

        let guard = control.try_begin(&key).expect("first begin");
        assert!(control.is_in_flight(&key));
        assert!(control.try_begin(&key).is_none());

        drop(guard);
        assert!(!control.is_in_flight(&key));
        assert!(control.try_begin(&key).is_some());
    }

    #[test]
    fn keys_are_independent() {
        let control = RequestControl::new();
        let a = ActionKey::for_item("materials", "view", 1);
        let b = ActionKey::for_item("materials", "view", 2);
        let _ga = control.try_begin(&a).unwrap();
        let _gb = control.try_begin(&b).unwrap();
        assert_eq!(control.in_flight(), vec![a, b]);
    }

    #[test]
    fn guard_released_on_unwind() {
        let control = RequestControl::new();
        let key = ActionKey::new("news", "edit");
        let c = control.clone();
        let k = key.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = c.try_begin(&k).unwrap();
            panic!("request handler failed");
        });
        assert!(result.is_err());
        assert!(!control.is_in_flight(&key));
    }

    #[test]
    fn key_formatting() {
        assert_eq!(ActionKey::new("news", "more").as_str(), "news.more");
        assert_eq!(
            ActionKey::for_item("news", "delete", 17).to_string(),
            "news.delete:17"
        );
    }
}
