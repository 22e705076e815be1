//! The host-owned, live collection of quality levels.
//!
//! The selector never keeps a copy of the levels between calls; every
//! operation asks the source for a fresh snapshot.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::models::QualityLevel;

pub type LevelAddedCallback = Rc<dyn Fn(&QualityLevel)>;

/// Read access to the host's levels plus the one write the selector needs.
pub trait QualityLevelSource {
    fn levels(&self) -> Vec<QualityLevel>;

    /// Returns false if no level has this id.
    fn set_enabled(&self, id: &str, enabled: bool) -> bool;

    fn subscribe_level_added(&self, callback: LevelAddedCallback) -> Subscription;
}

/// Handle to a registered callback. Cancelled explicitly or on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Inner {
    levels: Vec<QualityLevel>,
    subscribers: Vec<(u64, LevelAddedCallback)>,
    next_token: u64,
}

/// In-memory level collection for hosts that do not bring their own.
///
/// Clones share the same collection.
#[derive(Clone, Default)]
pub struct QualityLevels {
    inner: Rc<RefCell<Inner>>,
}

impl QualityLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a level, or replaces the one with the same id, then notifies
    /// subscribers in registration order.
    pub fn add_level(&self, level: QualityLevel) {
        let subscribers: Vec<LevelAddedCallback> = {
            let mut inner = self.inner.borrow_mut();
            match inner.levels.iter_mut().find(|existing| existing.id == level.id) {
                Some(existing) => *existing = level.clone(),
                None => inner.levels.push(level.clone()),
            }
            inner.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for callback in subscribers {
            callback(&level);
        }
    }

    /// Drops every level, e.g. when the stream is re-initialized.
    pub fn clear(&self) {
        self.inner.borrow_mut().levels.clear();
    }

    pub fn get(&self, id: &str) -> Option<QualityLevel> {
        self.inner.borrow().levels.iter().find(|level| level.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn unsubscribe(inner: &Weak<RefCell<Inner>>, token: u64) {
        if let Some(inner) = inner.upgrade() {
            inner.borrow_mut().subscribers.retain(|(t, _)| *t != token);
        }
    }
}

impl QualityLevelSource for QualityLevels {
    fn levels(&self) -> Vec<QualityLevel> {
        self.inner.borrow().levels.clone()
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.levels.iter_mut().find(|level| level.id == id) {
            Some(level) => {
                level.enabled = enabled;
                true
            }
            None => false,
        }
    }

    fn subscribe_level_added(&self, callback: LevelAddedCallback) -> Subscription {
        let token = {
            let mut inner = self.inner.borrow_mut();
            let token = inner.next_token;
            inner.next_token += 1;
            inner.subscribers.push((token, callback));
            token
        };
        let inner = Rc::downgrade(&self.inner);
        Subscription::new(move || Self::unsubscribe(&inner, token))
    }
}

impl fmt::Debug for QualityLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("QualityLevels")
            .field("levels", &inner.levels)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}
