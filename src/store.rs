//! Observable state containers.
//!
//! A [`Store`] holds one value and notifies every subscriber when it changes.
//! Stores are owned by the application context and handed out by reference;
//! there is no global instance.

use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

#[derive(Debug)]
pub struct Store<T> {
    tx: watch::Sender<T>,
}

impl<T> Store<T> {
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(value);
        Store { tx }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Stores `value` and notifies subscribers only if it differs from the current one.
    pub fn set_if_changed(&self, value: T)
    where
        T: PartialEq,
    {
        self.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Mutates the value in place; subscribers see a single change.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Store::new(T::default())
    }
}

/// A loading flag that stays true while any request raised on it is outstanding.
#[derive(Debug, Default)]
pub struct Flag {
    value: Store<bool>,
    outstanding: Mutex<usize>,
}

impl Flag {
    pub fn new() -> Self {
        Flag::default()
    }

    pub fn get(&self) -> bool {
        self.value.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.value.subscribe()
    }

    /// Marks one request as outstanding until the returned guard is dropped.
    pub fn raise(&self) -> InFlight<'_> {
        self.adjust(|n| n + 1);
        InFlight { flag: self }
    }

    fn adjust(&self, f: impl FnOnce(usize) -> usize) {
        // the counter lock is held across the store write so raise/lower pairs
        // from different tasks cannot publish out of order
        let mut outstanding = self
            .outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *outstanding = f(*outstanding);
        self.value.set_if_changed(*outstanding > 0);
    }
}

#[must_use = "the flag is lowered as soon as the guard is dropped"]
#[derive(Debug)]
pub struct InFlight<'a> {
    flag: &'a Flag,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.adjust(|n| n.saturating_sub(1));
    }
}
