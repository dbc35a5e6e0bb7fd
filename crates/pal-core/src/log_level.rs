//! Dynamic log-level registry.
//!
//! Modules declare a named verbosity level by registering a handle to a level
//! cell they own. A controller elsewhere in the process (a command handler, a
//! signal handler) can then change that level by name without either side
//! holding a reference to the other.
//!
//! Identifiers are not unique. [`LogLevelRegistry::set_level`] updates every
//! entry that matches, while [`LogLevelRegistry::get_level`] reports only the
//! most recently registered one.

use crate::error::{PalError, Result};
use crate::key::RegistryKey;
use std::borrow::Borrow;
use std::cell::Cell;
use std::fmt::Debug;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Storage for a level value owned by the registering module.
///
/// The registry never copies the level; it reads and writes through this
/// handle so changes are visible to the owner immediately.
pub trait LevelCell {
    fn load(&self) -> i32;
    fn store(&self, level: i32);
}

impl LevelCell for AtomicI32 {
    fn load(&self) -> i32 {
        AtomicI32::load(self, Ordering::SeqCst)
    }

    fn store(&self, level: i32) {
        AtomicI32::store(self, level, Ordering::SeqCst);
    }
}

impl LevelCell for Cell<i32> {
    fn load(&self) -> i32 {
        self.get()
    }

    fn store(&self, level: i32) {
        self.set(level);
    }
}

impl<T: LevelCell + ?Sized> LevelCell for &T {
    fn load(&self) -> i32 {
        (**self).load()
    }

    fn store(&self, level: i32) {
        (**self).store(level);
    }
}

impl<T: LevelCell + ?Sized> LevelCell for Arc<T> {
    fn load(&self) -> i32 {
        (**self).load()
    }

    fn store(&self, level: i32) {
        (**self).store(level);
    }
}

/// Level cell shared between a module and the registry.
pub type SharedLevel = Arc<AtomicI32>;

/// Create a shared level cell with an initial value.
pub fn shared_level(initial: i32) -> SharedLevel {
    Arc::new(AtomicI32::new(initial))
}

/// One registered level.
#[derive(Debug)]
pub struct LogLevelEntry<C, S = String> {
    identifier: S,
    level: C,
}

impl<C: LevelCell, S> LogLevelEntry<C, S> {
    pub fn identifier(&self) -> &S {
        &self.identifier
    }

    /// Current value of the referenced level cell.
    pub fn level(&self) -> i32 {
        self.level.load()
    }
}

/// Registry of named level cells, iterated most-recent-first.
#[derive(Debug)]
pub struct LogLevelRegistry<C = SharedLevel, S = String> {
    // Stored in registration order; every reader walks it in reverse.
    entries: Vec<LogLevelEntry<C, S>>,
}

impl<C, S> LogLevelRegistry<C, S> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of registered entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries, most recently registered first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &LogLevelEntry<C, S>> {
        self.entries.iter().rev()
    }

    /// Names of the modules exposing a dynamic level.
    ///
    /// Module enumeration is not resolved yet; this always returns an empty
    /// list.
    pub fn list_modules(&self) -> &'static [&'static str] {
        &[]
    }
}

impl<C: LevelCell, S> LogLevelRegistry<C, S> {
    /// Register a level cell under `identifier`.
    ///
    /// No uniqueness check is done: registering the same identifier twice
    /// keeps both cells, and the newer one is seen first by readers.
    pub fn register(&mut self, identifier: S, level: C)
    where
        S: Debug,
    {
        debug!(
            "Registered dynamic log level {:?} (current {})",
            identifier,
            level.load()
        );
        self.entries.push(LogLevelEntry { identifier, level });
    }

    /// Write `level` into every cell registered under `identifier`.
    ///
    /// Returns the number of cells updated, or [`PalError::LevelNotFound`]
    /// if none matched.
    pub fn set_level<Q>(&self, identifier: &Q, level: i32) -> Result<usize>
    where
        S: Borrow<Q>,
        Q: RegistryKey + ?Sized,
    {
        let mut updated = 0;
        for entry in self.iter() {
            if Borrow::<Q>::borrow(&entry.identifier) == identifier {
                entry.level.store(level);
                updated += 1;
            }
        }

        if updated == 0 {
            return Err(PalError::LevelNotFound {
                identifier: identifier.display().into_owned(),
            });
        }

        debug!(
            "Set log level of {} to {} ({} cells)",
            identifier.display(),
            level,
            updated
        );
        Ok(updated)
    }

    /// Current level of the most recently registered entry for `identifier`.
    pub fn get_level<Q>(&self, identifier: &Q) -> Option<i32>
    where
        S: Borrow<Q>,
        Q: RegistryKey + ?Sized,
    {
        let level = self
            .iter()
            .find(|entry| Borrow::<Q>::borrow(&entry.identifier) == identifier)
            .map(|entry| entry.level.load());
        trace!("Log level lookup {}: {:?}", identifier.display(), level);
        level
    }
}

impl<C, S> Default for LogLevelRegistry<C, S> {
    fn default() -> Self {
        Self::new()
    }
}
