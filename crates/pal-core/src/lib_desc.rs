//! Library-description registry.
//!
//! Independently loaded components declare a human-readable description of
//! themselves ("built against libfoo 1.2"). The descriptions are collected in
//! one directory that a diagnostic command can enumerate by index without
//! holding an iterator across calls.
//!
//! Keys are not unique: the same library may carry several descriptions.
//! Only an exact (library, description) pair is de-duplicated.

use crate::config::RegistryConfig;
use crate::error::{PalError, Result};
use crate::key::RegistryKey;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::io::Write;
use std::ops::Deref;
use tracing::{debug, trace};

/// A library name and its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryDesc<S = String> {
    pub library: S,
    pub description: S,
}

impl<S> LibraryDesc<S> {
    pub fn new(library: S, description: S) -> Self {
        Self {
            library,
            description,
        }
    }
}

/// Registry of library descriptions, iterated most-recent-first.
#[derive(Debug)]
pub struct LibraryDescRegistry<S = String> {
    // Stored in registration order; position 0 of the public table is the
    // last element here.
    entries: Vec<LibraryDesc<S>>,
}

impl<S> LibraryDescRegistry<S> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in table order (most recently registered first).
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &LibraryDesc<S>> {
        self.entries.iter().rev()
    }

    /// Get the entry at `index` in table order.
    ///
    /// Valid indices are `0..len()`. The table is expected to stay unchanged
    /// while a caller walks it.
    pub fn entry_at(&self, index: usize) -> Result<&LibraryDesc<S>> {
        let size = self.entries.len();
        if index >= size {
            return Err(PalError::EntryOutOfRange { index, size });
        }
        Ok(&self.entries[size - 1 - index])
    }

    /// Description of the most recently registered entry for `library`.
    pub fn lookup<Q>(&self, library: &Q) -> Option<&S>
    where
        S: Borrow<Q>,
        Q: RegistryKey + ?Sized,
    {
        let desc = self
            .iter()
            .find(|entry| Borrow::<Q>::borrow(&entry.library) == library)
            .map(|entry| &entry.description);
        trace!(
            "Library description lookup {}: {}",
            library.display(),
            if desc.is_some() { "found" } else { "not found" }
        );
        desc
    }

    /// Register a library description.
    ///
    /// Returns `false` without touching the table when the exact pair is
    /// already present. A new description for a known library is added as a
    /// separate entry and shadows the older one for [`lookup`](Self::lookup).
    pub fn register(&mut self, library: S, description: S) -> bool
    where
        S: PartialEq + Debug,
    {
        let exists = self
            .entries
            .iter()
            .any(|entry| entry.library == library && entry.description == description);

        if exists {
            debug!(
                "Library description already registered: {:?} = {:?}",
                library, description
            );
            return false;
        }

        debug!(
            "Registered library description: {:?} = {:?}",
            library, description
        );
        self.entries.push(LibraryDesc::new(library, description));
        true
    }

    /// Write the table for human inspection, one `library: description` line
    /// per entry in table order.
    pub fn write_table<W: Write + ?Sized>(&self, out: &mut W) -> Result<()>
    where
        S: Deref,
        S::Target: RegistryKey,
    {
        for entry in self.iter() {
            writeln!(
                out,
                "{}{}{}",
                RegistryKey::display(&*entry.library),
                RegistryConfig::TABLE_SEPARATOR,
                RegistryKey::display(&*entry.description)
            )
            .map_err(|e| PalError::Io {
                message: format!("Failed to write library table: {}", e),
                source: Some(e),
            })?;
        }
        Ok(())
    }
}

impl<S> Default for LibraryDescRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(pairs: &[(&str, &str)]) -> LibraryDescRegistry {
        let mut registry = LibraryDescRegistry::new();
        for (lib, desc) in pairs {
            registry.register(lib.to_string(), desc.to_string());
        }
        registry
    }

    #[test]
    fn test_register_then_lookup() {
        let registry = registry_with(&[("net", "v1")]);
        assert_eq!(registry.lookup("net").map(String::as_str), Some("v1"));
        assert_eq!(registry.lookup("disk"), None);
    }

    #[test]
    fn test_identical_pair_is_idempotent() {
        let mut registry = registry_with(&[("net", "v1")]);
        assert!(!registry.register("net".into(), "v1".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_new_description_adds_entry() {
        let mut registry = registry_with(&[("net", "v1")]);
        assert!(registry.register("net".into(), "v2".into()));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("net").map(String::as_str), Some("v2"));
        assert_eq!(registry.entry_at(0).unwrap(), &LibraryDesc::new("net".into(), "v2".into()));
        assert_eq!(registry.entry_at(1).unwrap(), &LibraryDesc::new("net".into(), "v1".into()));
    }

    #[test]
    fn test_older_pair_stays_deduplicated_when_shadowed() {
        let mut registry = registry_with(&[("net", "v1"), ("net", "v2")]);
        assert!(!registry.register("net".into(), "v1".into()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_entry_at_bounds() {
        let registry = registry_with(&[("a", "1"), ("b", "2"), ("c", "3")]);
        for index in 0..registry.len() {
            assert!(registry.entry_at(index).is_ok());
        }
        let err = registry.entry_at(registry.len()).unwrap_err();
        assert!(matches!(err, PalError::EntryOutOfRange { index: 3, size: 3 }));
    }

    #[test]
    fn test_entry_at_on_empty_table() {
        let registry: LibraryDescRegistry = LibraryDescRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.entry_at(0).is_err());
    }

    #[test]
    fn test_write_table_is_most_recent_first() {
        let registry = registry_with(&[("libc", "bionic"), ("net", "v1")]);
        let mut out = Vec::new();
        registry.write_table(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "net: v1\nlibc: bionic\n");
    }

    #[test]
    fn test_write_table_empty() {
        let registry: LibraryDescRegistry = LibraryDescRegistry::new();
        let mut out = Vec::new();
        registry.write_table(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_entries_serialize() {
        let registry = registry_with(&[("net", "v1")]);
        let entries: Vec<_> = registry.iter().collect();
        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(json, r#"[{"library":"net","description":"v1"}]"#);
    }
}
