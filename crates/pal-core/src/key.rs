//! Key types accepted by the registries.
//!
//! Registries are generic over the stored key so that Rust callers can hand
//! over owned `String`s while C callers keep the zero-copy contract with
//! `&'static CStr`. Queries borrow the stored key as a [`RegistryKey`].

use std::borrow::Cow;
use std::ffi::CStr;

/// A borrowed key that can be compared and rendered in diagnostics.
pub trait RegistryKey: PartialEq {
    /// Human-readable form used in log messages and errors.
    fn display(&self) -> Cow<'_, str>;
}

impl RegistryKey for str {
    fn display(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

// Byte equality, same as strcmp on NUL-terminated strings.
impl RegistryKey for CStr {
    fn display(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }
}
