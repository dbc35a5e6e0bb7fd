//! C ABI for the PAL registries.
//!
//! This crate keeps one process-wide instance of each registry and exports
//! the `pal_log_dyn_*` and `pal_lib_desc_*` symbols with their historical
//! signatures, so C modules can register levels and library descriptions from
//! their init code and a diagnostic command can query them later.
//!
//! # Contract for C callers
//!
//! - Registered structs and the strings and level cells they point to are not
//!   copied. They must stay valid for the rest of the process.
//! - Registration is meant for the single-threaded startup phase.
//! - Every query returns `-1` (or NULL) for "not found" and for invalid
//!   arguments such as NULL pointers. Nothing is reported through errno
//!   except by [`pal_signalfd`].
//!
//! The matching declarations live in `include/pal.h`.

#![allow(unsafe_code)]

mod lib_desc;
mod log_dyn;
#[cfg(any(target_os = "linux", target_os = "android"))]
mod signal;

pub use lib_desc::{
    pal_lib_desc_add, pal_lib_desc_get, pal_lib_desc_get_table_entry,
    pal_lib_desc_get_table_size, pal_lib_print_table, PalLibDescData,
};
pub use log_dyn::{
    pal_log_dyn_add, pal_log_dyn_get_level, pal_log_dyn_get_modules, pal_log_dyn_set_level,
    PalLogDynData,
};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use signal::pal_signalfd;

use libc::{c_char, c_int};
use pal_core::config::RegistryConfig;
use std::ffi::CStr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Install a compact stderr subscriber for the library's own diagnostics.
///
/// Hosts that already run a `tracing` subscriber do not need this. Returns
/// `-1` when a global subscriber is already installed.
#[no_mangle]
pub extern "C" fn pal_tracing_init(debug: c_int) -> c_int {
    let log_level = if debug != 0 { Level::DEBUG } else { Level::INFO };
    let result = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();

    match result {
        Ok(()) => RegistryConfig::STATUS_OK,
        Err(_) => RegistryConfig::STATUS_ERROR,
    }
}

// Registry operations never leave a table half-updated, so a panic while a
// guard was held does not invalidate the data.
fn read_registry<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_registry<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Borrow a C string argument, logging and rejecting NULL.
///
/// # Safety
///
/// `ptr` must be NULL or point to a NUL-terminated string that stays valid
/// and unmodified for `'a`.
unsafe fn c_str_arg<'a>(ptr: *const c_char, func: &str, name: &str) -> Option<&'a CStr> {
    if ptr.is_null() {
        warn!("{}: {} is NULL", func, name);
        return None;
    }
    // SAFETY: non-NULL, and the caller guarantees termination and lifetime.
    Some(unsafe { CStr::from_ptr(ptr) })
}
