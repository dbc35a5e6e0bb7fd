//! `pal_log_dyn_*`: dynamic log levels for C modules.

use crate::{c_str_arg, read_registry, write_registry};
use libc::{c_char, c_int};
use pal_core::config::RegistryConfig;
use pal_core::{LevelCell, LogLevelRegistry};
use std::ffi::CStr;
use std::ptr::{self, NonNull};
use std::sync::RwLock;
use tracing::{debug, warn};

/// C registration record (`struct pal_log_dyn_data`).
///
/// `next` is kept for layout compatibility with existing callers; the
/// registry does not use it.
#[repr(C)]
#[derive(Debug)]
pub struct PalLogDynData {
    pub level: *mut c_int,
    pub ident: *const c_char,
    pub next: *mut PalLogDynData,
}

/// An `int` level owned by C code.
#[derive(Debug)]
struct RawLevel(NonNull<c_int>);

// SAFETY: pal_log_dyn_add callers guarantee the cell lives for the rest of
// the process. Concurrent writers must synchronize on the cell themselves,
// exactly as with the plain `int*` they handed over.
unsafe impl Send for RawLevel {}
unsafe impl Sync for RawLevel {}

impl LevelCell for RawLevel {
    fn load(&self) -> i32 {
        // SAFETY: see the Send/Sync justification above.
        unsafe { self.0.as_ptr().read() }
    }

    fn store(&self, level: i32) {
        // SAFETY: see the Send/Sync justification above.
        unsafe { self.0.as_ptr().write(level) }
    }
}

/// NULL-terminated module list handed out by `pal_log_dyn_get_modules`.
struct ModuleList([*const c_char; 1]);

// SAFETY: the array only ever holds a NULL pointer and is never written.
unsafe impl Sync for ModuleList {}

static EMPTY_MODULES: ModuleList = ModuleList([ptr::null()]);

static LOG_LEVELS: RwLock<LogLevelRegistry<RawLevel, &'static CStr>> =
    RwLock::new(LogLevelRegistry::new());

/// Register a dynamic level.
///
/// Not thread safe with respect to other registrations; call it from init
/// code only.
///
/// # Safety
///
/// `data` must be NULL or point to a valid `PalLogDynData` whose `ident`
/// string and `level` cell stay valid for the rest of the process.
#[no_mangle]
pub unsafe extern "C" fn pal_log_dyn_add(data: *mut PalLogDynData) {
    // SAFETY: the caller guarantees `data` is NULL or valid.
    let Some(data) = (unsafe { data.as_ref() }) else {
        warn!("pal_log_dyn_add: data is NULL");
        return;
    };
    // SAFETY: the caller guarantees the string outlives the process.
    let Some(ident) = (unsafe { c_str_arg(data.ident, "pal_log_dyn_add", "ident") }) else {
        return;
    };
    let Some(level) = NonNull::new(data.level) else {
        warn!("pal_log_dyn_add: level of {:?} is NULL", ident);
        return;
    };

    write_registry(&LOG_LEVELS).register(ident, RawLevel(level));
}

/// Set the level of every entry registered under `ident`.
///
/// Returns `0` if at least one entry was updated, `-1` otherwise.
///
/// # Safety
///
/// `ident` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn pal_log_dyn_set_level(ident: *const c_char, level: c_int) -> c_int {
    // SAFETY: the caller guarantees `ident` is NULL or valid for this call.
    let Some(ident) = (unsafe { c_str_arg(ident, "pal_log_dyn_set_level", "ident") }) else {
        return RegistryConfig::STATUS_ERROR;
    };

    match read_registry(&LOG_LEVELS).set_level(ident, level) {
        Ok(_) => RegistryConfig::STATUS_OK,
        Err(e) if e.is_not_found() => {
            debug!("pal_log_dyn_set_level: {}", e);
            e.to_status_code()
        }
        Err(e) => {
            warn!("pal_log_dyn_set_level: {}", e);
            e.to_status_code()
        }
    }
}

/// Get the level of the most recently registered entry for `ident`.
///
/// Returns `-1` if no entry matches.
///
/// # Safety
///
/// `ident` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn pal_log_dyn_get_level(ident: *const c_char) -> c_int {
    // SAFETY: the caller guarantees `ident` is NULL or valid for this call.
    let Some(ident) = (unsafe { c_str_arg(ident, "pal_log_dyn_get_level", "ident") }) else {
        return RegistryConfig::LEVEL_NOT_FOUND;
    };

    read_registry(&LOG_LEVELS)
        .get_level(ident)
        .unwrap_or(RegistryConfig::LEVEL_NOT_FOUND)
}

/// Get the NULL-terminated list of modules exposing a dynamic level.
///
/// Module enumeration is not resolved yet, so the list is always empty.
/// Returns `0`, or `-1` if `modules` is NULL.
///
/// # Safety
///
/// `modules` must be NULL or valid for one pointer write.
#[no_mangle]
pub unsafe extern "C" fn pal_log_dyn_get_modules(modules: *mut *const *const c_char) -> c_int {
    if modules.is_null() {
        warn!("pal_log_dyn_get_modules: modules is NULL");
        return RegistryConfig::STATUS_ERROR;
    }

    // SAFETY: non-NULL and the caller guarantees it is writable.
    unsafe { modules.write(EMPTY_MODULES.0.as_ptr()) };
    RegistryConfig::STATUS_OK
}
