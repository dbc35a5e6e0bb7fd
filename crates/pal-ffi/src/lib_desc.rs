//! `pal_lib_desc_*`: library description table for C components.

use crate::{c_str_arg, read_registry, write_registry};
use libc::{c_char, c_int};
use pal_core::config::RegistryConfig;
use pal_core::LibraryDescRegistry;
use std::ffi::CStr;
use std::io;
use std::ptr;
use std::sync::RwLock;
use tracing::{debug, warn};

/// C registration record (`struct pal_lib_desc_data`).
///
/// `next` is kept for layout compatibility with existing callers; the
/// registry does not use it.
#[repr(C)]
#[derive(Debug)]
pub struct PalLibDescData {
    pub lib: *const c_char,
    pub desc: *const c_char,
    pub next: *mut PalLibDescData,
}

static LIB_DESCS: RwLock<LibraryDescRegistry<&'static CStr>> =
    RwLock::new(LibraryDescRegistry::new());

/// Get the description of a library.
///
/// Returns NULL if the library is unknown.
///
/// # Safety
///
/// `lib` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn pal_lib_desc_get(lib: *const c_char) -> *const c_char {
    // SAFETY: the caller guarantees `lib` is NULL or valid for this call.
    let Some(lib) = (unsafe { c_str_arg(lib, "pal_lib_desc_get", "lib") }) else {
        return ptr::null();
    };

    read_registry(&LIB_DESCS)
        .lookup(lib)
        .map_or(ptr::null(), |desc| desc.as_ptr())
}

/// Register a library description.
///
/// Registering the same library and description again is a no-op.
///
/// # Safety
///
/// `data` must be NULL or point to a valid `PalLibDescData` whose strings
/// stay valid for the rest of the process.
#[no_mangle]
pub unsafe extern "C" fn pal_lib_desc_add(data: *mut PalLibDescData) {
    // SAFETY: the caller guarantees `data` is NULL or valid.
    let Some(data) = (unsafe { data.as_ref() }) else {
        warn!("pal_lib_desc_add: data is NULL");
        return;
    };
    // SAFETY: the caller guarantees both strings outlive the process.
    let (Some(lib), Some(desc)) = (unsafe {
        (
            c_str_arg(data.lib, "pal_lib_desc_add", "lib"),
            c_str_arg(data.desc, "pal_lib_desc_add", "desc"),
        )
    }) else {
        return;
    };

    write_registry(&LIB_DESCS).register(lib, desc);
}

/// Write the library table to stderr, one `library: description` per line.
#[no_mangle]
pub extern "C" fn pal_lib_print_table() {
    let registry = read_registry(&LIB_DESCS);
    let mut out = io::stderr().lock();
    if let Err(e) = registry.write_table(&mut out) {
        warn!("pal_lib_print_table: {}", e);
    }
}

/// Get the number of entries in the library table.
#[no_mangle]
pub extern "C" fn pal_lib_desc_get_table_size() -> c_int {
    let size = read_registry(&LIB_DESCS).len();
    c_int::try_from(size).unwrap_or(c_int::MAX)
}

/// Get the library name and description at `idx` in the table.
///
/// Returns `0` on success, `-1` if `idx` is negative or past the end, or if
/// an output pointer is NULL. Outputs are only written on success.
///
/// # Safety
///
/// `lib` and `desc` must each be NULL or valid for one pointer write.
#[no_mangle]
pub unsafe extern "C" fn pal_lib_desc_get_table_entry(
    idx: c_int,
    lib: *mut *const c_char,
    desc: *mut *const c_char,
) -> c_int {
    if lib.is_null() || desc.is_null() {
        warn!("pal_lib_desc_get_table_entry: output pointer is NULL");
        return RegistryConfig::STATUS_ERROR;
    }
    let Ok(index) = usize::try_from(idx) else {
        debug!("pal_lib_desc_get_table_entry: negative index {}", idx);
        return RegistryConfig::STATUS_ERROR;
    };

    match read_registry(&LIB_DESCS).entry_at(index) {
        Ok(entry) => {
            // SAFETY: both pointers are non-NULL and the caller guarantees
            // they are writable.
            unsafe {
                lib.write(entry.library.as_ptr());
                desc.write(entry.description.as_ptr());
            }
            RegistryConfig::STATUS_OK
        }
        Err(e) if e.is_not_found() => {
            debug!("pal_lib_desc_get_table_entry: {}", e);
            e.to_status_code()
        }
        Err(e) => {
            warn!("pal_lib_desc_get_table_entry: {}", e);
            e.to_status_code()
        }
    }
}
