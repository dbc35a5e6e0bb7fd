//! Integration tests for the exported C symbols.
//!
//! The registries are process-wide, so every test uses its own identifiers
//! and the table-size checks run under one lock.

#![allow(unsafe_code)]

use libc::{c_char, c_int};
use pal_ffi::*;
use std::ffi::CStr;
use std::ptr;
use std::sync::Mutex;

static TABLE_LOCK: Mutex<()> = Mutex::new(());

fn leak_level(initial: c_int) -> *mut c_int {
    Box::leak(Box::new(initial))
}

fn add_level(ident: &'static CStr, level: *mut c_int) {
    let data = Box::leak(Box::new(PalLogDynData {
        level,
        ident: ident.as_ptr(),
        next: ptr::null_mut(),
    }));
    unsafe { pal_log_dyn_add(data) };
}

fn add_lib(lib: &'static CStr, desc: &'static CStr) {
    let data = Box::leak(Box::new(PalLibDescData {
        lib: lib.as_ptr(),
        desc: desc.as_ptr(),
        next: ptr::null_mut(),
    }));
    unsafe { pal_lib_desc_add(data) };
}

fn entry(idx: c_int) -> Option<(String, String)> {
    let mut lib: *const c_char = ptr::null();
    let mut desc: *const c_char = ptr::null();
    let ret = unsafe { pal_lib_desc_get_table_entry(idx, &mut lib, &mut desc) };
    if ret != 0 {
        return None;
    }
    unsafe {
        Some((
            CStr::from_ptr(lib).to_string_lossy().into_owned(),
            CStr::from_ptr(desc).to_string_lossy().into_owned(),
        ))
    }
}

#[test]
fn test_log_level_scenario() {
    let l1 = leak_level(0);
    add_level(c"abi-core", l1);

    assert_eq!(unsafe { pal_log_dyn_set_level(c"abi-core".as_ptr(), 5) }, 0);
    assert_eq!(unsafe { *l1 }, 5);
    assert_eq!(unsafe { pal_log_dyn_get_level(c"abi-core".as_ptr()) }, 5);

    let l2 = leak_level(0);
    add_level(c"abi-core", l2);
    assert_eq!(unsafe { pal_log_dyn_set_level(c"abi-core".as_ptr(), 7) }, 0);
    assert_eq!(unsafe { (*l1, *l2) }, (7, 7));
    assert_eq!(unsafe { pal_log_dyn_get_level(c"abi-core".as_ptr()) }, 7);
}

#[test]
fn test_get_level_prefers_latest_registration() {
    let older = leak_level(1);
    let newer = leak_level(2);
    add_level(c"abi-latest", older);
    add_level(c"abi-latest", newer);

    assert_eq!(unsafe { pal_log_dyn_get_level(c"abi-latest".as_ptr()) }, 2);
}

#[test]
fn test_unknown_level_returns_sentinel() {
    assert_eq!(unsafe { pal_log_dyn_get_level(c"abi-missing".as_ptr()) }, -1);
    assert_eq!(unsafe { pal_log_dyn_set_level(c"abi-missing".as_ptr(), 3) }, -1);
}

#[test]
fn test_null_arguments_are_rejected() {
    assert_eq!(unsafe { pal_log_dyn_get_level(ptr::null()) }, -1);
    assert_eq!(unsafe { pal_log_dyn_set_level(ptr::null(), 1) }, -1);
    assert_eq!(unsafe { pal_log_dyn_get_modules(ptr::null_mut()) }, -1);
    assert!(unsafe { pal_lib_desc_get(ptr::null()) }.is_null());

    unsafe { pal_log_dyn_add(ptr::null_mut()) };
    unsafe { pal_lib_desc_add(ptr::null_mut()) };

    let mut lib: *const c_char = ptr::null();
    assert_eq!(
        unsafe { pal_lib_desc_get_table_entry(0, &mut lib, ptr::null_mut()) },
        -1
    );
    assert!(lib.is_null());
}

#[test]
fn test_null_level_cell_is_not_registered() {
    add_level(c"abi-null-cell", ptr::null_mut());
    assert_eq!(unsafe { pal_log_dyn_get_level(c"abi-null-cell".as_ptr()) }, -1);
}

#[test]
fn test_modules_list_is_empty() {
    let mut modules: *const *const c_char = ptr::null();
    assert_eq!(unsafe { pal_log_dyn_get_modules(&mut modules) }, 0);
    assert!(!modules.is_null());
    assert!(unsafe { *modules }.is_null());
}

#[test]
fn test_library_description_scenario() {
    let _guard = TABLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let base = pal_lib_desc_get_table_size();

    add_lib(c"abi-net", c"v1");
    add_lib(c"abi-net", c"v1");
    assert_eq!(pal_lib_desc_get_table_size(), base + 1);

    add_lib(c"abi-net", c"v2");
    assert_eq!(pal_lib_desc_get_table_size(), base + 2);

    let desc = unsafe { pal_lib_desc_get(c"abi-net".as_ptr()) };
    assert_eq!(unsafe { CStr::from_ptr(desc) }, c"v2");

    assert_eq!(entry(0), Some(("abi-net".into(), "v2".into())));
    assert_eq!(entry(1), Some(("abi-net".into(), "v1".into())));
}

#[test]
fn test_table_entry_bounds() {
    let _guard = TABLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    add_lib(c"abi-bounds", c"1.0");

    let size = pal_lib_desc_get_table_size();
    for idx in 0..size {
        assert!(entry(idx).is_some());
    }
    assert_eq!(entry(size), None);
    assert_eq!(entry(-1), None);
}

#[test]
fn test_lookup_returns_registered_pointer() {
    let _guard = TABLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    static DESC: &CStr = c"built against abi-ptr 2.1";
    add_lib(c"abi-ptr", DESC);

    let desc = unsafe { pal_lib_desc_get(c"abi-ptr".as_ptr()) };
    assert_eq!(desc, DESC.as_ptr());
    assert!(unsafe { pal_lib_desc_get(c"abi-unknown".as_ptr()) }.is_null());
}

#[test]
fn test_print_table_does_not_fail() {
    let _guard = TABLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    add_lib(c"abi-print", c"3.4");
    pal_lib_print_table();
}

#[cfg(target_os = "linux")]
mod signalfd {
    use super::*;
    use std::mem::MaybeUninit;

    #[test]
    fn test_signalfd_creates_descriptor() {
        let mut set = MaybeUninit::<libc::sigset_t>::uninit();
        let fd = unsafe {
            libc::sigemptyset(set.as_mut_ptr());
            libc::sigaddset(set.as_mut_ptr(), libc::SIGUSR2);
            pal_signalfd(-1, set.as_ptr(), libc::SFD_NONBLOCK | libc::SFD_CLOEXEC)
        };
        assert!(fd >= 0);
        assert_eq!(unsafe { libc::close(fd) }, 0);
    }

    #[test]
    fn test_signalfd_null_mask_sets_errno() {
        let fd = unsafe { pal_signalfd(-1, ptr::null(), 0) };
        assert_eq!(fd, -1);
        assert_eq!(
            std::io::Error::last_os_error().raw_os_error(),
            Some(libc::EINVAL)
        );
    }

    #[test]
    fn test_signalfd_bad_descriptor_sets_errno() {
        let mut set = MaybeUninit::<libc::sigset_t>::uninit();
        let fd = unsafe {
            libc::sigemptyset(set.as_mut_ptr());
            pal_signalfd(libc::STDIN_FILENO + 1000, set.as_ptr(), 0)
        };
        assert_eq!(fd, -1);
        assert_eq!(
            std::io::Error::last_os_error().raw_os_error(),
            Some(libc::EBADF)
        );
    }
}
