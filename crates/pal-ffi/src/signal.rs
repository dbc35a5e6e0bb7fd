//! `pal_signalfd`: `signalfd(2)` for libcs that do not provide it.

use libc::{c_int, sigset_t};
use pal_core::config::RegistryConfig;
use pal_core::platform::{signalfd, KernelSigSet};
use tracing::warn;

fn set_errno(code: c_int) {
    // SAFETY: the errno location is valid and thread-local for the calling
    // thread.
    unsafe {
        #[cfg(target_os = "android")]
        {
            *libc::__errno() = code;
        }
        #[cfg(not(target_os = "android"))]
        {
            *libc::__errno_location() = code;
        }
    }
}

/// Create or update a signal file descriptor, like `signalfd(2)`.
///
/// Returns the descriptor, or `-1` with errno set.
///
/// # Safety
///
/// `mask` must be NULL or point to a valid `sigset_t`.
#[no_mangle]
pub unsafe extern "C" fn pal_signalfd(fd: c_int, mask: *const sigset_t, flags: c_int) -> c_int {
    // SAFETY: the caller guarantees `mask` is NULL or valid for this call.
    let Some(mask) = (unsafe { mask.as_ref() }) else {
        warn!("pal_signalfd: mask is NULL");
        set_errno(libc::EINVAL);
        return RegistryConfig::STATUS_ERROR;
    };

    match signalfd(fd, &KernelSigSet::from_sigset(mask), flags) {
        Ok(fd) => fd,
        Err(e) => {
            set_errno(e.raw_os_error().unwrap_or(libc::EINVAL));
            RegistryConfig::STATUS_ERROR
        }
    }
}
