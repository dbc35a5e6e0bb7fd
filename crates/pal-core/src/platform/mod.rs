//! Platform compatibility shims.
//!
//! All OS-specific code lives here so the registries stay portable.
//!
//! - `signalfd` - `signalfd(2)` for Linux libcs that do not export it,
//!   issued directly as the `signalfd4` system call

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod signalfd;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub use signalfd::{signalfd, KernelSigSet, SignalFd, SignalfdSiginfo, SFD_CLOEXEC, SFD_NONBLOCK};
