//! Centralized constants for the PAL registries and platform shims.

/// Registry status codes and table formatting.
pub struct RegistryConfig;

impl RegistryConfig {
    pub const STATUS_OK: i32 = 0;
    pub const STATUS_ERROR: i32 = -1;
    /// Returned by the C `get_level` call when no entry matches.
    pub const LEVEL_NOT_FOUND: i32 = -1;
    /// Separator between library name and description in printed tables.
    pub const TABLE_SEPARATOR: &'static str = ": ";
}

/// Kernel ABI sizes used by the signalfd shim.
pub struct SignalfdConfig;

impl SignalfdConfig {
    /// Size of `struct signalfd_siginfo` as read from the descriptor.
    pub const SIGINFO_SIZE: usize = 128;
    /// Number of signals covered by the kernel signal mask.
    pub const KERNEL_NSIG: usize = 64;
}
