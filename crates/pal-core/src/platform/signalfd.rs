//! `signalfd(2)` without libc support.
//!
//! Some minimal libcs ship the kernel headers but no `signalfd` wrapper. The
//! kernel interface is small enough to issue by hand: `signalfd4` takes the
//! descriptor to create or update, a pointer to the kernel signal mask, the
//! size of that mask (always 8 bytes), and the creation flags.
//!
//! The kernel mask is not a libc `sigset_t`. On 32-bit targets it is two
//! machine words, on 64-bit targets one; [`KernelSigSet`] packs it in that
//! layout.

#![allow(unsafe_code)]

use crate::config::SignalfdConfig;
use crate::error::{PalError, Result};
use libc::{c_int, c_long, c_ulong, c_void};
use std::io;
use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use tracing::{debug, trace};

/// Set close-on-exec on the new descriptor.
pub const SFD_CLOEXEC: c_int = libc::SFD_CLOEXEC;
/// Make reads on the new descriptor non-blocking.
pub const SFD_NONBLOCK: c_int = libc::SFD_NONBLOCK;

const WORD_BITS: usize = c_ulong::BITS as usize;
const MASK_WORDS: usize = SignalfdConfig::KERNEL_NSIG / WORD_BITS;

/// Record returned by each read on a signalfd (`struct signalfd_siginfo`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalfdSiginfo {
    pub ssi_signo: u32,
    pub ssi_errno: i32,
    pub ssi_code: i32,
    pub ssi_pid: u32,
    pub ssi_uid: u32,
    pub ssi_fd: i32,
    pub ssi_tid: u32,
    pub ssi_band: u32,
    pub ssi_overrun: u32,
    pub ssi_trapno: u32,
    pub ssi_status: i32,
    pub ssi_int: i32,
    pub ssi_ptr: u64,
    pub ssi_utime: u64,
    pub ssi_stime: u64,
    pub ssi_addr: u64,
    pad: [u8; 48],
}

const _: () = assert!(mem::size_of::<SignalfdSiginfo>() == SignalfdConfig::SIGINFO_SIZE);

impl SignalfdSiginfo {
    fn zeroed() -> Self {
        Self {
            ssi_signo: 0,
            ssi_errno: 0,
            ssi_code: 0,
            ssi_pid: 0,
            ssi_uid: 0,
            ssi_fd: 0,
            ssi_tid: 0,
            ssi_band: 0,
            ssi_overrun: 0,
            ssi_trapno: 0,
            ssi_status: 0,
            ssi_int: 0,
            ssi_ptr: 0,
            ssi_utime: 0,
            ssi_stime: 0,
            ssi_addr: 0,
            pad: [0; 48],
        }
    }
}

/// Signal mask in the layout the kernel expects from `signalfd4`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelSigSet {
    words: [c_ulong; MASK_WORDS],
}

impl KernelSigSet {
    /// An empty mask.
    pub const fn empty() -> Self {
        Self {
            words: [0; MASK_WORDS],
        }
    }

    /// Build a mask from signal numbers.
    pub fn from_signals(signals: impl IntoIterator<Item = c_int>) -> Result<Self> {
        let mut mask = Self::empty();
        for signo in signals {
            mask.add(signo)?;
        }
        Ok(mask)
    }

    /// Convert a libc `sigset_t`, whatever its size on this libc.
    pub fn from_sigset(set: &libc::sigset_t) -> Self {
        let mut mask = Self::empty();
        for signo in 1..=SignalfdConfig::KERNEL_NSIG as c_int {
            // SAFETY: `set` is a valid, initialized sigset_t borrowed for the
            // duration of the call; sigismember only reads it.
            if unsafe { libc::sigismember(set, signo) } == 1 {
                mask.set_bit(signo);
            }
        }
        mask
    }

    /// Add a signal to the mask.
    pub fn add(&mut self, signo: c_int) -> Result<()> {
        if !Self::in_range(signo) {
            return Err(PalError::invalid_argument(
                "signo",
                format!("signal {} outside 1..={}", signo, SignalfdConfig::KERNEL_NSIG),
            ));
        }
        self.set_bit(signo);
        Ok(())
    }

    pub fn contains(&self, signo: c_int) -> bool {
        if !Self::in_range(signo) {
            return false;
        }
        let (word, bit) = Self::position(signo);
        self.words[word] & (1 << bit) != 0
    }

    /// The mask as one 64-bit value, bit `n - 1` standing for signal `n`.
    pub fn bits(&self) -> u64 {
        self.words
            .iter()
            .enumerate()
            .fold(0, |acc, (i, word)| acc | (u64::from(*word) << (i * WORD_BITS)))
    }

    fn in_range(signo: c_int) -> bool {
        signo >= 1 && signo as usize <= SignalfdConfig::KERNEL_NSIG
    }

    fn set_bit(&mut self, signo: c_int) {
        let (word, bit) = Self::position(signo);
        self.words[word] |= 1 << bit;
    }

    fn position(signo: c_int) -> (usize, usize) {
        let index = signo as usize - 1;
        (index / WORD_BITS, index % WORD_BITS)
    }
}

/// Create (`fd == -1`) or update a signal file descriptor.
///
/// Thin wrapper over the `signalfd4` system call. Errors carry the raw errno
/// so C callers can forward it unchanged.
pub fn signalfd(fd: RawFd, mask: &KernelSigSet, flags: c_int) -> io::Result<RawFd> {
    // SAFETY: the mask pointer is valid for `size_of::<KernelSigSet>()` bytes
    // for the duration of the call and the kernel only reads from it.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_signalfd4,
            fd as c_long,
            mask.words.as_ptr(),
            mem::size_of::<KernelSigSet>(),
            flags as c_long,
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    trace!("signalfd4(fd={}, mask={:#x}) -> {}", fd, mask.bits(), ret);
    Ok(ret as RawFd)
}

/// An owned signal file descriptor.
///
/// The signals in the mask must be blocked (`pthread_sigmask`) by the reading
/// thread, otherwise they are delivered normally and never show up here.
#[derive(Debug)]
pub struct SignalFd {
    fd: OwnedFd,
}

impl SignalFd {
    /// Create a descriptor receiving the signals in `mask`.
    pub fn new(mask: &KernelSigSet, flags: c_int) -> Result<Self> {
        let raw = signalfd(-1, mask, flags).map_err(|e| PalError::Io {
            message: format!("Failed to create signalfd: {}", e),
            source: Some(e),
        })?;
        debug!("Created signalfd {} for mask {:#x}", raw, mask.bits());
        // SAFETY: the kernel just returned `raw` as a new descriptor that
        // nothing else owns.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };
        Ok(Self { fd })
    }

    /// Replace the set of signals this descriptor receives.
    pub fn set_mask(&self, mask: &KernelSigSet) -> Result<()> {
        signalfd(self.fd.as_raw_fd(), mask, 0).map_err(|e| PalError::Io {
            message: format!("Failed to update signalfd mask: {}", e),
            source: Some(e),
        })?;
        Ok(())
    }

    /// Read one pending signal.
    ///
    /// Returns `Ok(None)` when the descriptor is non-blocking and no signal
    /// is pending.
    pub fn read_siginfo(&self) -> Result<Option<SignalfdSiginfo>> {
        let mut info = SignalfdSiginfo::zeroed();
        // SAFETY: `info` is a live, writable buffer of exactly
        // SIGINFO_SIZE bytes and any bit pattern is a valid SignalfdSiginfo.
        let ret = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                (&mut info as *mut SignalfdSiginfo).cast::<c_void>(),
                SignalfdConfig::SIGINFO_SIZE,
            )
        };

        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                return Ok(None);
            }
            return Err(PalError::Io {
                message: format!("Failed to read signalfd: {}", err),
                source: Some(err),
            });
        }

        if ret as usize != SignalfdConfig::SIGINFO_SIZE {
            return Err(PalError::Io {
                message: format!("Short read from signalfd: {} bytes", ret),
                source: None,
            });
        }

        trace!("signalfd delivered signal {}", info.ssi_signo);
        Ok(Some(info))
    }
}

impl AsFd for SignalFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for SignalFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
