//! PAL Core - process-wide registries and platform shims.
//!
//! Two small bookkeeping structures that modules populate during startup and
//! query afterwards:
//!
//! - [`LogLevelRegistry`]: named handles to log-level cells owned by the
//!   registering module, so a controller can change verbosity by name.
//! - [`LibraryDescRegistry`]: library name to description table, enumerable
//!   by index for diagnostic commands.
//!
//! Registries are plain values. Whoever initializes the process owns them and
//! hands out references; the `pal-ffi` crate keeps one process-wide instance
//! of each for C callers.
//!
//! On Linux and Android, [`platform::signalfd`](mod@platform::signalfd)
//! provides `signalfd(2)` for libcs that lack it.
//!
//! # Example
//!
//! ```
//! use pal_core::{shared_level, LibraryDescRegistry, LogLevelRegistry};
//!
//! let mut levels = LogLevelRegistry::new();
//! let net_level = shared_level(1);
//! levels.register("net".to_string(), net_level.clone());
//! levels.set_level("net", 4).unwrap();
//! assert_eq!(levels.get_level("net"), Some(4));
//!
//! let mut libs = LibraryDescRegistry::new();
//! libs.register("zlib".to_string(), "1.3.1".to_string());
//! assert_eq!(libs.lookup("zlib").map(String::as_str), Some("1.3.1"));
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod lib_desc;
pub mod log_level;
pub mod platform;

pub use error::{PalError, Result};
pub use key::RegistryKey;
pub use lib_desc::{LibraryDesc, LibraryDescRegistry};
pub use log_level::{shared_level, LevelCell, LogLevelEntry, LogLevelRegistry, SharedLevel};
