//! # libpostal-parser
//!
//! Safe Rust bindings for libpostal's address parser.
//!
//! libpostal turns free-form postal addresses into labeled components
//! (`house_number`, `road`, `city`, `postcode`, ...). This crate wraps its
//! parser entry points:
//!
//! - **Lazy setup**: the native engine is loaded on first use, exactly once
//!   per process, even under concurrent first access
//! - **Serialized access**: one lock covers setup and every native call,
//!   since libpostal makes no thread-safety promises
//! - **Owned results**: components are copied out of native memory and the
//!   native response is always released
//! - **Quiet failures**: malformed input and empty native responses give an
//!   empty list; only setup failures are errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use libpostal_parser::parse_address;
//!
//! let components = parse_address("781 Franklin Ave Crown Heights Brooklyn NYC NY 11216")?;
//! for component in &components {
//!     println!("{}: {}", component.label, component.value);
//! }
//! # Ok::<(), libpostal_parser::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod data;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod guard;
pub mod parser;
pub mod stats;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

// Re-export main API
pub use engine::{Libpostal, NativeEngine};
pub use error::{Error, Result};
pub use guard::Engine;
pub use parser::{AddressParser, ParsedAddress};
pub use stats::EngineStats;
pub use types::*;

/// Environment variable naming the libpostal data directory.
pub const DATA_DIR_ENV: &str = "LIBPOSTAL_DATA_DIR";

/// Parse an address with libpostal's automatic language and country detection.
///
/// Malformed input or an empty native response yields an empty list.
///
/// # Errors
///
/// Only fatal engine errors: setup failed or the engine lock is poisoned.
///
/// # Examples
///
/// ```rust,no_run
/// use libpostal_parser::parse_address;
///
/// let components = parse_address("10 Downing Street London SW1A 2AA")?;
/// assert!(components.iter().any(|c| c.label == "postcode"));
/// # Ok::<(), libpostal_parser::Error>(())
/// ```
pub fn parse_address(address: &str) -> Result<Vec<ParsedComponent>> {
    parse_address_options(address, &ParseOptions::default())
}

/// Parse an address with explicit language/country hints.
///
/// # Examples
///
/// ```rust,no_run
/// use libpostal_parser::{parse_address_options, ParseOptions};
///
/// let options = ParseOptions::new().with_language("fr").with_country("fr");
/// let components = parse_address_options("5 Avenue Anatole France 75007 Paris", &options)?;
/// # Ok::<(), libpostal_parser::Error>(())
/// ```
pub fn parse_address_options(
    address: &str,
    options: &ParseOptions,
) -> Result<Vec<ParsedComponent>> {
    Engine::global().parse(address, options)
}

/// Parse raw bytes. Anything that is not valid UTF-8 yields an empty list
/// without touching libpostal.
pub fn parse_address_bytes(
    address: &[u8],
    options: &ParseOptions,
) -> Result<Vec<ParsedComponent>> {
    Engine::global().parse_bytes(address, options)
}

/// Load the global engine now instead of on the first parse.
///
/// Setup may read large model files from disk, so long-running services
/// usually call this at startup.
pub fn init() -> Result<()> {
    Engine::global().initialize()
}

/// Configuration for the libpostal engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalConfig {
    /// Data directory passed to the `_datadir` setup variants. `None` uses
    /// the directory libpostal was compiled with.
    pub data_dir: Option<PathBuf>,

    /// Whether to check for the model files before calling setup
    pub verify_data_files: bool,
}

impl Default for PostalConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            verify_data_files: true,
        }
    }
}

impl PostalConfig {
    /// Create a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use libpostal_parser::PostalConfig;
    ///
    /// let config = PostalConfig::builder()
    ///     .data_dir("/usr/local/share/libpostal")
    ///     .verify_data_files(true)
    ///     .build();
    /// ```
    pub fn builder() -> PostalConfigBuilder {
        PostalConfigBuilder::new()
    }

    /// Defaults, with `data_dir` taken from `LIBPOSTAL_DATA_DIR` when set.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn from_env_value(data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.filter(|dir| !dir.as_os_str().is_empty()),
            ..Self::default()
        }
    }
}

/// Builder for PostalConfig.
#[derive(Debug, Clone, Default)]
pub struct PostalConfigBuilder {
    config: PostalConfig,
}

impl PostalConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom data directory.
    pub fn data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    /// Set whether to check data files before setup.
    pub fn verify_data_files(mut self, enabled: bool) -> Self {
        self.config.verify_data_files = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PostalConfig {
        self.config
    }
}
